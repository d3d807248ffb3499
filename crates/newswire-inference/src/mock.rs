//! Mock inference backend for deterministic testing.
//!
//! Generates deterministic embeddings derived from the input text, records
//! every call, and can be told to fail, so job and service tests can assert
//! retry behavior without a live model server.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use newswire_core::{EmbeddingBackend, Error, GenerationBackend, Result, Vector};

/// Mock embedding/generation backend.
#[derive(Clone)]
pub struct MockBackend {
    dimension: usize,
    response: String,
    delay: Option<Duration>,
    fail: Arc<AtomicBool>,
    embed_calls: Arc<AtomicUsize>,
    embedded_texts: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    /// Create a mock backend with the given embedding dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            response: "mock summary".to_string(),
            delay: None,
            fail: Arc::new(AtomicBool::new(false)),
            embed_calls: Arc::new(AtomicUsize::new(0)),
            embedded_texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the fixed generation response.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Delay every `embed_texts` call, so tests can overlap invocations.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every subsequent call fail with `Error::Provider`.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed_texts` calls made so far.
    pub fn embed_call_count(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Every text passed to `embed_texts`, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.embedded_texts.lock().unwrap().clone()
    }

    /// Deterministic vector for a text: a simple rolling hash spread over
    /// the configured dimension. Equal texts give equal vectors.
    pub fn vector_for(&self, text: &str) -> Vector {
        let mut acc: u32 = 2166136261;
        let mut values = Vec::with_capacity(self.dimension);
        for (i, byte) in text.bytes().cycle().take(self.dimension.max(1)).enumerate() {
            acc = acc.wrapping_mul(16777619) ^ (byte as u32 + i as u32);
            values.push((acc % 1000) as f32 / 1000.0);
        }
        if text.is_empty() {
            values = vec![0.0; self.dimension];
        }
        Vector::from(values)
    }
}

#[async_trait]
impl EmbeddingBackend for MockBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Provider("mock backend set to fail".to_string()));
        }

        self.embedded_texts
            .lock()
            .unwrap()
            .extend(texts.iter().cloned());

        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Provider("mock backend set to fail".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-gen"
    }
}
