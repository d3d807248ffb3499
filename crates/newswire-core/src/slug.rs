//! Slug normalization shared by cache keys and organization lookups.
//!
//! Organizations have no stored slug column; the slug is recomputed from the
//! display name with this exact normalization wherever one is needed, so the
//! incoming-request form and the per-row form always agree.

/// Normalize a display name or request segment into a slug: lowercase,
/// alphanumeric characters kept, every other run collapsed to a single
/// hyphen, leading/trailing hyphens trimmed.
///
/// # Example
///
/// ```
/// use newswire_core::slug::slugify;
///
/// assert_eq!(slugify("The Verge"), "the-verge");
/// assert_eq!(slugify("  DIE ZEIT  "), "die-zeit");
/// ```
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_was_dash = false;

    for c in value.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
            previous_was_dash = false;
        } else if !previous_was_dash {
            out.push('-');
            previous_was_dash = true;
        }
    }

    out.trim_matches('-').to_string()
}
