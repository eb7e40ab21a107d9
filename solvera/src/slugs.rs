//! URL slug derivation.
//!
//! Slugs are derived from a display name and kept unique with a numeric suffix: `cloud-erp`,
//! `cloud-erp-1`, `cloud-erp-2`, ... The database lookup that decides whether a candidate is
//! taken lives in [`crate::db::handlers::slugs`]; everything here is pure.

use deunicode::deunicode;

/// Slug used when a name has no usable characters at all (e.g. only punctuation or emoji).
pub const FALLBACK_SLUG: &str = "page";

/// Transliterate to ASCII, lowercase, and collapse every run of non-alphanumerics into one `-`.
///
/// Returns an empty string when nothing alphanumeric survives.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// [`slugify`], falling back to [`FALLBACK_SLUG`] for empty results.
pub fn base_slug(text: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() { FALLBACK_SLUG.to_string() } else { slug }
}

/// The `n`th candidate for `base`: `base` itself, then `base-1`, `base-2`, ...
pub fn candidate(base: &str, n: u32) -> String {
    if n == 0 { base.to_string() } else { format!("{base}-{n}") }
}

/// The first candidate for `base` that `is_taken` rejects.
pub fn resolve_unique(base: &str, mut is_taken: impl FnMut(&str) -> bool) -> String {
    let mut n = 0;
    loop {
        let slug = candidate(base, n);
        if !is_taken(&slug) {
            return slug;
        }
        n += 1;
    }
}

/// Pick the slug source for a write: an explicit non-blank slug wins over the display name.
pub fn requested_base(explicit: Option<&str>, display_name: &str) -> String {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => base_slug(slug),
        None => base_slug(display_name),
    }
}

/// Whether the caller supplied a slug of their own rather than leaving it to the display name.
pub fn is_explicit(explicit: Option<&str>) -> bool {
    explicit.map(str::trim).is_some_and(|s| !s.is_empty())
}

/// Whether an update must recompute the slug.
///
/// True when the caller sent a slug, or when the display name changed and the stored slug was
/// allocated from the name rather than chosen by hand (`slug_is_custom`).
pub fn needs_recompute(explicit: Option<&str>, old_name: &str, new_name: Option<&str>, slug_is_custom: bool) -> bool {
    if is_explicit(explicit) {
        return true;
    }
    match new_name {
        Some(new_name) if new_name != old_name => !slug_is_custom,
        _ => false,
    }
}
