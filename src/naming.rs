//! Slugs and safe file names.
//!
//! Category names are free text and case-sensitive; output paths are not.
//! Every category maps to a URL slug for its page directory, and every
//! uploaded file maps to a sanitized name before it goes to the remote host.
//!
//! - `"Pre-wed"` → `pre-wed`
//! - `"Street & Urban"` → `street-urban`
//! - `"Überblick"` → `berblick` (non-ASCII letters are dropped)
//!
//! Two categories that differ only by case produce the same slug;
//! [`unique_slugs`] disambiguates them with a numeric suffix.

use std::collections::HashMap;

/// Fallback slug for names with no ASCII alphanumerics.
const EMPTY_SLUG: &str = "untitled";

/// Lowercase ASCII slug: alphanumerics kept, runs of anything else collapse
/// to a single dash, no leading or trailing dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

/// Assign a distinct slug to each name, in order. Later names whose slug is
/// already taken get `-2`, `-3`, ...
pub fn unique_slugs<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<(String, String)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let base = slugify(name);
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let slug = if *count == 1 {
                base
            } else {
                format!("{}-{}", base, count)
            };
            (name.to_string(), slug)
        })
        .collect()
}

/// Reduce a file name to `[A-Za-z0-9._-]`, keeping only the final path
/// component.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}
