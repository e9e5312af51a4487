//! Filesystem-safe identifiers derived from agent names.

/// Derive the registry slug for an agent name.
///
/// Lowercases, strips everything outside `[a-z0-9]`, whitespace and `-`,
/// turns whitespace runs into single hyphens, collapses repeated hyphens and
/// trims hyphens from both ends. The result may be empty for names made only
/// of punctuation; callers decide how to treat that.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.to_lowercase().chars() {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else if c == '-' || c.is_whitespace() {
            '-'
        } else {
            continue;
        };

        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}
