//! Naming helpers for migration files
//!
//! Migration filenames carry a snake_case name segment; the entity declared
//! inside the file uses the PascalCase form of the same segment.

/// Reduce a free-form migration name to a snake_case identifier.
///
/// Spaces and dashes become underscores, every other character that is not a
/// letter or underscore is dropped, camel-case humps are split, and runs of
/// underscores collapse. Returns an empty string when nothing usable remains.
pub fn sanitize_migration_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_lower = false;

    for ch in name.chars() {
        let ch = if ch == ' ' || ch == '-' { '_' } else { ch };
        if ch == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else if ch.is_alphabetic() {
            if ch.is_uppercase() && prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = ch.is_lowercase();
            out.extend(ch.to_lowercase());
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Convert a snake_case name to PascalCase (`create_users` -> `CreateUsers`)
pub fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod tests;
