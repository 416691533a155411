//! User-facing admin messages.

/// Error shown when a professor slug edit collides with another professor.
pub fn slug_in_use_err(slug: &str, name: &str) -> String {
    format!(
        "Slug '{slug}' is already in use by '{name}'. Please merge these professors together if they are the same person."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_in_use_message() {
        assert_eq!(
            slug_in_use_err("smith", "John Smith"),
            "Slug 'smith' is already in use by 'John Smith'. Please merge these professors together if they are the same person."
        );
    }

    #[test]
    fn test_slug_in_use_keeps_quotes_verbatim() {
        let msg = slug_in_use_err("o'brien", "Pat O'Brien");
        assert!(msg.starts_with("Slug 'o'brien' is already in use by 'Pat O'Brien'."));
    }
}
