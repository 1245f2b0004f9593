/// Random filenames for stored images
use std::path::Path;
use uuid::Uuid;

/// Generate a random 128-bit identifier as 32 lowercase hex characters.
///
/// Uniqueness is not checked against existing files.
pub fn generate_identifier() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Extension of a client filename including the leading dot.
///
/// Returns an empty string for names without an extension and for
/// dot-files such as `.bashrc`.
pub fn extension_of(original_filename: &str) -> String {
    Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Build a stored filename from a fresh identifier and the client extension
pub fn random_filename(original_filename: &str) -> String {
    format!("{}{}", generate_identifier(), extension_of(original_filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identifier_format() {
        let id = generate_identifier();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_identifiers_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_identifier()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("cat.png"), ".png");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of(""), "");
    }

    #[test]
    fn test_random_filename_keeps_extension() {
        let name = random_filename("holiday.JPG");
        assert!(name.ends_with(".JPG"));
        assert_eq!(name.len(), 32 + 4);
    }
}
