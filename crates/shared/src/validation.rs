//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of an uploaded file name.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

lazy_static! {
    static ref UNSAFE_FILE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._\-]+").unwrap();
}

/// Validates that a string contains at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates an uploaded file name: non-empty, bounded, no path separators.
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("file_name_empty");
        err.message = Some("File name is required".into());
        return Err(err);
    }
    if name.len() > MAX_FILE_NAME_LENGTH {
        let mut err = ValidationError::new("file_name_length");
        err.message = Some(
            format!("File name must be at most {} bytes", MAX_FILE_NAME_LENGTH).into(),
        );
        return Err(err);
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        let mut err = ValidationError::new("file_name_path");
        err.message = Some("File name must not contain path components".into());
        return Err(err);
    }
    Ok(())
}

/// Reduces a user-supplied file name to a storage-safe form.
///
/// Path components are dropped and runs of characters outside
/// `[A-Za-z0-9._-]` collapse to a single underscore.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned = UNSAFE_FILE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Access Control").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("Q3 access review.xlsx").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("../etc/passwd").is_err());
        assert!(validate_file_name("dir\\file.txt").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("Q3 access review.xlsx"), "Q3_access_review.xlsx");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\tmp\\evil.exe"), "evil.exe");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name("ünïcode.txt"), "_n_code.txt");
    }
}
