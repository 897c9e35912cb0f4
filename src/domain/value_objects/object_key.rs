use crate::domain::errors::ValidationError;

const MAX_KEY_BYTES: usize = 1024;

/// A validated object key (file name) inside a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > MAX_KEY_BYTES {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: MAX_KEY_BYTES,
            });
        }

        if value.contains('\0') {
            return Err(ValidationError::InvalidObjectKeyCharacter('\0'));
        }

        Ok(Self(value))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the file name part of the key (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_keys() {
        assert!(ObjectKey::new("file.txt".to_string()).is_ok());
        assert!(ObjectKey::new("reports/2024/summary.pdf".to_string()).is_ok());
        assert!(ObjectKey::new("a".repeat(1024)).is_ok());
    }

    #[test]
    fn test_invalid_object_keys() {
        assert_eq!(
            ObjectKey::new(String::new()),
            Err(ValidationError::EmptyObjectKey)
        );
        assert!(ObjectKey::new("a".repeat(1025)).is_err());
        assert!(ObjectKey::new("bad\0key".to_string()).is_err());
    }

    #[test]
    fn test_file_name() {
        let key = ObjectKey::new("reports/2024/summary.pdf".to_string()).unwrap();
        assert_eq!(key.file_name(), "summary.pdf");

        let key = ObjectKey::new("plain.txt".to_string()).unwrap();
        assert_eq!(key.file_name(), "plain.txt");
    }
}
