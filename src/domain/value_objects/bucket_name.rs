use crate::domain::errors::ValidationError;

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 63;

/// A validated bucket name
///
/// Only obviously invalid names are rejected here. The object-storage service
/// applies the authoritative rule set when the bucket is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    /// Create a new BucketName with S3-compatible validation rules
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.len() < MIN_LENGTH {
            return Err(ValidationError::BucketNameTooShort {
                actual: value.len(),
                min: MIN_LENGTH,
            });
        }

        if value.len() > MAX_LENGTH {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: MAX_LENGTH,
            });
        }

        // Must start with lowercase letter or number
        if !value
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::BucketNameInvalidStart);
        }

        if let Some(c) = value.chars().find(|c| !Self::is_allowed(*c)) {
            return Err(ValidationError::BucketNameInvalidCharacter(c));
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_allowed(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-'
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for BucketName {
    type Error = ValidationError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        BucketName::new(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(BucketName::new("abc".to_string()).is_ok());
        assert!(BucketName::new("my-bucket.1".to_string()).is_ok());
        assert!(BucketName::new("123bucket".to_string()).is_ok());
        assert!(BucketName::new("a".repeat(63)).is_ok());
    }

    #[test]
    fn test_invalid_bucket_names() {
        assert_eq!(
            BucketName::new("ab".to_string()),
            Err(ValidationError::BucketNameTooShort { actual: 2, min: 3 })
        );
        assert_eq!(
            BucketName::new("a".repeat(64)),
            Err(ValidationError::BucketNameTooLong { actual: 64, max: 63 })
        );
        assert_eq!(
            BucketName::new("AB".to_string()),
            Err(ValidationError::BucketNameTooShort { actual: 2, min: 3 })
        );
        assert_eq!(
            BucketName::new("ABC".to_string()),
            Err(ValidationError::BucketNameInvalidStart)
        );
        assert_eq!(
            BucketName::new("-abc".to_string()),
            Err(ValidationError::BucketNameInvalidStart)
        );
        assert_eq!(
            BucketName::new(".abc".to_string()),
            Err(ValidationError::BucketNameInvalidStart)
        );
        assert_eq!(
            BucketName::new("abC".to_string()),
            Err(ValidationError::BucketNameInvalidCharacter('C'))
        );
        assert!(BucketName::new("my_bucket".to_string()).is_err());
        assert!(BucketName::new("my bucket".to_string()).is_err());
    }
}
