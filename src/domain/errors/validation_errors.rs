use thiserror::Error;

/// Validation errors for domain value objects and request payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // BucketName validation errors
    #[error("Bucket name too short: {actual} characters (min: {min})")]
    BucketNameTooShort { actual: usize, min: usize },

    #[error("Bucket name too long: {actual} characters (max: {max})")]
    BucketNameTooLong { actual: usize, max: usize },

    #[error("Bucket name must start with lowercase letter or number")]
    BucketNameInvalidStart,

    #[error(
        "Invalid character in bucket name: '{0}'. Only lowercase letters, numbers, dots, and hyphens allowed"
    )]
    BucketNameInvalidCharacter(char),

    // ObjectKey validation errors
    #[error("Object key cannot be empty")]
    EmptyObjectKey,

    #[error("Object key too long: {actual} bytes (max: {max})")]
    ObjectKeyTooLong { actual: usize, max: usize },

    #[error("Invalid character in object key: '{0:?}'")]
    InvalidObjectKeyCharacter(char),

    // Queue and topic names share a character set
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("{kind} name too long: {actual} characters (max: {max})")]
    NameTooLong {
        kind: &'static str,
        actual: usize,
        max: usize,
    },

    #[error(
        "Invalid character in {kind} name: '{character}'. Only alphanumeric characters, hyphens, and underscores allowed"
    )]
    InvalidNameCharacter { kind: &'static str, character: char },

    // EmailAddress validation errors
    #[error("Invalid email address: '{0}'")]
    InvalidEmailAddress(String),

    // Request payload errors
    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("Invalid value for field '{field}': '{value}' (expected: {expected})")]
    InvalidField {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("Batch must contain between {min} and {max} entries, got {actual}")]
    BatchSizeOutOfRange {
        actual: usize,
        min: usize,
        max: usize,
    },

    #[error("Duplicate batch entry id: {0}")]
    DuplicateBatchEntryId(String),
}
