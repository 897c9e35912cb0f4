use crate::domain::errors::ValidationError;

const FIFO_SUFFIX: &str = ".fifo";

/// Shared rule for queue and topic names: alphanumerics, hyphens and
/// underscores, with an optional `.fifo` suffix.
pub(crate) fn validate_resource_name(
    kind: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyName { kind });
    }

    if value.len() > max {
        return Err(ValidationError::NameTooLong {
            kind,
            actual: value.len(),
            max,
        });
    }

    let stem = value.strip_suffix(FIFO_SUFFIX).unwrap_or(value);
    if stem.is_empty() {
        return Err(ValidationError::EmptyName { kind });
    }

    if let Some(character) = stem
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(ValidationError::InvalidNameCharacter { kind, character });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_suffix() {
        assert!(validate_resource_name("Queue", "orders.fifo", 80).is_ok());
        assert_eq!(
            validate_resource_name("Queue", ".fifo", 80),
            Err(ValidationError::EmptyName { kind: "Queue" })
        );
        assert_eq!(
            validate_resource_name("Queue", "orders.v2", 80),
            Err(ValidationError::InvalidNameCharacter {
                kind: "Queue",
                character: '.'
            })
        );
    }
}
