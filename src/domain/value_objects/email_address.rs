use crate::domain::errors::ValidationError;

/// An email endpoint for topic subscriptions
///
/// Only the shape `local@domain` is checked. Delivery confirmation is handled
/// by the pub/sub service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let valid = match trimmed.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };

        if !valid {
            return Err(ValidationError::InvalidEmailAddress(value));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_addresses() {
        assert_eq!(
            EmailAddress::new(" ops@example.com ".to_string())
                .unwrap()
                .as_str(),
            "ops@example.com"
        );
        assert!(EmailAddress::new(String::new()).is_err());
        assert!(EmailAddress::new("no-at-sign".to_string()).is_err());
        assert!(EmailAddress::new("@example.com".to_string()).is_err());
        assert!(EmailAddress::new("ops@".to_string()).is_err());
        assert!(EmailAddress::new("a@b@c".to_string()).is_err());
    }
}
