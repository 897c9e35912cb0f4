/// Outcome of an idempotent "create if missing" operation
///
/// An "already exists" answer from the remote service is a success, so both
/// variants carry the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome<T> {
    Created(T),
    AlreadyExists(T),
}

impl<T> EnsureOutcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, EnsureOutcome::Created(_))
    }

    pub fn value(&self) -> &T {
        match self {
            EnsureOutcome::Created(value) | EnsureOutcome::AlreadyExists(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            EnsureOutcome::Created(value) | EnsureOutcome::AlreadyExists(value) => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EnsureOutcome<U> {
        match self {
            EnsureOutcome::Created(value) => EnsureOutcome::Created(f(value)),
            EnsureOutcome::AlreadyExists(value) => EnsureOutcome::AlreadyExists(f(value)),
        }
    }
}
