/// What a promise delivers: a value or an error, never both.
///
/// # Examples
///
/// ```
/// use promise_pair::Outcome;
/// let ok: Outcome<i32, String> = Outcome::Value(42);
/// assert_eq!(ok.value(), Some(&42));
/// assert_eq!(ok.error(), None);
/// assert!(!ok.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Value(T),
    Error(E),
}

impl<T, E> Outcome<T, E> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Error(err) => Some(err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn is_value(&self) -> bool {
        !self.is_error()
    }

    pub fn as_result(&self) -> Result<&T, &E> {
        match self {
            Outcome::Value(value) => Ok(value),
            Outcome::Error(err) => Err(err),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Value(value) => Ok(value),
            Outcome::Error(err) => Err(err),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(err) => Outcome::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome;

    #[test]
    fn test_error_outcome_has_no_value() {
        let outcome: Outcome<String, String> = Outcome::Error("💥".into());
        assert!(outcome.is_error());
        assert!(!outcome.is_value());
        assert_eq!(outcome.value(), None);
        assert_eq!(outcome.error().map(String::as_str), Some("💥"));
        assert_eq!(outcome.into_result(), Err("💥".to_string()));
    }

    #[test]
    fn test_null_value_is_not_an_error() {
        let outcome: Outcome<Option<u8>, ()> = Outcome::Value(None);
        assert!(!outcome.is_error());
        assert_eq!(outcome.value(), Some(&None));
    }

    #[test]
    fn test_from_result() {
        let outcome = Outcome::from(Ok::<_, ()>("🍓"));
        assert_eq!(outcome.as_result(), Ok(&"🍓"));
    }
}
