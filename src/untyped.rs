//! Type-erased pairs for callers that hand off heterogeneous payloads.
//!
//! `None` is a legal value and stays distinct from an error. Errors are
//! always present, since [`AnyError`] is not optional.
use std::any::Any;

use crate::{create_future_pair, Future, Outcome, Promise};

pub type AnyValue = Option<Box<dyn Any + Send + Sync>>;
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

pub type UntypedPromise = Promise<AnyValue, AnyError>;
pub type UntypedFuture = Future<AnyValue, AnyError>;
pub type UntypedOutcome = Outcome<AnyValue, AnyError>;

pub fn create_untyped_pair() -> (UntypedPromise, UntypedFuture) {
    create_future_pair()
}

impl UntypedPromise {
    /// Boxes `value` and fulfills with it.
    pub fn set_boxed<V: Any + Send + Sync>(&self, value: V) -> Result<(), crate::Error> {
        self.set_value(Some(Box::new(value)))
    }
}

impl UntypedOutcome {
    /// The value as a `V`, or `None` on error, null value or type mismatch.
    pub fn downcast_value<V: Any>(&self) -> Option<&V> {
        self.value()?.as_deref()?.downcast_ref::<V>()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Outcome::Value(None))
    }
}
