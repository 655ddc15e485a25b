//! A single-use hand-off of one value or one error from a provider to a
//! consumer.
//!
//! The provider keeps the [`Promise`] and fulfills it exactly once with
//! [`Promise::set_value`] or [`Promise::set_error`]. The consumer keeps the
//! [`Future`] and either blocks on [`Future::get`], polls with a bounded
//! [`Future::try_get`] as often as it likes, or `.await`s it.
//!
//! # Examples
//!
//! ```
//! use promise_pair::create_future_pair;
//! use std::{thread, time::Duration};
//!
//! let (promise, future) = create_future_pair::<String, std::io::Error>();
//! let consumer = thread::spawn(move || future.get().unwrap());
//! thread::sleep(Duration::from_millis(1));
//! promise.set_value("hello".into()).unwrap();
//! assert_eq!(consumer.join().unwrap().value().map(String::as_str), Some("hello"));
//! ```
use std::time::Duration;

mod cell;
pub mod outcome;
pub mod pair;
pub mod service;
pub mod untyped;

pub use outcome::Outcome;
pub use pair::{Future, Promise};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("illegal state: promise already set")]
    AlreadySet,
    #[error("no result within {0:?}")]
    Timeout(Duration),
    #[error("promise dropped without a result")]
    Abandoned,
}

impl Error {
    /// True for the retriable `try_get` sentinel.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

/// The provider side of a promise/future pair.
pub trait Provider {
    type Value;
    type Error;
    type Waiter;

    /// Allocates the shared cell and returns both handles at once.
    fn new() -> (Self, Self::Waiter)
    where
        Self: Sized;

    /// Fulfills with a value. Fails with [`Error::AlreadySet`] if anything
    /// already fulfilled this pair.
    fn set_value(&self, value: Self::Value) -> Result<(), Error>;

    /// Fulfills with an error, under the same guard as `set_value`.
    fn set_error(&self, err: Self::Error) -> Result<(), Error>;
}

/// Creates a connected [`Promise`] and [`Future`].
pub fn create_future_pair<T, E>() -> (Promise<T, E>, Future<T, E>) {
    <Promise<T, E> as Provider>::new()
}
