use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use crate::cell::Cell;
use crate::{Error, Outcome, Provider};

/// The provider half. Only the first `set_value`/`set_error` takes effect.
///
/// # Examples
///
/// ```
/// use promise_pair::{create_future_pair, Error};
/// use std::thread;
/// let (promise, future) = create_future_pair::<String, String>();
///
/// let task1 = thread::spawn(move || {
///     println!("Received {:?}", future.get());
/// });
/// promise.set_value("Hi".into()).unwrap();
/// assert_eq!(promise.set_error("too late".into()), Err(Error::AlreadySet));
/// task1.join().expect("The task1 thread has panicked.");
/// ```
#[derive(Debug)]
pub struct Promise<T, E> {
    cell: Arc<Cell<T, E>>,
}

/// The consumer half. Blocking, bounded and async reads all observe the
/// same published [`Outcome`].
///
/// # Examples
///
/// ```
/// use promise_pair::create_future_pair;
/// use futures::executor::block_on;
/// use std::thread;
/// let (op, op_a) = create_future_pair::<String, ()>();
/// let task1 = thread::spawn(move || block_on(async {
///     println!("我等到了{:?}", op_a.await.unwrap());
/// }));
/// op.set_value(String::from("🍓")).unwrap();
/// task1.join().expect("The task1 thread has panicked");
/// ```
#[derive(Debug)]
pub struct Future<T, E> {
    cell: Arc<Cell<T, E>>,
}

impl<T, E> Provider for Promise<T, E> {
    type Value = T;
    type Error = E;
    type Waiter = Future<T, E>;

    fn new() -> (Self, Self::Waiter) {
        let cell = Arc::new(Cell::new());
        (Self { cell: cell.clone() }, Future { cell })
    }

    fn set_value(&self, value: T) -> Result<(), Error> {
        self.cell.publish(Outcome::Value(value))
    }

    fn set_error(&self, err: E) -> Result<(), Error> {
        self.cell.publish(Outcome::Error(err))
    }
}

impl<T, E> Promise<T, E> {
    pub fn set_value(&self, value: T) -> Result<(), Error> {
        Provider::set_value(self, value)
    }

    pub fn set_error(&self, err: E) -> Result<(), Error> {
        Provider::set_error(self, err)
    }

    pub fn is_finalized(&self) -> bool {
        self.cell.is_finalized()
    }
}

impl<T, E> Drop for Promise<T, E> {
    /// If this is an unfulfilled promise, wake the consumer with
    /// [`Error::Abandoned`].
    fn drop(&mut self) {
        self.cell.abandon()
    }
}

impl<T, E> Future<T, E> {
    /// Blocks until the promise is fulfilled.
    pub fn get(&self) -> Result<Arc<Outcome<T, E>>, Error> {
        self.cell.wait()
    }

    /// Waits at most `timeout`. `Err(Error::Timeout(_))` leaves the future
    /// untouched, so the call may be repeated or followed by [`get`](Self::get).
    pub fn try_get(&self, timeout: Duration) -> Result<Arc<Outcome<T, E>>, Error> {
        self.cell.wait_for(timeout)
    }

    /// True once an outcome has been published. Never blocks.
    pub fn is_ready(&self) -> bool {
        self.cell.peek().is_some()
    }
}

impl<T, E> std::future::Future for Future<T, E> {
    type Output = Result<Arc<Outcome<T, E>>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cell.poll(cx)
    }
}
