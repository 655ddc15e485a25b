//! The single-slot cell shared by a [`Promise`](crate::Promise) and its
//! [`Future`](crate::Future).
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::{Error, Outcome};

pub(crate) type Shared<T, E> = Arc<Outcome<T, E>>;

#[derive(Debug)]
struct Slot<T, E> {
    outcome: Option<Shared<T, E>>,
    abandoned: bool,
    waker: Option<Waker>,
}

impl<T, E> Slot<T, E> {
    fn ready(&self) -> Option<Result<Shared<T, E>, Error>> {
        match self.outcome {
            Some(ref outcome) => Some(Ok(outcome.clone())),
            None if self.abandoned => Some(Err(Error::Abandoned)),
            None => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Cell<T, E> {
    finalized: AtomicBool,
    slot: Mutex<Slot<T, E>>,
    published: Condvar,
}

impl<T, E> Cell<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            finalized: AtomicBool::new(false),
            slot: Mutex::new(Slot {
                outcome: None,
                abandoned: false,
                waker: None,
            }),
            published: Condvar::new(),
        }
    }

    pub(crate) fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Stores `outcome` if nothing was stored before.
    ///
    /// The compare-exchange on `finalized` picks the single winner; the slot
    /// is written only by that winner, so readers never see two outcomes.
    pub(crate) fn publish(&self, outcome: Outcome<T, E>) -> Result<(), Error> {
        if self
            .finalized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(is_error = outcome.is_error(), "rejected second fulfillment");
            return Err(Error::AlreadySet);
        }
        let is_error = outcome.is_error();
        self.release(|slot| slot.outcome = Some(Arc::new(outcome)));
        tracing::trace!(is_error, "published outcome");
        Ok(())
    }

    /// Marks an unfulfilled cell as abandoned so readers stop waiting.
    pub(crate) fn abandon(&self) {
        if self.finalized.swap(true, Ordering::AcqRel) {
            return;
        }
        self.release(|slot| slot.abandoned = true);
        tracing::debug!("promise dropped before fulfillment");
    }

    fn release(&self, update: impl FnOnce(&mut Slot<T, E>)) {
        let waker = {
            let mut slot = self.slot.lock();
            update(&mut slot);
            slot.waker.take()
        };
        self.published.notify_all();
        if let Some(waker) = waker {
            waker.wake()
        }
    }

    pub(crate) fn peek(&self) -> Option<Shared<T, E>> {
        self.slot.lock().outcome.clone()
    }

    pub(crate) fn wait(&self) -> Result<Shared<T, E>, Error> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(ready) = slot.ready() {
                return ready;
            }
            self.published.wait(&mut slot);
        }
    }

    pub(crate) fn wait_for(&self, timeout: Duration) -> Result<Shared<T, E>, Error> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait();
        };
        let mut slot = self.slot.lock();
        loop {
            if let Some(ready) = slot.ready() {
                return ready;
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(timeout));
            }
            // Spurious and timed-out wakeups both loop back to the check above.
            self.published.wait_until(&mut slot, deadline);
        }
    }

    pub(crate) fn poll(&self, cx: &mut Context<'_>) -> Poll<Result<Shared<T, E>, Error>> {
        let mut slot = self.slot.lock();
        match slot.ready() {
            Some(ready) => Poll::Ready(ready),
            None => {
                let stale = !matches!(slot.waker, Some(ref waker) if waker.will_wake(cx.waker()));
                if stale {
                    slot.waker = Some(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}
