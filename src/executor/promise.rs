//! `ResolvePromise`: a single-capacity, non-blocking channel a resolver can
//! return to defer field completion until a later driver cycle (spec §4.6,
//! §5 "Idle handler contract").

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::FieldError;
use crate::future::Future;
use crate::value::Value;

type Slot = Rc<RefCell<Option<Result<Value, FieldError>>>>;

/// The producer half, handed to user code (typically stashed in a batching
/// layer that the idle handler later drains).
#[derive(Clone)]
pub struct ResolvePromiseSender {
    slot: Slot,
}

impl ResolvePromiseSender {
    /// Delivers the final result. Panics if called twice on the same
    /// promise -- the channel has capacity exactly one, per spec §5.
    pub fn resolve(&self, result: Result<Value, FieldError>) {
        let mut slot = self.slot.borrow_mut();
        assert!(slot.is_none(), "ResolvePromise resolved more than once");
        *slot = Some(result);
    }
}

/// The consumer half, polled by the executor's field-execution future.
pub struct ResolvePromise {
    slot: Slot,
}

impl ResolvePromise {
    /// Creates a fresh promise pair. The sender is retained by user code
    /// (usually queued for the next idle-handler invocation); the receiver
    /// is converted into a pollable future via [`ResolvePromise::into_future`].
    pub fn new() -> (ResolvePromiseSender, ResolvePromise) {
        let slot: Slot = Rc::new(RefCell::new(None));
        (
            ResolvePromiseSender { slot: slot.clone() },
            ResolvePromise { slot },
        )
    }

    pub fn into_future<'f>(self) -> Future<'f, Value, FieldError> {
        let slot = self.slot;
        Future::pending(move || slot.borrow_mut().take())
    }

    /// Whether a value has already been delivered without consuming it.
    pub fn is_resolved(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_once_and_is_observed_by_future() {
        let (sender, promise) = ResolvePromise::new();
        let mut future = promise.into_future();
        assert!(!future.poll());
        sender.resolve(Ok(Value::scalar(1i64)));
        assert!(future.poll());
        assert_eq!(future.take(), Ok(Value::scalar(1i64)));
    }

    #[test]
    #[should_panic(expected = "resolved more than once")]
    fn double_resolve_panics() {
        let (sender, _promise) = ResolvePromise::new();
        sender.resolve(Ok(Value::Null));
        sender.resolve(Ok(Value::Null));
    }
}
