//! A hand-rolled, single-threaded cooperative future primitive (spec §4.1).
//!
//! This is deliberately not built on `std::future::Future`: the engine's
//! driver loop (see [`crate::executor`]'s `drive`/`Future::block`) polls the
//! outermost future exactly once per idle-handler cycle, with no waker
//! bookkeeping and no executor dependency. `futures` remains a direct
//! dependency of this crate (as it is for the teacher) but only for its
//! `Stream` trait on the subscription path; the query/mutation execution
//! path never touches it.
//!
//! `Future<'f, T, E>` carries an explicit lifetime on its poll closures
//! (mirroring the teacher's own `Executor<'r, 'a, CtxT, S>` multi-lifetime
//! style) rather than requiring `'static`: field-execution futures close
//! over the borrowed schema and AST for the lifetime of one request, and
//! forcing those into `Rc`/`'static` just to satisfy the combinators would
//! fight the borrow checker for no reason.

use std::fmt;

/// The outcome of a completed [`Future`]: either `T` or an error `E`.
pub type FutureResult<T, E> = Result<T, E>;

/// Returned by [`Future::try_block`] when a future can make no further
/// progress: no idle handler was supplied, or the supplied one gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stalled;

enum State<'f, T, E> {
    Ready(FutureResult<T, E>),
    Pending(Box<dyn FnMut() -> Option<FutureResult<T, E>> + 'f>),
    Taken,
}

/// A lazy, poll-driven value. See the module docs and spec §4.1 for the
/// combinator semantics.
pub struct Future<'f, T, E> {
    state: State<'f, T, E>,
}

impl<T, E> fmt::Debug for Future<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Ready(_) => f.write_str("Future::Ready(..)"),
            State::Pending(_) => f.write_str("Future::Pending(..)"),
            State::Taken => f.write_str("Future::Taken"),
        }
    }
}

impl<'f, T, E> Future<'f, T, E> {
    /// An immediately-ready successful future.
    pub fn ok(value: T) -> Self {
        Future {
            state: State::Ready(Ok(value)),
        }
    }

    /// An immediately-ready failed future.
    pub fn err(error: E) -> Self {
        Future {
            state: State::Ready(Err(error)),
        }
    }

    /// Builds a future whose readiness is driven entirely by repeated calls
    /// to `poll_fn`. `poll_fn` returns `None` while pending, `Some(result)`
    /// once ready; it is never called again after returning `Some`.
    pub fn pending(poll_fn: impl FnMut() -> Option<FutureResult<T, E>> + 'f) -> Self {
        Future {
            state: State::Pending(Box::new(poll_fn)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Advances the future by one step. Returns `true` once (and only once)
    /// the future transitions to ready; further polls after that return
    /// `true` again without doing anything (the result has already been
    /// taken, see [`Future::take`]).
    pub fn poll(&mut self) -> bool {
        match &mut self.state {
            State::Ready(_) => true,
            State::Taken => true,
            State::Pending(poll_fn) => {
                if let Some(result) = poll_fn() {
                    self.state = State::Ready(result);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Polls to readiness, then takes the final result. Panics if called
    /// before the future is ready -- callers must check [`Future::poll`]'s
    /// return value (or use [`Future::block`]) first.
    pub fn take(&mut self) -> FutureResult<T, E> {
        match std::mem::replace(&mut self.state, State::Taken) {
            State::Ready(result) => result,
            State::Taken => panic!("Future::take called twice"),
            State::Pending(_) => panic!("Future::take called on a pending future"),
        }
    }

    /// Polls until ready, calling `idle` whenever a poll makes no progress.
    /// Mirrors the executor's driver loop (spec §4.6 "Driver loop") for
    /// internal/test callers that can guarantee the future never stalls --
    /// panics otherwise, since a stall reaching this primitive is a bug in
    /// the caller's own setup, not a condition an end user can trigger. A
    /// request driver with an end user on the other end (`execute_request`/
    /// `subscribe`) must use [`Future::try_block`] instead, which turns the
    /// same condition into a returned [`Stalled`] rather than unwinding.
    pub fn block(mut self, mut idle: impl FnMut() -> bool) -> FutureResult<T, E> {
        loop {
            if self.poll() {
                return self.take();
            }
            if !idle() {
                panic!("future stalled with no idle handler able to make progress");
            }
        }
    }

    /// Polls until ready, calling `idle` whenever a poll makes no progress.
    /// Returns `Err(Stalled)` -- instead of [`Future::block`]'s panic --
    /// when no idle handler is available at all, or the supplied one
    /// reports it could make no further progress (spec §4.6 "Driver loop":
    /// "if idle handler is nil: error 'no idle handler defined'"; spec §8
    /// property 7: such a request "must fail with a well-defined error").
    pub fn try_block(mut self, mut idle: Option<&mut dyn FnMut() -> bool>) -> Result<FutureResult<T, E>, Stalled> {
        loop {
            if self.poll() {
                return Ok(self.take());
            }
            match idle.as_deref_mut() {
                Some(idle) if idle() => {}
                _ => return Err(Stalled),
            }
        }
    }

    /// Transforms the full result, eagerly if already ready.
    pub fn map<U>(self, f: impl FnOnce(FutureResult<T, E>) -> FutureResult<U, E> + 'f) -> Future<'f, U, E>
    where
        T: 'f,
        E: 'f,
        U: 'f,
    {
        match self.state {
            State::Ready(result) => Future {
                state: State::Ready(f(result)),
            },
            State::Taken => unreachable!("mapping a taken future"),
            State::Pending(mut poll_fn) => {
                let mut f = Some(f);
                Future::pending(move || {
                    poll_fn().map(|result| (f.take().expect("polled after ready"))(result))
                })
            }
        }
    }

    /// Transforms only the success branch; errors pass through untouched.
    pub fn map_ok<U>(self, f: impl FnOnce(T) -> U + 'f) -> Future<'f, U, E>
    where
        T: 'f,
        E: 'f,
        U: 'f,
    {
        self.map(move |result| result.map(f))
    }

    /// Monadic bind: chains another future computed from this one's result.
    pub fn then<U>(self, f: impl FnOnce(FutureResult<T, E>) -> Future<'f, U, E> + 'f) -> Future<'f, U, E>
    where
        T: 'f,
        E: 'f,
        U: 'f,
    {
        enum ThenState<'f, T, E, U> {
            First(Future<'f, T, E>, Option<Box<dyn FnOnce(FutureResult<T, E>) -> Future<'f, U, E> + 'f>>),
            Second(Future<'f, U, E>),
        }

        let mut state = ThenState::First(self, Some(Box::new(f)));
        Future::pending(move || loop {
            match &mut state {
                ThenState::First(first, f) => {
                    if !first.poll() {
                        return None;
                    }
                    let result = first.take();
                    let f = f.take().expect("polled after ready");
                    state = ThenState::Second(f(result));
                }
                ThenState::Second(second) => {
                    if second.poll() {
                        return Some(second.take());
                    }
                    return None;
                }
            }
        })
    }

    /// Collects every input future's result, short-circuiting to the first
    /// error encountered in poll order.
    pub fn join(futures: Vec<Future<'f, T, E>>) -> Future<'f, Vec<T>, E>
    where
        T: 'f,
        E: 'f,
    {
        let mut slots: Vec<Option<T>> = futures.iter().map(|_| None).collect();
        let mut futures = futures;
        Future::pending(move || {
            for (slot, fut) in slots.iter_mut().zip(futures.iter_mut()) {
                if slot.is_none() {
                    fut.poll();
                }
            }
            for (slot, fut) in slots.iter_mut().zip(futures.iter_mut()) {
                if slot.is_none() && fut.is_ready() {
                    match fut.take() {
                        Ok(value) => *slot = Some(value),
                        Err(error) => return Some(Err(error)),
                    }
                }
            }
            if slots.iter().all(Option::is_some) {
                Some(Ok(slots.iter_mut().map(|s| s.take().unwrap()).collect()))
            } else {
                None
            }
        })
    }
}

impl<'f, E: 'f> Future<'f, (), E> {
    /// Like [`Future::join`] but discards the values -- the allocation-lean
    /// variant used when the executor only needs to know "all siblings are
    /// done", not their individual results (they were already written
    /// directly into the response map via [`crate::value::Object::add_field`]).
    pub fn after<T: 'f>(futures: Vec<Future<'f, T, E>>) -> Future<'f, (), E> {
        Future::join(futures).map(|result| result.map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_immediately_ready() {
        let mut f = Future::<i32, String>::ok(5);
        assert!(f.poll());
        assert_eq!(f.take(), Ok(5));
    }

    #[test]
    fn pending_resolves_after_n_polls() {
        let mut remaining = 2;
        let mut f = Future::<i32, String>::pending(move || {
            if remaining == 0 {
                Some(Ok(42))
            } else {
                remaining -= 1;
                None
            }
        });
        assert!(!f.poll());
        assert!(!f.poll());
        assert!(f.poll());
        assert_eq!(f.take(), Ok(42));
    }

    #[test]
    fn err_propagates_through_map_and_then() {
        let f = Future::<i32, &str>::err("boom");
        let f = f.map_ok(|v| v + 1);
        let f = f.then(|r| match r {
            Ok(v) => Future::ok(v + 1),
            Err(e) => Future::err(e),
        });
        let result = f.block(|| false);
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn join_collects_in_order() {
        let f = Future::join(vec![
            Future::<i32, &str>::ok(1),
            Future::<i32, &str>::ok(2),
            Future::<i32, &str>::ok(3),
        ]);
        assert_eq!(f.block(|| false), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn join_short_circuits_on_error() {
        let f = Future::join(vec![
            Future::<i32, &str>::ok(1),
            Future::<i32, &str>::err("nope"),
        ]);
        assert_eq!(f.block(|| false), Err("nope"));
    }

    #[test]
    fn block_invokes_idle_handler_until_progress() {
        let mut calls = 0;
        let mut remaining = 3;
        let f = Future::<i32, &str>::pending(move || {
            if remaining == 0 {
                Some(Ok(7))
            } else {
                remaining -= 1;
                None
            }
        });
        let result = f.block(|| {
            calls += 1;
            true
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls, 3);
    }

    #[test]
    #[should_panic(expected = "stalled")]
    fn block_panics_if_idle_never_makes_progress() {
        let f = Future::<i32, &str>::pending(|| None);
        let _ = f.block(|| false);
    }

    #[test]
    fn try_block_reports_stalled_with_no_idle_handler_instead_of_panicking() {
        let f = Future::<i32, &str>::pending(|| None);
        assert_eq!(f.try_block(None), Err(Stalled));
    }

    #[test]
    fn try_block_reports_stalled_when_idle_handler_gives_up() {
        let f = Future::<i32, &str>::pending(|| None);
        let mut idle = || false;
        assert_eq!(f.try_block(Some(&mut idle)), Err(Stalled));
    }

    #[test]
    fn try_block_resolves_once_idle_handler_delivers_progress() {
        let mut remaining = 2;
        let f = Future::<i32, &str>::pending(move || {
            if remaining == 0 {
                Some(Ok(9))
            } else {
                remaining -= 1;
                None
            }
        });
        let mut idle = || true;
        assert_eq!(f.try_block(Some(&mut idle)), Ok(Ok(9)));
    }

    #[test]
    fn future_can_borrow_non_static_data() {
        let numbers = vec![1, 2, 3];
        let mut remaining = 1;
        let f = Future::<i32, &str>::pending(move || {
            if remaining == 0 {
                Some(Ok(numbers.iter().sum()))
            } else {
                remaining -= 1;
                None
            }
        });
        assert_eq!(f.block(|| true), Ok(6));
    }
}
