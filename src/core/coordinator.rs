//! Multi-part message coordination
//!
//! A multi-part message is opened by a `Begin` fragment, extended by any
//! number of `Continue` fragments and closed by `End`. While one is open, the
//! thread that opened it owns the delivery token and every other thread that
//! wants to deliver anything blocks until `End`. Single-shot messages also
//! take the token for the duration of their delivery, so all appenders see
//! fragments in the same global order.
//!
//! Out-of-sequence fragments never corrupt the stream. They are delivered
//! in the nearest well-formed shape and reported as a [`ProtocolViolation`]:
//!
//! | open sequence | incoming   | outcome                                    |
//! |---------------|------------|--------------------------------------------|
//! | no            | `Continue` | delivered as `Complete`                    |
//! | no            | `End`      | delivered as `Complete`                    |
//! | yes           | `Begin`    | open one closed, then delivered `Complete` |
//! | yes           | `Complete` | open one closed, then delivered `Complete` |
//!
//! The registry snapshot taken at `Begin` is pinned for the whole message:
//! its `Continue`, `End` and any closing `End` go to exactly the appenders
//! that received the `Begin`, whatever is added or removed in between.

use super::{
    message_state::MessageState,
    module::Module,
    registry::{AppenderRegistry, Snapshot},
    severity::Severity,
};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::thread::{self, ThreadId};

/// Out-of-sequence use of the multi-part protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolViolation {
    /// `Continue` with no open multi-part message on this thread
    ContinueWithoutBegin,
    /// `End` with no open multi-part message on this thread
    EndWithoutBegin,
    /// `Begin` while this thread already has a message open
    NestedBegin,
    /// `Complete` while this thread has a message open
    CompleteInsideSequence,
    /// A [`MultipartMessage`](super::MultipartMessage) dropped without `end`
    AbandonedSequence,
    /// Shutdown or reinit while a message was open
    ClosedByLifecycle,
}

impl ProtocolViolation {
    pub fn description(&self) -> &'static str {
        match self {
            ProtocolViolation::ContinueWithoutBegin => "continue without a matching begin",
            ProtocolViolation::EndWithoutBegin => "end without a matching begin",
            ProtocolViolation::NestedBegin => "begin while a multi-part message is open",
            ProtocolViolation::CompleteInsideSequence => {
                "single-shot message while a multi-part message is open"
            }
            ProtocolViolation::AbandonedSequence => "multi-part message dropped without end",
            ProtocolViolation::ClosedByLifecycle => "multi-part message open at shutdown",
        }
    }
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Tags recorded when a multi-part message is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenSequence {
    pub severity: Severity,
    pub module: Module,
}

/// What to deliver for one incoming fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    /// Sequence to close with an empty `End` before delivering
    pub close: Option<OpenSequence>,
    pub severity: Severity,
    pub state: MessageState,
    pub violation: Option<ProtocolViolation>,
}

/// Resolve an incoming fragment against the current open sequence.
/// Returns the transition and the open sequence afterwards.
pub(crate) fn transition(
    open: Option<OpenSequence>,
    incoming: MessageState,
    tags: OpenSequence,
) -> (Transition, Option<OpenSequence>) {
    use MessageState::*;

    let deliver = |close, severity, state, violation| Transition {
        close,
        severity,
        state,
        violation,
    };

    match (open, incoming) {
        (None, Complete) => (deliver(None, tags.severity, Complete, None), None),
        (None, Begin) => (deliver(None, tags.severity, Begin, None), Some(tags)),
        (None, Continue) => (
            deliver(
                None,
                tags.severity,
                Complete,
                Some(ProtocolViolation::ContinueWithoutBegin),
            ),
            None,
        ),
        (None, End) => (
            deliver(
                None,
                tags.severity,
                Complete,
                Some(ProtocolViolation::EndWithoutBegin),
            ),
            None,
        ),
        (Some(seq), Continue) => (deliver(None, seq.severity, Continue, None), Some(seq)),
        (Some(seq), End) => (deliver(None, seq.severity, End, None), None),
        (Some(seq), Begin) => (
            deliver(
                Some(seq),
                tags.severity,
                Complete,
                Some(ProtocolViolation::NestedBegin),
            ),
            None,
        ),
        (Some(seq), Complete) => (
            deliver(
                Some(seq),
                tags.severity,
                Complete,
                Some(ProtocolViolation::CompleteInsideSequence),
            ),
            None,
        ),
    }
}

#[derive(Debug, Default)]
struct Stream {
    owner: Option<ThreadId>,
    open: Option<OpenSequence>,
    /// Appenders that received the open sequence's `Begin`
    pinned: Option<Snapshot>,
}

/// Exclusive delivery token plus the open-sequence state
#[derive(Debug, Default)]
pub(crate) struct Coordinator {
    stream: Mutex<Stream>,
    released: Condvar,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the calling thread may deliver, then hold the token until
    /// the returned [`Turn`] is dropped (or longer, if it leaves a sequence
    /// open).
    pub fn acquire(&self) -> Turn<'_> {
        let me = thread::current().id();
        let mut stream = self.stream.lock();
        while stream.owner.is_some_and(|owner| owner != me) {
            self.released.wait(&mut stream);
        }
        stream.owner = Some(me);

        Turn {
            coordinator: self,
            open: stream.open,
            pinned: stream.pinned.take(),
        }
    }

    /// Whether the calling thread has a multi-part message open
    pub fn owns_open_sequence(&self) -> bool {
        let stream = self.stream.lock();
        stream.open.is_some() && stream.owner == Some(thread::current().id())
    }

    /// Forget any open sequence and release the token, returning the
    /// sequence with the appenders still owed its `End`. Exclusive access
    /// guarantees no thread is waiting or delivering.
    pub fn take_open(&mut self) -> Option<(OpenSequence, Snapshot)> {
        let stream = self.stream.get_mut();
        stream.owner = None;
        let pinned = stream.pinned.take();
        stream.open.take().map(|open| (open, pinned.unwrap_or_default()))
    }
}

/// Where the fragments of one dispatch go
pub(crate) struct Route {
    pub step: Transition,
    /// Appenders owed the closing `End` of an interrupted sequence
    pub close_to: Option<Snapshot>,
    /// Appenders receiving the fragment itself
    pub deliver_to: Snapshot,
}

/// Proof of holding the delivery token.
///
/// Dropping it publishes the resulting open-sequence state; when no sequence
/// is left open the token is released and waiters are woken. Release happens
/// on every exit path, including unwinding.
pub(crate) struct Turn<'a> {
    coordinator: &'a Coordinator,
    open: Option<OpenSequence>,
    pinned: Option<Snapshot>,
}

impl Turn<'_> {
    /// Apply `incoming` to the state machine
    pub fn advance(&mut self, incoming: MessageState, tags: OpenSequence) -> Transition {
        let (step, next) = transition(self.open, incoming, tags);
        self.open = next;
        step
    }

    /// Apply `incoming` and resolve the appenders for each fragment.
    ///
    /// `Begin` pins a fresh snapshot of `registry`; `Continue`, `End` and a
    /// forced close reuse the pinned one. Everything else sees the registry
    /// as it is now.
    pub fn route(
        &mut self,
        incoming: MessageState,
        tags: OpenSequence,
        registry: &AppenderRegistry,
    ) -> Route {
        let step = self.advance(incoming, tags);

        let close_to = step
            .close
            .map(|_| self.pinned.take().unwrap_or_else(|| registry.snapshot()));

        let deliver_to = match step.state {
            MessageState::Begin => {
                let snapshot = registry.snapshot();
                self.pinned = Some(Snapshot::clone(&snapshot));
                snapshot
            }
            MessageState::Continue => match &self.pinned {
                Some(pinned) => Snapshot::clone(pinned),
                None => registry.snapshot(),
            },
            MessageState::End => self.pinned.take().unwrap_or_else(|| registry.snapshot()),
            MessageState::Complete => registry.snapshot(),
        };

        Route {
            step,
            close_to,
            deliver_to,
        }
    }

    /// Close the open sequence, if any, returning it with the appenders
    /// still owed its `End`
    pub fn close(&mut self) -> Option<(OpenSequence, Snapshot)> {
        let pinned = self.pinned.take();
        self.open
            .take()
            .map(|open| (open, pinned.unwrap_or_default()))
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        let mut stream = self.coordinator.stream.lock();
        stream.open = self.open;
        if self.open.is_none() {
            stream.pinned = None;
            stream.owner = None;
            drop(stream);
            self.coordinator.released.notify_all();
        } else {
            stream.pinned = self.pinned.take();
        }
    }
}
