//! Observability for wizard sessions.
//!
//! The state machine reports every transition attempt to a
//! [`TransitionObserver`]. Observers can log, collect, or forward attempts
//! to an [`EventSink`] as [`WizardEvent`]s.

mod event;
mod observer;
mod sink;

pub use event::{WizardEvent, SESSION_RESET, TRANSITION_APPLIED, TRANSITION_REJECTED};
pub use observer::{
    AttemptOutcome, CollectingObserver, CompositeObserver, EventSinkObserver, TracingObserver,
    TransitionAttempt, TransitionObserver,
};
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
