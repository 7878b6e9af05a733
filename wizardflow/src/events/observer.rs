//! Transition observers.
//!
//! An observer is notified of every transition attempt the state machine
//! makes, whether it was applied or rejected. The default observer logs
//! through `tracing`; tests typically install a [`CollectingObserver`].

use super::{EventSink, WizardEvent};
use crate::core::WizardState;
use crate::errors::WizardError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The transition was applied and recorded in the history.
    Applied,
    /// The transition was rejected; nothing changed.
    Rejected(WizardError),
}

/// A single transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionAttempt {
    /// The operation that made the attempt.
    pub operation: &'static str,
    /// The state before the attempt.
    pub from: WizardState,
    /// The requested target.
    pub to: WizardState,
    /// Reason passed with the attempt.
    pub reason: Option<String>,
    /// Result of the attempt.
    pub outcome: AttemptOutcome,
    /// When the attempt was made.
    pub timestamp: DateTime<Utc>,
}

impl TransitionAttempt {
    /// Returns true if the transition was applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Applied)
    }

    /// Returns the rejection error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&WizardError> {
        match &self.outcome {
            AttemptOutcome::Applied => None,
            AttemptOutcome::Rejected(err) => Some(err),
        }
    }

    /// Converts the attempt into a sink event.
    #[must_use]
    pub fn to_event(&self) -> WizardEvent {
        let event = match &self.outcome {
            AttemptOutcome::Applied if self.operation == "reset" => WizardEvent::reset(self.from),
            AttemptOutcome::Applied => WizardEvent::applied(self.from, self.to, self.operation),
            AttemptOutcome::Rejected(err) => {
                WizardEvent::rejected(self.from, self.to, self.operation, &err.to_string())
                    .add_data("code", serde_json::json!(err.code()))
                    .add_data("category", serde_json::json!(err.category()))
            }
        };
        match &self.reason {
            Some(reason) => event.add_data("reason", serde_json::json!(reason)),
            None => event,
        }
    }
}

/// Receives every transition attempt.
pub trait TransitionObserver: Send + Sync {
    /// Called once per attempt, after the machine has applied or rejected it.
    fn on_attempt(&self, attempt: &TransitionAttempt);
}

impl<F> TransitionObserver for F
where
    F: Fn(&TransitionAttempt) + Send + Sync,
{
    fn on_attempt(&self, attempt: &TransitionAttempt) {
        self(attempt);
    }
}

/// Logs applied transitions at DEBUG and rejections at WARN.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransitionObserver for TracingObserver {
    fn on_attempt(&self, attempt: &TransitionAttempt) {
        match &attempt.outcome {
            AttemptOutcome::Applied => debug!(
                operation = attempt.operation,
                from = %attempt.from,
                to = %attempt.to,
                reason = attempt.reason.as_deref().unwrap_or(""),
                "State transition: {} -> {}", attempt.from, attempt.to
            ),
            AttemptOutcome::Rejected(err) => warn!(
                operation = attempt.operation,
                from = %attempt.from,
                to = %attempt.to,
                category = %err.category(),
                error = %err,
                "Transition rejected"
            ),
        }
    }
}

/// Keeps every attempt in memory.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    attempts: parking_lot::RwLock<Vec<TransitionAttempt>>,
}

impl CollectingObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded attempts.
    #[must_use]
    pub fn attempts(&self) -> Vec<TransitionAttempt> {
        self.attempts.read().clone()
    }

    /// Returns only the applied attempts.
    #[must_use]
    pub fn applied(&self) -> Vec<TransitionAttempt> {
        self.attempts
            .read()
            .iter()
            .filter(|a| a.is_applied())
            .cloned()
            .collect()
    }

    /// Returns only the rejected attempts.
    #[must_use]
    pub fn rejected(&self) -> Vec<TransitionAttempt> {
        self.attempts
            .read()
            .iter()
            .filter(|a| !a.is_applied())
            .cloned()
            .collect()
    }

    /// Returns the applied path as `(from, to)` pairs.
    #[must_use]
    pub fn applied_path(&self) -> Vec<(WizardState, WizardState)> {
        self.applied().iter().map(|a| (a.from, a.to)).collect()
    }

    /// Returns the number of recorded attempts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.read().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.read().is_empty()
    }

    /// Clears all recorded attempts.
    pub fn clear(&self) {
        self.attempts.write().clear();
    }

    /// Drains the recorded attempts into `sink` as events, oldest first.
    ///
    /// Returns how many events were emitted. The lock is released before
    /// the first await.
    pub async fn flush_to(&self, sink: &dyn EventSink) -> usize {
        let drained = std::mem::take(&mut *self.attempts.write());
        for attempt in &drained {
            sink.emit(attempt.to_event()).await;
        }
        drained.len()
    }
}

impl TransitionObserver for CollectingObserver {
    fn on_attempt(&self, attempt: &TransitionAttempt) {
        self.attempts.write().push(attempt.clone());
    }
}

/// Forwards attempts to an [`EventSink`] as wizard events.
pub struct EventSinkObserver {
    sink: Arc<dyn EventSink>,
}

impl EventSinkObserver {
    /// Creates an observer forwarding to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

impl std::fmt::Debug for EventSinkObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSinkObserver").finish_non_exhaustive()
    }
}

impl TransitionObserver for EventSinkObserver {
    fn on_attempt(&self, attempt: &TransitionAttempt) {
        self.sink.try_emit(attempt.to_event());
    }
}

/// Fans one attempt out to several observers, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn TransitionObserver>>,
}

impl CompositeObserver {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer.
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn TransitionObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl TransitionObserver for CompositeObserver {
    fn on_attempt(&self, attempt: &TransitionAttempt) {
        for observer in &self.observers {
            observer.on_attempt(attempt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CollectingEventSink, TRANSITION_APPLIED, TRANSITION_REJECTED};

    fn attempt(outcome: AttemptOutcome) -> TransitionAttempt {
        TransitionAttempt {
            operation: "transition_to",
            from: WizardState::Idle,
            to: WizardState::PromptReceived,
            reason: Some("prompt".to_string()),
            outcome,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_closure_observer() {
        let seen = Arc::new(parking_lot::Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let observer = move |_: &TransitionAttempt| *counter.lock() += 1;

        observer.on_attempt(&attempt(AttemptOutcome::Applied));
        observer.on_attempt(&attempt(AttemptOutcome::Applied));
        assert_eq!(*seen.lock(), 2);
    }

    #[test]
    fn test_collecting_observer_split() {
        let observer = CollectingObserver::new();
        observer.on_attempt(&attempt(AttemptOutcome::Applied));
        observer.on_attempt(&attempt(AttemptOutcome::Rejected(WizardError::EmptyBlueprint)));

        assert_eq!(observer.len(), 2);
        assert_eq!(observer.applied().len(), 1);
        assert_eq!(observer.rejected()[0].error(), Some(&WizardError::EmptyBlueprint));
        assert_eq!(
            observer.applied_path(),
            vec![(WizardState::Idle, WizardState::PromptReceived)]
        );
    }

    #[test]
    fn test_event_sink_observer() {
        let sink = Arc::new(CollectingEventSink::new());
        let observer = EventSinkObserver::new(sink.clone());

        observer.on_attempt(&attempt(AttemptOutcome::Applied));
        observer.on_attempt(&attempt(AttemptOutcome::Rejected(WizardError::EmptyUnderstanding)));

        let events = sink.events();
        assert_eq!(events[0].event_type, TRANSITION_APPLIED);
        assert_eq!(events[0].get("reason"), Some(&serde_json::json!("prompt")));
        assert_eq!(events[1].event_type, TRANSITION_REJECTED);
        assert_eq!(events[1].get("category"), Some(&serde_json::json!("guard")));
    }

    #[tokio::test]
    async fn test_flush_collected_attempts_to_async_sink() {
        let observer = Arc::new(CollectingObserver::new());
        let mut machine =
            crate::machine::WorkflowStateMachine::new().with_observer(observer.clone());
        machine.set_user_prompt("Send a weekly digest").unwrap();
        assert!(machine.start_building().is_err());

        let sink = CollectingEventSink::new();
        assert_eq!(observer.flush_to(&sink).await, 2);

        assert!(observer.is_empty());
        let events = sink.events();
        assert_eq!(events[0].event_type, TRANSITION_APPLIED);
        assert_eq!(events[1].event_type, TRANSITION_REJECTED);
        assert_eq!(observer.flush_to(&sink).await, 0);
    }

    #[test]
    fn test_reset_maps_to_session_reset_event() {
        let mut reset = attempt(AttemptOutcome::Applied);
        reset.operation = "reset";
        reset.reason = None;
        assert_eq!(reset.to_event().event_type, crate::events::SESSION_RESET);
    }

    #[test]
    fn test_composite_observer() {
        let first = Arc::new(CollectingObserver::new());
        let second = Arc::new(CollectingObserver::new());
        let composite = CompositeObserver::new()
            .with(first.clone())
            .with(second.clone());

        composite.on_attempt(&attempt(AttemptOutcome::Applied));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_tracing_observer_does_not_panic() {
        TracingObserver.on_attempt(&attempt(AttemptOutcome::Applied));
        TracingObserver.on_attempt(&attempt(AttemptOutcome::Rejected(WizardError::EmptyBlueprint)));
    }
}
