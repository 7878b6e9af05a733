//! Per-session machine registry.
//!
//! A [`WorkflowStateMachine`] does no locking of its own. The registry owns
//! one machine per session behind a mutex, so concurrent callers touching
//! the same session are serialized while different sessions never contend.

use crate::config::{ConfigError, MachineConfig};
use crate::core::WizardState;
use crate::events::{TracingObserver, TransitionObserver};
use crate::machine::WorkflowStateMachine;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A machine shared between the tasks working on one session.
pub type SharedMachine = Arc<Mutex<WorkflowStateMachine>>;

/// Registry of live wizard sessions keyed by session id.
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SharedMachine>,
    config: MachineConfig,
    observer: Arc<dyn TransitionObserver>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Creates a registry whose sessions use the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            config: MachineConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Creates a registry whose sessions use `config`.
    pub fn with_config(config: MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Sets the observer shared by every new session.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TransitionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Starts a new session and returns its id and machine.
    pub fn create(&self) -> (Uuid, SharedMachine) {
        let id = Uuid::new_v4();
        let machine = WorkflowStateMachine::from_validated(self.config.clone(), Arc::clone(&self.observer));
        let shared = Arc::new(Mutex::new(machine));
        self.sessions.insert(id, Arc::clone(&shared));
        debug!(session_id = %id, "Wizard session created");
        (id, shared)
    }

    /// Returns the machine for `id`.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<SharedMachine> {
        self.sessions.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Runs `f` with exclusive access to the session's machine.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut WorkflowStateMachine) -> R) -> Option<R> {
        let shared = self.get(id)?;
        let mut machine = shared.lock();
        Some(f(&mut machine))
    }

    /// Returns the current state of a session.
    #[must_use]
    pub fn state_of(&self, id: Uuid) -> Option<WizardState> {
        self.with_session(id, |machine| machine.current_state())
    }

    /// Removes a session.
    pub fn remove(&self, id: Uuid) -> Option<SharedMachine> {
        let removed = self.sessions.remove(&id).map(|(_, machine)| machine);
        if removed.is_some() {
            debug!(session_id = %id, "Wizard session removed");
        }
        removed
    }

    /// Removes every session whose workflow is ready; returns how many.
    pub fn prune_completed(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, machine| machine.lock().current_state() != WizardState::WorkflowReady);
        before - self.sessions.len()
    }

    /// Ids of all live sessions.
    #[must_use]
    pub fn ids(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Returns the number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if there are no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingObserver;
    use crate::testing::{drive_to, sample_blueprint};

    #[test]
    fn test_create_and_get() {
        let registry = SessionRegistry::new();
        let (id, machine) = registry.create();

        assert_eq!(registry.len(), 1);
        assert_eq!(machine.lock().current_state(), WizardState::Idle);
        assert!(Arc::ptr_eq(&machine, &registry.get(id).unwrap()));
        assert!(registry.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_with_session() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.create();

        let result = registry.with_session(id, |m| m.set_user_prompt("Archive Slack threads"));
        assert_eq!(result, Some(Ok(())));
        assert_eq!(registry.state_of(id), Some(WizardState::PromptReceived));
        assert_eq!(registry.with_session(Uuid::new_v4(), |m| m.current_state()), None);
    }

    #[test]
    fn test_sessions_use_registry_config() {
        let registry = SessionRegistry::with_config(MachineConfig::new().with_max_retries(5)).unwrap();
        let (_, machine) = registry.create();
        assert_eq!(machine.lock().config().max_retries, 5);

        assert!(SessionRegistry::with_config(MachineConfig::new().with_max_retries(0)).is_err());
    }

    #[test]
    fn test_shared_observer() {
        let observer = Arc::new(CollectingObserver::new());
        let registry = SessionRegistry::new().with_observer(observer.clone());

        for _ in 0..3 {
            let (id, _) = registry.create();
            registry.with_session(id, |m| m.set_user_prompt("Digest new issues")).unwrap().unwrap();
        }
        assert_eq!(observer.applied().len(), 3);
    }

    #[test]
    fn test_remove_and_prune() {
        let registry = SessionRegistry::new();
        let (done, _) = registry.create();
        let (open, _) = registry.create();
        let (gone, _) = registry.create();

        registry
            .with_session(done, |m| drive_to(m, WizardState::WorkflowReady))
            .unwrap()
            .unwrap();
        assert!(registry.remove(gone).is_some());
        assert!(registry.remove(gone).is_none());

        assert_eq!(registry.prune_completed(), 1);
        assert_eq!(registry.ids(), vec![open]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sessions() {
        let registry = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let (id, _) = registry.create();
                registry
                    .with_session(id, |m| {
                        drive_to(m, WizardState::WorkflowBuilding)?;
                        m.move_to_validation(sample_blueprint())?;
                        m.move_to_ready()
                    })
                    .unwrap()
                    .map(|()| id)
            }));
        }

        for handle in handles {
            let id = handle.await.unwrap().unwrap();
            assert_eq!(registry.state_of(id), Some(WizardState::WorkflowReady));
        }
        assert_eq!(registry.len(), 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contended_session_is_serialized() {
        let registry = Arc::new(SessionRegistry::new());
        let (id, _) = registry.create();
        registry
            .with_session(id, |m| drive_to(m, WizardState::ClarificationActive))
            .unwrap()
            .unwrap();

        let mut handles = Vec::new();
        for round in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.with_session(id, |m| {
                    m.set_clarifying_answers(
                        [(format!("q{round}"), "yes".to_string())].into_iter().collect(),
                    );
                })
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let answers = registry
            .with_session(id, |m| m.state().clarifying_answers().len())
            .unwrap();
        assert_eq!(answers, 16);
    }
}
