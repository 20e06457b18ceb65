use std::sync::Arc;

use tokio::sync::Mutex;
use sc_core::setup::{SetupState, WizardDraft};

/// Shared setup context containing state, draft and dispatch lock.
///
/// ## Lock Ordering
/// When acquiring several locks, acquire `dispatch_lock` first, then `state`,
/// then `draft`.
/// - `dispatch_lock`: Held for a whole host call so that a step runs to
///   completion before the next one starts.
/// - `state` / `draft`: Short-lived, never held across an `.await` on a port.
#[derive(Clone)]
pub struct SetupContext {
    state: Arc<Mutex<SetupState>>,
    draft: Arc<Mutex<WizardDraft>>,
    dispatch_lock: Arc<Mutex<()>>,
}

impl SetupContext {
    pub fn new(initial_state: SetupState) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial_state)),
            draft: Arc::new(Mutex::new(WizardDraft::default())),
            dispatch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn get_state(&self) -> SetupState {
        self.state.lock().await.clone()
    }

    /// Should only be called while holding `dispatch_lock`.
    pub async fn set_state(&self, state: SetupState) {
        *self.state.lock().await = state;
    }

    pub async fn get_draft(&self) -> WizardDraft {
        self.draft.lock().await.clone()
    }

    /// Moves the draft out, leaving an empty one behind.
    pub async fn take_draft(&self) -> WizardDraft {
        std::mem::take(&mut *self.draft.lock().await)
    }

    /// Should only be called while holding `dispatch_lock`.
    pub async fn set_draft(&self, draft: WizardDraft) {
        *self.draft.lock().await = draft;
    }

    pub async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }
}

impl Default for SetupContext {
    fn default() -> Self {
        Self::new(SetupState::initial())
    }
}
