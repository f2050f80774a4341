//! Auth-state capability consumed from the external identity provider.
//!
//! The identity provider itself is out of scope; this crate only consumes a
//! subscribable "current auth state" capability, injected as a trait so the
//! lifecycle coupling stays testable and provider-agnostic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Current authentication state as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// Whether the provider has finished resolving its session.
    pub loaded: bool,
    pub signed_in: bool,
    pub user_id: Option<String>,
}

impl AuthState {
    /// Provider still resolving its session.
    pub fn loading() -> Self {
        Self {
            loaded: false,
            signed_in: false,
            user_id: None,
        }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            loaded: true,
            signed_in: true,
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            loaded: true,
            signed_in: false,
            user_id: None,
        }
    }
}

/// Listener invoked on every auth-state change.
pub type AuthListener = Arc<dyn Fn(AuthState) + Send + Sync>;

/// The only thing this crate knows about the identity provider.
pub trait AuthStateSource: Send + Sync {
    /// Register a listener; the returned guard unsubscribes on drop.
    fn subscribe(&self, listener: AuthListener) -> AuthSubscription;
}

/// Unsubscribe guard for an auth-state listener.
pub struct AuthSubscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl AuthSubscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// In-memory auth source for tests and hosts that push states manually.
#[derive(Default)]
pub struct ManualAuthSource {
    listeners: Arc<Mutex<Vec<(u64, AuthListener)>>>,
    next_id: AtomicU64,
}

impl ManualAuthSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new auth state to every live listener.
    pub fn emit(&self, state: AuthState) {
        let listeners: Vec<AuthListener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(state.clone());
        }
    }
}

impl AuthStateSource for ManualAuthSource {
    fn subscribe(&self, listener: AuthListener) -> AuthSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, listener));
        }

        let listeners = Arc::clone(&self.listeners);
        AuthSubscription::new(move || {
            if let Ok(mut listeners) = listeners.lock() {
                listeners.retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_receive_emitted_states() {
        let source = ManualAuthSource::new();
        let seen: Arc<Mutex<Vec<AuthState>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _subscription = source.subscribe(Arc::new(move |state| {
            sink.lock().unwrap().push(state);
        }));

        source.emit(AuthState::loading());
        source.emit(AuthState::signed_in("user-1"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(!seen[0].loaded);
        assert!(seen[1].signed_in);
    }

    #[test]
    fn dropping_the_subscription_unsubscribes() {
        let source = ManualAuthSource::new();
        let seen: Arc<Mutex<Vec<AuthState>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let subscription = source.subscribe(Arc::new(move |state| {
            sink.lock().unwrap().push(state);
        }));
        drop(subscription);

        source.emit(AuthState::signed_out());
        assert!(seen.lock().unwrap().is_empty());
    }
}
