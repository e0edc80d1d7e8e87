//! Session flags and KYC status, persisted in the local key-value slot.

use async_trait::async_trait;
use sanafi_api_types::{KycStatus, Route, SessionFlags};
use sanafi_services::{CredentialVerifier, ServiceError, ViewScope, guarded};
use sanafi_storage::{KeyValueStore, load_json, save_json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const AUTH_STATE_KEY: &str = "auth_state";
pub const KYC_STATUS_KEY: &str = "kyc_status";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no user is signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("session storage failed: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Session operations the flows depend on. `SessionStore` is the only production implementation.
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn get(&self) -> SessionFlags;
    async fn kyc_status(&self) -> KycStatus;

    async fn route(&self) -> Route {
        self.get().await.route()
    }

    /// Returns `Ok(false)` when the credentials are refused; the flags are untouched in that case.
    async fn login(&self, scope: &ViewScope, email: &str, password: &str) -> SessionResult<bool>;
    async fn logout(&self) -> SessionResult<()>;
    async fn complete_onboarding(&self) -> SessionResult<()>;
    async fn complete_kyc(&self) -> SessionResult<()>;
    async fn record_kyc_status(&self, status: KycStatus) -> SessionResult<()>;

    /// Defers verification: the KYC gate opens but the status stays distinguishable from a real check.
    async fn skip_kyc(&self) -> SessionResult<()> {
        self.record_kyc_status(KycStatus::Skipped).await?;
        self.complete_kyc().await
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SessionState {
    flags: SessionFlags,
    kyc_status: KycStatus,
}

pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    credentials: Arc<dyn CredentialVerifier>,
    call_timeout: Duration,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Restore the session from the slot. Missing or unreadable values start from defaults.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        credentials: Arc<dyn CredentialVerifier>,
        call_timeout: Duration,
    ) -> SessionResult<Self> {
        let flags: SessionFlags = load_json(store.as_ref(), AUTH_STATE_KEY)
            .await?
            .unwrap_or_default();
        let kyc_status: KycStatus = load_json(store.as_ref(), KYC_STATUS_KEY)
            .await?
            .unwrap_or_default();

        info!(route = ?flags.route(), ?kyc_status, "session restored");

        Ok(Self {
            store,
            credentials,
            call_timeout,
            state: Mutex::new(SessionState { flags, kyc_status }),
        })
    }

    async fn persist_flags(&self, flags: &SessionFlags) -> SessionResult<()> {
        save_json(self.store.as_ref(), AUTH_STATE_KEY, flags).await?;
        Ok(())
    }

    async fn update_flags<F>(&self, apply: F) -> SessionResult<()>
    where
        F: FnOnce(&mut SessionFlags) + Send,
    {
        let mut state = self.state.lock().await;
        if !state.flags.is_authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        let mut next = state.flags;
        apply(&mut next);
        self.persist_flags(&next).await?;
        state.flags = next;
        Ok(())
    }
}

#[async_trait]
impl SessionService for SessionStore {
    async fn get(&self) -> SessionFlags {
        self.state.lock().await.flags
    }

    async fn kyc_status(&self) -> KycStatus {
        self.state.lock().await.kyc_status
    }

    async fn login(&self, scope: &ViewScope, email: &str, password: &str) -> SessionResult<bool> {
        let accepted = guarded(
            scope,
            self.call_timeout,
            self.credentials.verify(email, password),
        )
        .await?;

        if !accepted {
            debug!("credentials refused");
            return Ok(false);
        }

        let mut state = self.state.lock().await;
        let mut next = state.flags;
        next.is_authenticated = true;
        self.persist_flags(&next).await?;
        state.flags = next;
        info!("signed in");
        Ok(true)
    }

    async fn logout(&self) -> SessionResult<()> {
        let mut state = self.state.lock().await;
        self.store.remove(AUTH_STATE_KEY).await?;
        self.store.remove(KYC_STATUS_KEY).await?;
        *state = SessionState::default();
        info!("signed out");
        Ok(())
    }

    async fn complete_onboarding(&self) -> SessionResult<()> {
        self.update_flags(|flags| flags.has_completed_onboarding = true)
            .await?;
        info!("onboarding completed");
        Ok(())
    }

    async fn complete_kyc(&self) -> SessionResult<()> {
        self.update_flags(|flags| flags.has_completed_kyc = true).await?;
        info!("kyc gate completed");
        Ok(())
    }

    async fn record_kyc_status(&self, status: KycStatus) -> SessionResult<()> {
        let mut state = self.state.lock().await;
        if !state.flags.is_authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        save_json(self.store.as_ref(), KYC_STATUS_KEY, &status).await?;
        state.kyc_status = status;
        info!(?status, "kyc status recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanafi_services::Latency;
    use sanafi_services::simulated::SimulatedCredentials;
    use sanafi_storage::InMemoryStore;

    async fn open_with(store: Arc<InMemoryStore>, latency: Latency) -> SessionResult<SessionStore> {
        SessionStore::open(
            store,
            Arc::new(SimulatedCredentials::new(latency)),
            Duration::from_secs(10),
        )
        .await
    }

    async fn persisted(store: &InMemoryStore) -> SessionFlags {
        load_json::<SessionFlags>(store, AUTH_STATE_KEY)
            .await
            .unwrap()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn first_run_starts_signed_out() -> anyhow::Result<()> {
        let session = open_with(Arc::new(InMemoryStore::default()), Latency::none()).await?;
        assert_eq!(session.get().await, SessionFlags::default());
        assert_eq!(session.kyc_status().await, KycStatus::Unverified);
        assert_eq!(session.route().await, Route::Auth);
        Ok(())
    }

    #[tokio::test]
    async fn login_accepts_six_character_passwords() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::default());
        let session = open_with(store.clone(), Latency::none()).await?;
        let scope = ViewScope::new();

        assert!(!session.login(&scope, "a@b.com", "abc").await?);
        assert!(!session.get().await.is_authenticated);

        assert!(session.login(&scope, "a@b.com", "abcdef").await?);
        assert!(session.get().await.is_authenticated);
        assert!(persisted(&store).await.is_authenticated);
        Ok(())
    }

    #[tokio::test]
    async fn completion_flags_are_written_through() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::default());
        let session = open_with(store.clone(), Latency::none()).await?;
        session.login(&ViewScope::new(), "a@b.com", "abcdef").await?;

        session.complete_onboarding().await?;
        assert!(persisted(&store).await.has_completed_onboarding);
        assert_eq!(session.route().await, Route::Kyc);

        session.complete_kyc().await?;
        assert_eq!(session.route().await, Route::Home);
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_flags_status_and_storage() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::default());
        let session = open_with(store.clone(), Latency::none()).await?;
        session.login(&ViewScope::new(), "a@b.com", "abcdef").await?;
        session.complete_onboarding().await?;
        session.skip_kyc().await?;

        session.logout().await?;

        assert_eq!(persisted(&store).await, SessionFlags::default());
        assert_eq!(store.get(AUTH_STATE_KEY).await?, None);
        assert_eq!(store.get(KYC_STATUS_KEY).await?, None);
        assert_eq!(session.get().await, SessionFlags::default());
        assert_eq!(session.kyc_status().await, KycStatus::Unverified);
        Ok(())
    }

    #[tokio::test]
    async fn completing_steps_requires_a_signed_in_user() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::default());
        let session = open_with(store.clone(), Latency::none()).await?;

        let err = session.complete_onboarding().await.unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
        assert!(matches!(
            session.record_kyc_status(KycStatus::Pending).await,
            Err(SessionError::NotAuthenticated)
        ));
        assert_eq!(store.get(AUTH_STATE_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn skipped_kyc_opens_the_gate_but_stays_skipped() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::default());
        let session = open_with(store.clone(), Latency::none()).await?;
        session.login(&ViewScope::new(), "a@b.com", "abcdef").await?;
        session.complete_onboarding().await?;

        session.skip_kyc().await?;

        assert!(session.get().await.has_completed_kyc);
        assert_eq!(session.kyc_status().await, KycStatus::Skipped);

        let reopened = open_with(store, Latency::none()).await?;
        assert_eq!(reopened.kyc_status().await, KycStatus::Skipped);
        assert_eq!(reopened.route().await, Route::Home);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_blob_restores_defaults() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::with_entry(AUTH_STATE_KEY, "{not json"));
        let session = open_with(store, Latency::none()).await?;
        assert_eq!(session.get().await, SessionFlags::default());
        Ok(())
    }

    #[tokio::test]
    async fn partial_blob_defaults_missing_fields() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::with_entry(
            AUTH_STATE_KEY,
            r#"{"isAuthenticated":true}"#,
        ));
        let session = open_with(store, Latency::none()).await?;
        assert_eq!(session.route().await, Route::Onboarding);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dismissed_login_leaves_the_session_alone() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::default());
        let session = Arc::new(
            open_with(store.clone(), Latency::fixed(Duration::from_millis(1000))).await?,
        );
        let scope = ViewScope::new();

        let pending = {
            let session = session.clone();
            let scope = scope.clone();
            tokio::spawn(async move { session.login(&scope, "a@b.com", "abcdef").await })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        scope.dismiss();

        let result = pending.await?;
        assert!(matches!(
            result,
            Err(SessionError::Service(ServiceError::Cancelled))
        ));
        assert!(!session.get().await.is_authenticated);
        assert_eq!(store.get(AUTH_STATE_KEY).await?, None);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn slow_credentials_time_out() -> anyhow::Result<()> {
        let session = SessionStore::open(
            Arc::new(InMemoryStore::default()),
            Arc::new(SimulatedCredentials::new(Latency::fixed(Duration::from_secs(30)))),
            Duration::from_secs(2),
        )
        .await?;

        let result = session.login(&ViewScope::new(), "a@b.com", "abcdef").await;
        assert!(matches!(
            result,
            Err(SessionError::Service(ServiceError::Timeout(_)))
        ));
        Ok(())
    }
}
