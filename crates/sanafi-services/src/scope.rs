use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::{ServiceError, ServiceResult};

/// Lifetime of the view that started a call. Dismissing it cancels every call guarded by it.
#[derive(Debug, Clone)]
pub struct ViewScope {
    dismissed: Arc<watch::Sender<bool>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            dismissed: Arc::new(tx),
        }
    }

    pub fn dismiss(&self) {
        self.dismissed.send_replace(true);
    }

    pub fn is_dismissed(&self) -> bool {
        *self.dismissed.borrow()
    }

    pub async fn wait_dismissed(&self) {
        let mut rx = self.dismissed.subscribe();
        // The sender lives as long as `self`, so this only returns once dismissed.
        let _ = rx.wait_for(|dismissed| *dismissed).await;
    }
}

/// Run a collaborator call with a timeout, abandoning it if the scope is dismissed.
///
/// A successful result is only returned while the scope is still live, so a
/// caller that applies the result afterwards never acts on a dismissed view.
pub async fn guarded<F, T>(scope: &ViewScope, timeout: Duration, call: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    if scope.is_dismissed() {
        return Err(ServiceError::Cancelled);
    }

    let outcome = tokio::select! {
        biased;
        _ = scope.wait_dismissed() => Err(ServiceError::Cancelled),
        result = tokio::time::timeout(timeout, call) => match result {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(timeout)),
        },
    };

    if outcome.is_ok() && scope.is_dismissed() {
        debug!("discarding result for a dismissed view");
        return Err(ServiceError::Cancelled);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn passes_through_results() {
        let scope = ViewScope::new();
        let value = guarded(&scope, Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_slow_calls() {
        let scope = ViewScope::new();
        let result: ServiceResult<()> = guarded(&scope, Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(ServiceError::Timeout(Duration::from_secs(1))));
    }

    #[tokio::test(start_paused = true)]
    async fn dismissal_cancels_in_flight_calls() {
        let scope = ViewScope::new();
        let dismisser = scope.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            dismisser.dismiss();
        });

        let result: ServiceResult<()> = guarded(&scope, Duration::from_secs(10), async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(ServiceError::Cancelled));
    }

    #[tokio::test]
    async fn dismissed_scope_refuses_new_calls() {
        let scope = ViewScope::new();
        scope.dismiss();
        assert!(scope.is_dismissed());
        let result = guarded(&scope, Duration::from_secs(1), async { Ok(1) }).await;
        assert_eq!(result, Err(ServiceError::Cancelled));
    }
}
