//! Collaborator interfaces consumed by the wallet flows.
//!
//! Each external concern (credentials, funds movement, identity documents,
//! QR decoding, transaction confirmation, assistant replies) sits behind an
//! async trait so a real backend can replace the simulated one in
//! [`simulated`]. Calls made on behalf of a view go through
//! [`scope::guarded`] for timeout and cancellation.

pub mod assistant;
pub mod latency;
pub mod scope;
pub mod simulated;

use async_trait::async_trait;
use sanafi_api_types::{
    AddFundsRequest, CashOutRequest, IdentitySubmission, Receipt, TransferRequest, VerificationStatus,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use latency::{Latency, SimulatedLatencies};
pub use scope::{ViewScope, guarded};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request cancelled because the view was dismissed")]
    Cancelled,
    #[error("{0}")]
    Rejected(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> ServiceResult<bool>;
}

#[async_trait]
pub trait FundsMovement: Send + Sync {
    async fn submit_transfer(&self, req: TransferRequest) -> ServiceResult<Receipt>;
    async fn submit_cash_out(&self, req: CashOutRequest) -> ServiceResult<Receipt>;
    async fn submit_add_funds(&self, req: AddFundsRequest) -> ServiceResult<Receipt>;
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn submit_documents(&self, submission: IdentitySubmission) -> ServiceResult<VerificationStatus>;
}

#[async_trait]
pub trait AddressDecoder: Send + Sync {
    async fn decode(&self, scanned: &str) -> ServiceResult<String>;
}

/// Confirms an outgoing transfer with the device owner (biometric prompt on a phone).
#[async_trait]
pub trait TransferAuthorizer: Send + Sync {
    async fn authorize(&self, summary: &str) -> ServiceResult<bool>;
}

#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn reply(&self, prompt: &str) -> ServiceResult<String>;
}

/// The full set of collaborators, shared by every flow.
#[derive(Clone)]
pub struct Services {
    pub credentials: Arc<dyn CredentialVerifier>,
    pub funds: Arc<dyn FundsMovement>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub addresses: Arc<dyn AddressDecoder>,
    pub authorizer: Arc<dyn TransferAuthorizer>,
    pub assistant: Arc<dyn ChatResponder>,
    pub call_timeout: Duration,
}

impl Services {
    pub fn simulated(latencies: &SimulatedLatencies) -> Self {
        Self {
            credentials: Arc::new(simulated::SimulatedCredentials::new(latencies.login)),
            funds: Arc::new(simulated::SimulatedFunds::new(latencies.funds)),
            identity: Arc::new(simulated::SimulatedIdentity::new(latencies.kyc)),
            addresses: Arc::new(simulated::PassthroughAddresses),
            authorizer: Arc::new(simulated::SimulatedAuthorizer::new(latencies.biometric)),
            assistant: Arc::new(simulated::CannedAssistant::new(latencies.chat)),
            call_timeout: latencies.call_timeout,
        }
    }

    /// Simulated collaborators with no artificial delay.
    pub fn instant() -> Self {
        Self::simulated(&SimulatedLatencies::none())
    }
}
