//! Stand-in collaborators: a delay, a trivial check, and an echo of the input.

use async_trait::async_trait;
use sanafi_api_types::{
    AddFundsRequest, CashOutRequest, IdentitySubmission, Receipt, ReceiptKind, TokenSymbol,
    TransferRequest, VerificationStatus,
};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

use crate::assistant::canned_reply;
use crate::latency::Latency;
use crate::{
    AddressDecoder, ChatResponder, CredentialVerifier, FundsMovement, IdentityVerifier,
    ServiceError, ServiceResult, TransferAuthorizer,
};

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Accepts any non-empty email with a password of at least six characters.
pub struct SimulatedCredentials {
    latency: Latency,
}

impl SimulatedCredentials {
    pub fn new(latency: Latency) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl CredentialVerifier for SimulatedCredentials {
    async fn verify(&self, email: &str, password: &str) -> ServiceResult<bool> {
        self.latency.wait().await;
        Ok(!email.trim().is_empty() && password.chars().count() >= MIN_PASSWORD_CHARS)
    }
}

/// Echoes every request back as an accepted receipt. No balance is moved.
pub struct SimulatedFunds {
    latency: Latency,
}

impl SimulatedFunds {
    pub fn new(latency: Latency) -> Self {
        Self { latency }
    }

    async fn accept(
        &self,
        kind: ReceiptKind,
        amount: f64,
        token: TokenSymbol,
        counterparty: String,
    ) -> ServiceResult<Receipt> {
        self.latency.wait().await;

        if !amount.is_finite() || amount <= 0.0 {
            return Err(ServiceError::Rejected("Please enter a valid amount".to_owned()));
        }
        if counterparty.trim().is_empty() {
            return Err(ServiceError::Rejected("A destination is required".to_owned()));
        }

        let receipt_id = Uuid::new_v4();
        let reference = {
            let payload = format!("{kind:?}:{amount}:{token}:{counterparty}:{receipt_id}");
            let digest = Sha256::digest(payload.as_bytes());
            format!("rcpt_{}", hex_lower(&digest[..12]))
        };

        info!(?kind, amount, token = %token, "simulated funds request accepted");

        Ok(Receipt {
            receipt_id,
            reference,
            kind,
            amount,
            token,
            counterparty,
            accepted_at_epoch_ms: epoch_ms(),
        })
    }
}

#[async_trait]
impl FundsMovement for SimulatedFunds {
    async fn submit_transfer(&self, req: TransferRequest) -> ServiceResult<Receipt> {
        self.accept(ReceiptKind::Transfer, req.amount, req.token, req.destination)
            .await
    }

    async fn submit_cash_out(&self, req: CashOutRequest) -> ServiceResult<Receipt> {
        self.accept(ReceiptKind::CashOut, req.amount, req.token, req.bank_account)
            .await
    }

    async fn submit_add_funds(&self, req: AddFundsRequest) -> ServiceResult<Receipt> {
        self.accept(ReceiptKind::AddFunds, req.amount, req.token, req.payment_method)
            .await
    }
}

/// Marks any complete document set as pending review.
pub struct SimulatedIdentity {
    latency: Latency,
}

impl SimulatedIdentity {
    pub fn new(latency: Latency) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl IdentityVerifier for SimulatedIdentity {
    async fn submit_documents(&self, submission: IdentitySubmission) -> ServiceResult<VerificationStatus> {
        self.latency.wait().await;
        if submission.emirates_id.0.trim().is_empty() || submission.selfie.0.trim().is_empty() {
            return Ok(VerificationStatus::Rejected);
        }
        Ok(VerificationStatus::Pending)
    }
}

/// Uses the scanned text as the destination address without checking its format.
pub struct PassthroughAddresses;

#[async_trait]
impl AddressDecoder for PassthroughAddresses {
    async fn decode(&self, scanned: &str) -> ServiceResult<String> {
        let address = scanned.trim();
        if address.is_empty() {
            return Err(ServiceError::Rejected("Scanned code is empty".to_owned()));
        }
        Ok(address.to_owned())
    }
}

pub struct SimulatedAuthorizer {
    latency: Latency,
}

impl SimulatedAuthorizer {
    pub fn new(latency: Latency) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl TransferAuthorizer for SimulatedAuthorizer {
    async fn authorize(&self, _summary: &str) -> ServiceResult<bool> {
        self.latency.wait().await;
        Ok(true)
    }
}

pub struct CannedAssistant {
    latency: Latency,
}

impl CannedAssistant {
    pub fn new(latency: Latency) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl ChatResponder for CannedAssistant {
    async fn reply(&self, prompt: &str) -> ServiceResult<String> {
        self.latency.wait().await;
        Ok(canned_reply(prompt).to_owned())
    }
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
