use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three session flags, persisted as one JSON object under a single key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionFlags {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub has_completed_onboarding: bool,
    #[serde(default, rename = "hasCompletedKYC")]
    pub has_completed_kyc: bool,
}

impl SessionFlags {
    pub fn route(&self) -> Route {
        if !self.is_authenticated {
            Route::Auth
        } else if !self.has_completed_onboarding {
            Route::Onboarding
        } else if !self.has_completed_kyc {
            Route::Kyc
        } else {
            Route::Home
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
    Skipped,
}

/// Where the app lands after the startup gate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Auth,
    Onboarding,
    Kyc,
    Home,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TokenSymbol(pub String);

impl TokenSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub amount: f64,
    pub token: TokenSymbol,
    pub destination: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashOutRequest {
    pub amount: f64,
    pub token: TokenSymbol,
    pub bank_account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFundsRequest {
    pub amount: f64,
    pub token: TokenSymbol,
    pub payment_method: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptKind {
    Transfer,
    CashOut,
    AddFunds,
}

/// Acknowledgement returned by the funds-movement service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: Uuid,
    pub reference: String,
    pub kind: ReceiptKind,
    pub amount: f64,
    pub token: TokenSymbol,
    pub counterparty: String,
    pub accepted_at_epoch_ms: u128,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    EmiratesId,
    Passport,
    Selfie,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRef(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySubmission {
    pub emirates_id: DocumentRef,
    pub passport: Option<DocumentRef>,
    pub selfie: DocumentRef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Pending,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_flags_use_the_persisted_field_names() {
        let flags = SessionFlags {
            is_authenticated: true,
            has_completed_onboarding: false,
            has_completed_kyc: true,
        };
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isAuthenticated": true,
                "hasCompletedOnboarding": false,
                "hasCompletedKYC": true,
            })
        );
    }

    #[test]
    fn missing_flags_default_to_false() {
        let flags: SessionFlags = serde_json::from_str(r#"{"isAuthenticated":true}"#).unwrap();
        assert!(flags.is_authenticated);
        assert!(!flags.has_completed_onboarding);
        assert!(!flags.has_completed_kyc);
    }

    #[test]
    fn route_follows_the_startup_gate_order() {
        let mut flags = SessionFlags::default();
        assert_eq!(flags.route(), Route::Auth);
        flags.is_authenticated = true;
        assert_eq!(flags.route(), Route::Onboarding);
        flags.has_completed_onboarding = true;
        assert_eq!(flags.route(), Route::Kyc);
        flags.has_completed_kyc = true;
        assert_eq!(flags.route(), Route::Home);
    }
}
