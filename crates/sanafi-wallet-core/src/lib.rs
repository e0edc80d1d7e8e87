//! Wallet flows: the wizard-backed screens and modals, the demo catalog, and
//! the [`WalletCore`] facade that wires them to the session and collaborators.

pub mod add_funds;
pub mod auth;
pub mod cash_out;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod flow;
pub mod kyc;
pub mod onboarding;
pub mod transfer;

use sanafi_api_types::{KycStatus, Route, SessionFlags};
use sanafi_services::Services;
use sanafi_session::{SessionService, SessionStore};
use sanafi_storage::KeyValueStore;
use std::sync::Arc;

pub use add_funds::AddFundsFlow;
pub use auth::{AuthFlow, AuthMode};
pub use cash_out::CashOutFlow;
pub use catalog::{PriceRow, Token, Transaction, TxFilter};
pub use chat::ChatSession;
pub use config::AppConfig;
pub use error::{FlowError, FlowResult};
pub use flow::{Form, Progress};
pub use kyc::{KycFlow, KycOutcome};
pub use onboarding::OnboardingFlow;
pub use transfer::{TransferFlow, TransferTab};

pub use sanafi_wizard::FieldError;

/// Entry point for a front-end: owns the session and hands out flows.
pub struct WalletCore {
    session: Arc<dyn SessionService>,
    services: Services,
    tokens: Vec<Token>,
    transactions: Vec<Transaction>,
    prices: Vec<PriceRow>,
}

impl WalletCore {
    pub fn new(session: Arc<dyn SessionService>, services: Services) -> Self {
        Self {
            session,
            services,
            tokens: catalog::tokens(),
            transactions: catalog::transactions(),
            prices: catalog::prices(),
        }
    }

    /// Restore the session from `store` with simulated collaborators tuned by `config`.
    pub async fn open(config: &AppConfig, store: Arc<dyn KeyValueStore>) -> FlowResult<Self> {
        let services = Services::simulated(&config.latencies);
        let session = SessionStore::open(store, services.credentials.clone(), services.call_timeout).await?;
        Ok(Self::new(Arc::new(session), services))
    }

    pub fn session(&self) -> &Arc<dyn SessionService> {
        &self.session
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub async fn flags(&self) -> SessionFlags {
        self.session.get().await
    }

    pub async fn kyc_status(&self) -> KycStatus {
        self.session.kyc_status().await
    }

    /// Screen to show at startup or after a session change.
    pub async fn route(&self) -> Route {
        self.session.route().await
    }

    pub fn portfolio_value(&self) -> f64 {
        catalog::portfolio_value(&self.tokens)
    }

    pub fn activity(&self, filter: TxFilter) -> Vec<&Transaction> {
        catalog::filter_transactions(&self.transactions, filter)
    }

    pub fn recent_activity(&self) -> &[Transaction] {
        catalog::recent_transactions(&self.transactions, catalog::RECENT_COUNT)
    }

    /// A token's detail view: the holding and its own transactions.
    pub fn token_detail(&self, symbol: &str) -> Option<(&Token, Vec<&Transaction>)> {
        let token = catalog::find_token(&self.tokens, symbol)?;
        Some((token, catalog::transactions_for(&self.transactions, symbol)))
    }

    pub fn prices(&self) -> &[PriceRow] {
        &self.prices
    }

    /// Advance the simulated market by one tick (see [`catalog::PRICE_TICK`]).
    pub fn tick_prices(&mut self) -> &[PriceRow] {
        catalog::tick_prices(&mut self.prices, &mut rand::thread_rng());
        &self.prices
    }

    pub fn auth(&self, mode: AuthMode) -> FlowResult<AuthFlow> {
        AuthFlow::new(self.session.clone(), mode)
    }

    pub fn onboarding(&self) -> FlowResult<OnboardingFlow> {
        OnboardingFlow::new(self.session.clone())
    }

    pub fn kyc(&self) -> FlowResult<KycFlow> {
        KycFlow::new(self.session.clone(), self.services.clone())
    }

    pub fn add_funds(&self) -> FlowResult<AddFundsFlow> {
        AddFundsFlow::new(self.services.clone(), self.tokens.clone())
    }

    pub fn cash_out(&self) -> FlowResult<CashOutFlow> {
        CashOutFlow::new(self.services.clone(), self.tokens.clone())
    }

    pub fn transfer(&self, tab: TransferTab) -> FlowResult<TransferFlow> {
        TransferFlow::new(self.services.clone(), self.tokens.clone(), tab)
    }

    pub fn chat(&self) -> ChatSession {
        ChatSession::new(self.services.clone())
    }

    pub async fn logout(&self) -> FlowResult<()> {
        self.session.logout().await?;
        Ok(())
    }
}
