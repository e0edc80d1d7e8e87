use sanafi_api_types::{Receipt, TokenSymbol, TransferRequest};
use sanafi_services::{Services, ViewScope, guarded};
use sanafi_validate::FieldKind;
use sanafi_wizard::{FieldSpec, Rejection, StepDefinition, Wizard};
use tracing::info;

use crate::catalog::{Contact, Token, find_token};
use crate::error::{FlowError, FlowResult};
use crate::flow::{Form, Progress, Stage, field, parse_amount, stage};

/// Address this wallet receives on, whatever the token.
pub const RECEIVE_ADDRESS: &str = "8K7Qt...9mPx2";
pub const QUICK_AMOUNTS: [u32; 4] = [25, 50, 100, 250];

pub const MISSING_FIELDS: &str = "Please enter amount and recipient";
pub const NOT_AUTHORIZED: &str = "Authentication failed";
pub const SUBMIT_FAILURE: &str = "Something went wrong";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTab {
    Send,
    Receive,
}

impl TransferTab {
    fn index(self) -> usize {
        match self {
            Self::Send => 0,
            Self::Receive => 1,
        }
    }

    fn from_index(index: usize) -> Self {
        if index == 0 { Self::Send } else { Self::Receive }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveAddress {
    pub token: TokenSymbol,
    pub address: String,
}

/// Text shown once a transfer has been accepted.
pub fn success_message(receipt: &Receipt) -> String {
    format!(
        "Successfully sent {} {} to {}",
        receipt.amount, receipt.token, receipt.counterparty
    )
}

/// Send/receive modal. Both tabs are reachable at any time.
pub struct TransferFlow {
    wizard: Wizard,
    tokens: Vec<Token>,
    services: Services,
    initial_tab: TransferTab,
}

impl TransferFlow {
    pub fn new(services: Services, tokens: Vec<Token>, initial_tab: TransferTab) -> FlowResult<Self> {
        let first = tokens
            .first()
            .ok_or_else(|| FlowError::failed("No tokens available"))?;
        let symbols = tokens.iter().map(|t| t.symbol.to_string()).collect();

        let wizard = Wizard::tabs(vec![
            StepDefinition::new("Send")
                .field(
                    FieldSpec::new("token", "Token", FieldKind::Choice(symbols))
                        .required()
                        .with_default(first.symbol.as_str()),
                )
                .field(FieldSpec::text("amount", "Amount"))
                .field(FieldSpec::text("recipient", "Recipient"))
                .guard(|values| {
                    if field(values, "amount").is_empty() || field(values, "recipient").is_empty() {
                        return Err(Rejection::new(MISSING_FIELDS));
                    }
                    Ok(())
                }),
            StepDefinition::new("Receive"),
        ])?;

        let mut flow = Self {
            wizard,
            tokens,
            services,
            initial_tab,
        };
        flow.close();
        Ok(flow)
    }

    pub fn tab(&self) -> TransferTab {
        TransferTab::from_index(self.wizard.current_index())
    }

    pub fn open_tab(&mut self, tab: TransferTab) -> FlowResult<()> {
        self.wizard.jump_to(tab.index())?;
        Ok(())
    }

    pub fn select_token(&mut self, symbol: &str) -> FlowResult<()> {
        self.wizard.set_value("token", symbol)?;
        Ok(())
    }

    pub fn selected_token(&self) -> Option<&Token> {
        self.wizard
            .value("token")
            .and_then(|symbol| find_token(&self.tokens, symbol))
    }

    pub fn set_amount(&mut self, amount: &str) -> FlowResult<()> {
        self.wizard.set_value("amount", amount)?;
        Ok(())
    }

    pub fn quick_amount(&mut self, amount: u32) -> FlowResult<()> {
        self.set_amount(&amount.to_string())
    }

    pub fn set_recipient(&mut self, recipient: &str) -> FlowResult<()> {
        self.wizard.set_value("recipient", recipient)?;
        Ok(())
    }

    pub fn choose_contact(&mut self, contact: &Contact) -> FlowResult<()> {
        self.set_recipient(&contact.address)
    }

    /// Decode scanned QR text into the recipient field.
    pub async fn scan(&mut self, scope: &ViewScope, scanned: &str) -> FlowResult<String> {
        let address = guarded(
            scope,
            self.services.call_timeout,
            self.services.addresses.decode(scanned),
        )
        .await
        .map_err(|err| FlowError::from_service(err, SUBMIT_FAILURE))?;
        self.set_recipient(&address)?;
        Ok(address)
    }

    pub fn receive_address(&self) -> ReceiveAddress {
        let token = self
            .selected_token()
            .map(|token| token.symbol.clone())
            .unwrap_or_else(|| TokenSymbol::new(""));
        ReceiveAddress {
            token,
            address: RECEIVE_ADDRESS.to_owned(),
        }
    }

    /// Validate the send tab, confirm with the device owner, then move the funds.
    pub async fn send(&mut self, scope: &ViewScope) -> FlowResult<Progress<Receipt>> {
        if self.tab() != TransferTab::Send {
            return Err(FlowError::rejected("Switch to the Send tab to send funds"));
        }
        let values = match stage(self.wizard.go_next())? {
            Stage::Interim(progress) => return Ok(progress),
            Stage::Submit(values) => values,
        };

        let amount = parse_amount(field(&values, "amount"))
            .ok_or_else(|| FlowError::rejected("Please enter a valid amount"))?;
        let token = TokenSymbol::new(field(&values, "token"));
        let destination = field(&values, "recipient").to_owned();

        let summary = format!("Send {amount} {token} to {destination}");
        let authorized = guarded(
            scope,
            self.services.call_timeout,
            self.services.authorizer.authorize(&summary),
        )
        .await
        .map_err(|err| FlowError::from_service(err, NOT_AUTHORIZED))?;
        if !authorized {
            return Err(FlowError::failed(NOT_AUTHORIZED));
        }

        let request = TransferRequest {
            amount,
            token,
            destination,
        };
        let receipt = guarded(
            scope,
            self.services.call_timeout,
            self.services.funds.submit_transfer(request),
        )
        .await
        .map_err(|err| FlowError::from_service(err, SUBMIT_FAILURE))?;

        info!(reference = %receipt.reference, amount, "transfer sent");
        self.close();
        Ok(Progress::Finished(receipt))
    }

    /// Dismiss the modal: clear the form and return to the tab it opened on.
    pub fn close(&mut self) {
        self.wizard.reset();
        // Both tab indices exist by construction.
        let _ = self.wizard.jump_to(self.initial_tab.index());
    }
}

impl Form for TransferFlow {
    fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use async_trait::async_trait;
    use sanafi_services::{ServiceResult, TransferAuthorizer};
    use std::sync::Arc;

    struct Refuse;

    #[async_trait]
    impl TransferAuthorizer for Refuse {
        async fn authorize(&self, _summary: &str) -> ServiceResult<bool> {
            Ok(false)
        }
    }

    fn flow() -> TransferFlow {
        TransferFlow::new(Services::instant(), catalog::tokens(), TransferTab::Send).unwrap()
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() -> anyhow::Result<()> {
        let mut flow = flow();
        let scope = ViewScope::new();
        flow.quick_amount(50)?;

        let err = flow.send(&scope).await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_FIELDS);
        assert_eq!(flow.tab(), TransferTab::Send);
        Ok(())
    }

    #[tokio::test]
    async fn cleared_token_blocks_the_send() -> anyhow::Result<()> {
        let mut flow = flow();
        flow.select_token("")?;
        flow.set_amount("25")?;
        flow.set_recipient("8K7Qt...9mPx2")?;

        let Progress::Blocked(failing) = flow.send(&ViewScope::new()).await? else {
            panic!("a blank token must not reach the funds service");
        };
        assert_eq!(failing[0].field, "token");
        assert_eq!(failing[0].result.message, "Token is required");
        assert_eq!(flow.wizard().value("amount"), Some("25"));
        Ok(())
    }

    #[tokio::test]
    async fn tabs_switch_freely() -> anyhow::Result<()> {
        let mut flow = flow();
        flow.set_amount("12")?;
        flow.open_tab(TransferTab::Receive)?;
        assert_eq!(flow.tab(), TransferTab::Receive);
        assert!(flow.send(&ViewScope::new()).await.is_err());

        flow.select_token("USDC")?;
        assert_eq!(
            flow.receive_address(),
            ReceiveAddress {
                token: TokenSymbol::new("USDC"),
                address: RECEIVE_ADDRESS.to_owned(),
            }
        );

        flow.open_tab(TransferTab::Send)?;
        assert_eq!(flow.wizard().value("amount"), Some("12"));
        Ok(())
    }

    #[tokio::test]
    async fn scanned_code_fills_the_recipient() -> anyhow::Result<()> {
        let mut flow = flow();
        let scope = ViewScope::new();
        let address = flow.scan(&scope, " 5Np9w...4kR7j ").await?;
        assert_eq!(address, "5Np9w...4kR7j");
        assert_eq!(flow.wizard().value("recipient"), Some("5Np9w...4kR7j"));

        let err = flow.scan(&scope, "").await.unwrap_err();
        assert!(matches!(err, FlowError::Rejected(_)));
        Ok(())
    }

    #[tokio::test]
    async fn send_confirms_then_resets_to_the_opening_tab() -> anyhow::Result<()> {
        let mut flow =
            TransferFlow::new(Services::instant(), catalog::tokens(), TransferTab::Receive)?;
        assert_eq!(flow.tab(), TransferTab::Receive);
        flow.open_tab(TransferTab::Send)?;
        flow.set_amount("25")?;
        flow.choose_contact(&catalog::contacts()[1])?;

        let Progress::Finished(receipt) = flow.send(&ViewScope::new()).await? else {
            panic!("send should finish");
        };
        assert_eq!(success_message(&receipt), "Successfully sent 25 AEDS to 5Np9w...4kR7j");
        assert_eq!(flow.tab(), TransferTab::Receive);
        assert!(flow.wizard().values().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn refused_confirmation_keeps_the_form() -> anyhow::Result<()> {
        let mut services = Services::instant();
        services.authorizer = Arc::new(Refuse);
        let mut flow = TransferFlow::new(services, catalog::tokens(), TransferTab::Send)?;
        flow.set_amount("25")?;
        flow.set_recipient("8K7Qt...9mPx2")?;

        let err = flow.send(&ViewScope::new()).await.unwrap_err();
        assert_eq!(err.user_message().as_deref(), Some(NOT_AUTHORIZED));
        assert_eq!(flow.wizard().value("amount"), Some("25"));
        Ok(())
    }
}
