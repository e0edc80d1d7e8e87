use sanafi_api_types::{CashOutRequest, Receipt, TokenSymbol};
use sanafi_services::{Services, ViewScope, guarded};
use sanafi_validate::FieldKind;
use sanafi_wizard::{FieldSpec, FormValues, Rejection, StepDefinition, Wizard};
use tracing::info;

use crate::catalog::{BANK_ACCOUNTS, Token, default_bank_account, find_token};
use crate::error::{FlowError, FlowResult};
use crate::flow::{Form, Progress, Stage, field, parse_amount, stage};

/// Flat processing fee, in AED, taken from every withdrawal.
pub const CASH_OUT_FEE: f64 = 2.50;

pub const INVALID_AMOUNT: &str = "Please enter a valid amount";
pub const INSUFFICIENT_BALANCE: &str = "Insufficient balance";
pub const NO_ACCOUNT: &str = "Please select a bank account";
pub const SUBMIT_FAILURE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq)]
pub struct CashOutQuote {
    pub amount: f64,
    pub token: TokenSymbol,
    pub bank_account: String,
    pub fiat_estimate: f64,
    pub fee: f64,
    pub net_amount: f64,
}

fn check_amount(tokens: &[Token], values: &FormValues) -> Result<(), Rejection> {
    let amount = parse_amount(field(values, "amount")).ok_or_else(|| Rejection::new(INVALID_AMOUNT))?;
    let balance = find_token(tokens, field(values, "token"))
        .map(|token| token.balance)
        .unwrap_or(0.0);
    if amount > balance {
        return Err(Rejection::new(INSUFFICIENT_BALANCE));
    }
    Ok(())
}

/// Three-step modal: amount, bank account, confirmation.
pub struct CashOutFlow {
    wizard: Wizard,
    tokens: Vec<Token>,
    services: Services,
}

impl CashOutFlow {
    pub fn new(services: Services, tokens: Vec<Token>) -> FlowResult<Self> {
        let first = tokens
            .first()
            .ok_or_else(|| FlowError::failed("No tokens available"))?;
        let symbols = tokens.iter().map(|t| t.symbol.to_string()).collect();
        let accounts = BANK_ACCOUNTS.iter().map(|a| a.name.to_owned()).collect();
        let balances = tokens.clone();

        let wizard = Wizard::linear(vec![
            StepDefinition::new("Amount")
                .field(
                    FieldSpec::new("token", "Token", FieldKind::Choice(symbols))
                        .required()
                        .with_default(first.symbol.as_str()),
                )
                .field(FieldSpec::text("amount", "Amount"))
                .guard(move |values| check_amount(&balances, values)),
            StepDefinition::new("Bank Account")
                .field(
                    FieldSpec::new("bank_account", "Bank account", FieldKind::Choice(accounts))
                        .with_default(default_bank_account().name),
                )
                .guard(|values| {
                    if field(values, "bank_account").is_empty() {
                        return Err(Rejection::new(NO_ACCOUNT));
                    }
                    Ok(())
                }),
            StepDefinition::new("Confirm"),
        ])?;

        Ok(Self {
            wizard,
            tokens,
            services,
        })
    }

    pub fn select_token(&mut self, symbol: &str) -> FlowResult<()> {
        self.wizard.set_value("token", symbol)?;
        Ok(())
    }

    pub fn set_amount(&mut self, amount: &str) -> FlowResult<()> {
        self.wizard.set_value("amount", amount)?;
        Ok(())
    }

    pub fn select_account(&mut self, name: &str) -> FlowResult<()> {
        self.wizard.set_value("bank_account", name)?;
        Ok(())
    }

    pub fn selected_token(&self) -> Option<&Token> {
        self.wizard
            .value("token")
            .and_then(|symbol| find_token(&self.tokens, symbol))
    }

    pub fn quote(&self) -> Option<CashOutQuote> {
        let values = self.wizard.snapshot();
        let amount = parse_amount(field(&values, "amount"))?;
        let token = find_token(&self.tokens, field(&values, "token"))?;
        let fiat_estimate = amount * token.price;
        Some(CashOutQuote {
            amount,
            token: token.symbol.clone(),
            bank_account: field(&values, "bank_account").to_owned(),
            fiat_estimate,
            fee: CASH_OUT_FEE,
            net_amount: fiat_estimate - CASH_OUT_FEE,
        })
    }

    pub async fn next(&mut self, scope: &ViewScope) -> FlowResult<Progress<Receipt>> {
        let values = match stage(self.wizard.go_next())? {
            Stage::Interim(progress) => return Ok(progress),
            Stage::Submit(values) => values,
        };
        let amount = parse_amount(field(&values, "amount"))
            .ok_or_else(|| FlowError::rejected(INVALID_AMOUNT))?;
        let request = CashOutRequest {
            amount,
            token: TokenSymbol::new(field(&values, "token")),
            bank_account: field(&values, "bank_account").to_owned(),
        };

        let receipt = guarded(
            scope,
            self.services.call_timeout,
            self.services.funds.submit_cash_out(request),
        )
        .await
        .map_err(|err| FlowError::from_service(err, SUBMIT_FAILURE))?;

        info!(reference = %receipt.reference, amount, "cash out requested");
        self.close();
        Ok(Progress::Finished(receipt))
    }

    pub fn close(&mut self) {
        self.wizard.reset();
    }
}

impl Form for CashOutFlow {
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

    fn flow_with_balance(balance: f64) -> CashOutFlow {
        let tokens = vec![Token::new("USDC", "USD Coin", balance, 1.0, 0.0)];
        CashOutFlow::new(Services::instant(), tokens).unwrap()
    }

    #[tokio::test]
    async fn amounts_above_balance_are_refused() -> anyhow::Result<()> {
        let mut flow = flow_with_balance(100.0);
        let scope = ViewScope::new();

        flow.set_amount("150")?;
        let err = flow.next(&scope).await.unwrap_err();
        assert_eq!(err.to_string(), INSUFFICIENT_BALANCE);
        assert_eq!(flow.step_index(), 0);

        flow.set_amount("100")?;
        assert_eq!(flow.next(&scope).await?, Progress::Moved { from: 0, to: 1 });
        Ok(())
    }

    #[tokio::test]
    async fn balance_follows_the_selected_token() -> anyhow::Result<()> {
        let mut flow = CashOutFlow::new(Services::instant(), catalog::tokens())?;
        let scope = ViewScope::new();
        flow.select_token("SanaSOL")?;
        flow.set_amount("900")?;
        assert_eq!(flow.next(&scope).await.unwrap_err().to_string(), INSUFFICIENT_BALANCE);

        flow.select_token("AEDS")?;
        assert!(matches!(flow.next(&scope).await?, Progress::Moved { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_is_a_field_error() -> anyhow::Result<()> {
        let mut flow = flow_with_balance(100.0);
        flow.select_token("DOGE")?;
        flow.set_amount("10")?;
        let Progress::Blocked(failing) = flow.next(&ViewScope::new()).await? else {
            panic!("expected an inline error");
        };
        assert_eq!(failing[0].field, "token");
        assert_eq!(failing[0].result.message, "Please select a valid token");
        Ok(())
    }

    #[tokio::test]
    async fn cleared_token_is_not_a_balance_problem() -> anyhow::Result<()> {
        let mut flow = flow_with_balance(100.0);
        flow.select_token("")?;
        flow.set_amount("10")?;

        let Progress::Blocked(failing) = flow.next(&ViewScope::new()).await? else {
            panic!("a blank token should block before the balance check");
        };
        assert_eq!(failing[0].field, "token");
        assert_eq!(failing[0].result.message, "Token is required");
        assert_eq!(flow.step_index(), 0);
        Ok(())
    }

    #[test]
    fn quote_deducts_the_fee() {
        let mut flow = flow_with_balance(100.0);
        flow.set_amount("40").unwrap();
        let quote = flow.quote().unwrap();
        assert_eq!(quote.fiat_estimate, 40.0);
        assert_eq!(quote.net_amount, 37.5);
        assert_eq!(quote.bank_account, "Emirates NBD Current Account");
    }

    #[tokio::test]
    async fn confirm_submits_to_the_chosen_account() -> anyhow::Result<()> {
        let mut flow = flow_with_balance(100.0);
        let scope = ViewScope::new();
        flow.set_amount("60")?;
        flow.next(&scope).await?;
        flow.select_account("FAB Business Account")?;
        flow.next(&scope).await?;
        assert!(flow.previous());
        flow.next(&scope).await?;

        let Progress::Finished(receipt) = flow.next(&scope).await? else {
            panic!("confirm step should submit");
        };
        assert_eq!(receipt.counterparty, "FAB Business Account");
        assert_eq!(flow.step_index(), 0);
        Ok(())
    }
}
