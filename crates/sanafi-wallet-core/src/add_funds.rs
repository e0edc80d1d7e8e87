use sanafi_api_types::{AddFundsRequest, Receipt, TokenSymbol};
use sanafi_services::{Services, ViewScope, guarded};
use sanafi_validate::FieldKind;
use sanafi_wizard::{FieldSpec, FormValues, Rejection, StepDefinition, Wizard};
use tracing::info;

use crate::catalog::{PAYMENT_METHODS, PaymentMethod, Token, default_payment_method, find_token, payment_method};
use crate::error::{FlowError, FlowResult};
use crate::flow::{Form, Progress, Stage, field, parse_amount, stage};

pub const MIN_AMOUNT: f64 = 10.0;
pub const MAX_AMOUNT: f64 = 50_000.0;

pub const INVALID_AMOUNT: &str = "Please enter a valid amount";
pub const BELOW_MINIMUM: &str = "Minimum amount is AED 10";
pub const ABOVE_MAXIMUM: &str = "Maximum amount is AED 50,000 per transaction";
pub const NO_METHOD: &str = "Please select a payment method";
pub const SUBMIT_FAILURE: &str = "Something went wrong";

/// What the confirm step shows before funds are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct AddFundsQuote {
    pub amount: f64,
    pub token: TokenSymbol,
    pub method: &'static PaymentMethod,
    pub fee: f64,
    pub total_charged: f64,
    pub tokens_to_receive: f64,
}

fn check_amount(values: &FormValues) -> Result<(), Rejection> {
    let amount = parse_amount(field(values, "amount")).ok_or_else(|| Rejection::new(INVALID_AMOUNT))?;
    if amount < MIN_AMOUNT {
        return Err(Rejection::new(BELOW_MINIMUM));
    }
    if amount > MAX_AMOUNT {
        return Err(Rejection::new(ABOVE_MAXIMUM));
    }
    Ok(())
}

fn check_method(values: &FormValues) -> Result<(), Rejection> {
    if field(values, "payment_method").is_empty() {
        return Err(Rejection::new(NO_METHOD));
    }
    Ok(())
}

/// Three-step modal: amount, payment method, confirmation.
pub struct AddFundsFlow {
    wizard: Wizard,
    tokens: Vec<Token>,
    services: Services,
}

impl AddFundsFlow {
    pub fn new(services: Services, tokens: Vec<Token>) -> FlowResult<Self> {
        let first = tokens
            .first()
            .ok_or_else(|| FlowError::failed("No tokens available"))?;
        let symbols = tokens.iter().map(|t| t.symbol.to_string()).collect();
        let methods = PAYMENT_METHODS.iter().map(|m| m.name.to_owned()).collect();

        let wizard = Wizard::linear(vec![
            StepDefinition::new("Amount")
                .field(
                    FieldSpec::new("token", "Token", FieldKind::Choice(symbols))
                        .required()
                        .with_default(first.symbol.as_str()),
                )
                .field(FieldSpec::text("amount", "Amount"))
                .guard(check_amount),
            StepDefinition::new("Payment Method")
                .field(
                    FieldSpec::new("payment_method", "Payment method", FieldKind::Choice(methods))
                        .with_default(default_payment_method().name),
                )
                .guard(check_method),
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

    pub fn select_method(&mut self, name: &str) -> FlowResult<()> {
        self.wizard.set_value("payment_method", name)?;
        Ok(())
    }

    /// Price the current input. `None` until amount, token and method are all usable.
    pub fn quote(&self) -> Option<AddFundsQuote> {
        let values = self.wizard.snapshot();
        let amount = parse_amount(field(&values, "amount"))?;
        let token = find_token(&self.tokens, field(&values, "token"))?;
        let method = payment_method(field(&values, "payment_method"))?;
        Some(AddFundsQuote {
            amount,
            token: token.symbol.clone(),
            method,
            fee: method.fee,
            total_charged: amount + method.fee,
            tokens_to_receive: amount / token.price,
        })
    }

    /// Advance; on the confirm step this requests the funds and closes the modal on success.
    pub async fn next(&mut self, scope: &ViewScope) -> FlowResult<Progress<Receipt>> {
        let values = match stage(self.wizard.go_next())? {
            Stage::Interim(progress) => return Ok(progress),
            Stage::Submit(values) => values,
        };
        let amount = parse_amount(field(&values, "amount"))
            .ok_or_else(|| FlowError::rejected(INVALID_AMOUNT))?;
        let request = AddFundsRequest {
            amount,
            token: TokenSymbol::new(field(&values, "token")),
            payment_method: field(&values, "payment_method").to_owned(),
        };

        let receipt = guarded(
            scope,
            self.services.call_timeout,
            self.services.funds.submit_add_funds(request),
        )
        .await
        .map_err(|err| FlowError::from_service(err, SUBMIT_FAILURE))?;

        info!(reference = %receipt.reference, amount, "add funds requested");
        self.close();
        Ok(Progress::Finished(receipt))
    }

    /// Dismiss the modal. Reopening starts from a clean amount step.
    pub fn close(&mut self) {
        self.wizard.reset();
    }
}

impl Form for AddFundsFlow {
    fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }
}
