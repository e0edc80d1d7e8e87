//! Glue shared by the wizard-backed flows.

use sanafi_validate::ValidationResult;
use sanafi_wizard::{Advance, FieldError, FormValues, Wizard};

use crate::error::{FlowError, FlowResult};

/// What a `next` call did to a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress<T> {
    Moved { from: usize, to: usize },
    /// Inline field errors; the step did not change.
    Blocked(Vec<FieldError>),
    Finished(T),
}

impl<T> Progress<T> {
    pub fn is_finished(&self) -> bool {
        matches!(self, Progress::Finished(_))
    }
}

pub(crate) enum Stage<T> {
    Interim(Progress<T>),
    Submit(FormValues),
}

/// Split a wizard outcome into in-flight progress and a final submission.
pub(crate) fn stage<T>(advance: Advance) -> FlowResult<Stage<T>> {
    match advance {
        Advance::Moved { from, to } => Ok(Stage::Interim(Progress::Moved { from, to })),
        Advance::Blocked { failing } => Ok(Stage::Interim(Progress::Blocked(failing))),
        Advance::Rejected(rejection) => Err(FlowError::Rejected(rejection)),
        Advance::Completed(values) => Ok(Stage::Submit(values)),
    }
}

/// Field access every wizard-backed flow shares.
pub trait Form {
    fn wizard(&self) -> &Wizard;
    fn wizard_mut(&mut self) -> &mut Wizard;

    fn set(&mut self, field: &str, value: &str) -> FlowResult<Option<ValidationResult>> {
        Ok(self.wizard_mut().set_value(field, value)?)
    }

    fn blur(&mut self, field: &str) -> FlowResult<ValidationResult> {
        Ok(self.wizard_mut().blur(field)?)
    }

    fn previous(&mut self) -> bool {
        self.wizard_mut().go_previous()
    }

    fn step_index(&self) -> usize {
        self.wizard().current_index()
    }

    fn step_title(&self) -> &str {
        &self.wizard().current_step().title
    }
}

/// Amount typed into a numeric input. Anything that is not a positive finite number is `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let amount: f64 = raw.trim().parse().ok()?;
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

pub(crate) fn field<'a>(values: &'a FormValues, name: &str) -> &'a str {
    values.get(name).map(|value| value.trim()).unwrap_or("")
}
