//! Step wizard engine.
//!
//! A wizard is an ordered list of [`StepDefinition`]s plus the form values
//! entered so far. Forward movement is gated on the current step's field
//! validation and optional business guard; backward movement never is.
//! Tab-style wizards additionally allow jumping straight to any step.

use sanafi_validate::{FieldKind, ValidationResult, validate_field};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub type FormValues = BTreeMap<String, String>;

pub type Guard = Arc<dyn Fn(&FormValues) -> Result<(), Rejection> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("a wizard needs at least one step")]
    NoSteps,
    #[error("step {index} is out of range for a wizard with {len} steps")]
    StepOutOfRange { index: usize, len: usize },
    #[error("jumping between steps is only allowed for tab navigation")]
    JumpNotAllowed,
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// A business-rule refusal raised by a step guard (amount limits, balance checks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub message: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Field whose current value a confirmation field must equal.
    pub depends_on: Option<String>,
    /// Used whenever the form holds no value for this field.
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind,
            required: false,
            depends_on: None,
            default: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn depends_on(mut self, field: &str) -> Self {
        self.depends_on = Some(field.to_owned());
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub result: ValidationResult,
}

pub struct StepDefinition {
    pub index: usize,
    pub title: String,
    pub fields: Vec<FieldSpec>,
    guard: Option<Guard>,
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("index", &self.index)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

impl StepDefinition {
    pub fn new(title: &str) -> Self {
        Self {
            index: 0,
            title: title.to_owned(),
            fields: Vec::new(),
            guard: None,
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&FormValues) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Run every field validator of this step; returns the failures in field order.
    pub fn validate(&self, values: &FormValues) -> Vec<FieldError> {
        self.fields
            .iter()
            .filter_map(|spec| {
                let result = check_field(spec, values);
                (!result.is_valid).then(|| FieldError {
                    field: spec.name.clone(),
                    result,
                })
            })
            .collect()
    }

    pub fn check_guard(&self, values: &FormValues) -> Result<(), Rejection> {
        match &self.guard {
            Some(guard) => guard(values),
            None => Ok(()),
        }
    }
}

fn effective<'a>(spec: &'a FieldSpec, values: &'a FormValues) -> &'a str {
    values
        .get(&spec.name)
        .map(String::as_str)
        .or(spec.default.as_deref())
        .unwrap_or("")
}

fn check_field(spec: &FieldSpec, values: &FormValues) -> ValidationResult {
    let dependent = spec
        .depends_on
        .as_ref()
        .map(|name| values.get(name).map(String::as_str).unwrap_or(""));
    validate_field(
        &spec.label,
        &spec.kind,
        spec.required,
        effective(spec, values),
        dependent,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Forward only through `go_next`, gated on validation.
    Linear,
    /// Every step reachable through `jump_to` without validation. Each tab submits on its own.
    Tabs,
}

/// Result of a `go_next` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved { from: usize, to: usize },
    /// Field validation failed; the failing fields are now touched.
    Blocked { failing: Vec<FieldError> },
    Rejected(Rejection),
    /// The last step validated; carries a snapshot of the submitted values.
    Completed(FormValues),
}

pub struct Wizard {
    steps: Vec<StepDefinition>,
    current: usize,
    values: FormValues,
    touched: BTreeSet<String>,
    navigation: Navigation,
    submissions: u64,
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("steps", &self.steps)
            .field("current", &self.current)
            .field("values", &self.values)
            .field("touched", &self.touched)
            .field("navigation", &self.navigation)
            .field("submissions", &self.submissions)
            .finish()
    }
}

impl Wizard {
    pub fn new(steps: Vec<StepDefinition>, navigation: Navigation) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::NoSteps);
        }

        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, mut step)| {
                step.index = index;
                step
            })
            .collect();

        Ok(Self {
            steps,
            current: 0,
            values: FormValues::new(),
            touched: BTreeSet::new(),
            navigation,
            submissions: 0,
        })
    }

    pub fn linear(steps: Vec<StepDefinition>) -> Result<Self, WizardError> {
        Self::new(steps, Navigation::Linear)
    }

    pub fn tabs(steps: Vec<StepDefinition>) -> Result<Self, WizardError> {
        Self::new(steps, Navigation::Tabs)
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> &StepDefinition {
        &self.steps[self.current]
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// One-based position and total, as rendered by a progress bar.
    pub fn progress(&self) -> (usize, usize) {
        (self.current + 1, self.steps.len())
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// The entered value, or the field's default when nothing was entered.
    pub fn value(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.values.get(name) {
            return Some(value.as_str());
        }
        self.find_field(name).and_then(|spec| spec.default.as_deref())
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .find(|spec| spec.name == name)
    }

    /// Store a value. Returns the fresh validation once the field has been touched.
    pub fn set_value(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Option<ValidationResult>, WizardError> {
        if self.find_field(name).is_none() {
            return Err(WizardError::UnknownField(name.to_owned()));
        }
        self.values.insert(name.to_owned(), value.into());

        if self.touched.contains(name) {
            return self.validate_field(name).map(Some);
        }
        Ok(None)
    }

    /// Remove an entered value and hand it to the caller. The field falls back to its default.
    pub fn take_value(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Focus left the field: mark it touched and validate it.
    pub fn blur(&mut self, name: &str) -> Result<ValidationResult, WizardError> {
        let result = self.validate_field(name)?;
        self.touched.insert(name.to_owned());
        Ok(result)
    }

    pub fn validate_field(&self, name: &str) -> Result<ValidationResult, WizardError> {
        let spec = self
            .find_field(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_owned()))?;
        Ok(check_field(spec, &self.values))
    }

    /// The error to render under a field, if it is touched and currently invalid.
    pub fn visible_error(&self, name: &str) -> Option<ValidationResult> {
        if !self.touched.contains(name) {
            return None;
        }
        self.validate_field(name).ok().filter(|result| !result.is_valid)
    }

    pub fn go_next(&mut self) -> Advance {
        let step = &self.steps[self.current];
        let failing = step.validate(&self.values);

        if !failing.is_empty() {
            for spec in &step.fields {
                self.touched.insert(spec.name.clone());
            }
            debug!(
                step = self.current,
                failing = failing.len(),
                "wizard step blocked by field validation"
            );
            return Advance::Blocked { failing };
        }

        if let Err(rejection) = step.check_guard(&self.snapshot()) {
            debug!(step = self.current, reason = %rejection, "wizard step rejected");
            return Advance::Rejected(rejection);
        }

        if self.is_last_step() || self.navigation == Navigation::Tabs {
            self.submissions += 1;
            debug!(submissions = self.submissions, "wizard completed");
            return Advance::Completed(self.snapshot());
        }

        let from = self.current;
        self.current += 1;
        debug!(from, to = self.current, "wizard advanced");
        Advance::Moved {
            from,
            to: self.current,
        }
    }

    /// Step back one step. Returns whether the index changed.
    pub fn go_previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        debug!(to = self.current, "wizard stepped back");
        true
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), WizardError> {
        if self.navigation != Navigation::Tabs {
            return Err(WizardError::JumpNotAllowed);
        }
        if index >= self.steps.len() {
            return Err(WizardError::StepOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.values.clear();
        self.touched.clear();
    }

    /// Entered values merged over field defaults.
    pub fn snapshot(&self) -> FormValues {
        let mut merged: FormValues = self
            .steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .filter_map(|spec| {
                spec.default
                    .as_ref()
                    .map(|default| (spec.name.clone(), default.clone()))
            })
            .collect();
        merged.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}
