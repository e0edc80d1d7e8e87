//! Field validators.
//!
//! Every validator is a pure function of the field value (and, for
//! confirmation fields, the value it must match). Kinds expand into an
//! ordered rule list and the first failing rule supplies the message.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Digit,
}

impl CharClass {
    fn matches(self, c: char) -> bool {
        match self {
            CharClass::Lowercase => c.is_lowercase(),
            CharClass::Uppercase => c.is_uppercase(),
            CharClass::Digit => c.is_ascii_digit(),
        }
    }
}

/// One check applied to a raw input value.
#[derive(Debug, Clone)]
pub enum Rule {
    Required { label: String },
    Pattern { regex: Regex, message: String },
    MinLength { min: usize, message: String },
    Contains { class: CharClass, message: String },
    /// Value must equal the dependent field's value; empty values are rejected first.
    Matches { empty_message: String, mismatch_message: String },
    OneOf { options: Vec<String>, message: String },
    /// Checkbox-style fields: only the literal `"true"` passes.
    Accepted { message: String },
}

impl Rule {
    pub fn check(&self, value: &str, dependent: Option<&str>) -> Result<(), String> {
        match self {
            Rule::Required { label } => {
                if value.trim().is_empty() {
                    return Err(format!("{label} is required"));
                }
            }
            Rule::Pattern { regex, message } => {
                if !regex.is_match(value.trim()) {
                    return Err(message.clone());
                }
            }
            Rule::MinLength { min, message } => {
                if value.chars().count() < *min {
                    return Err(message.clone());
                }
            }
            Rule::Contains { class, message } => {
                if !value.chars().any(|c| class.matches(c)) {
                    return Err(message.clone());
                }
            }
            Rule::Matches {
                empty_message,
                mismatch_message,
            } => {
                if value.is_empty() {
                    return Err(empty_message.clone());
                }
                if Some(value) != dependent {
                    return Err(mismatch_message.clone());
                }
            }
            Rule::OneOf { options, message } => {
                if !options.iter().any(|option| option == value) {
                    return Err(message.clone());
                }
            }
            Rule::Accepted { message } => {
                if value != "true" {
                    return Err(message.clone());
                }
            }
        }
        Ok(())
    }
}

/// The kinds of input the forms use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    ConfirmPassword,
    Choice(Vec<String>),
    Confirmation { message: String },
}

impl FieldKind {
    pub fn rules(&self, label: &str) -> Vec<Rule> {
        match self {
            FieldKind::Text => Vec::new(),
            FieldKind::Email => vec![Rule::Pattern {
                regex: EMAIL_PATTERN.clone(),
                message: "Please enter a valid email address".to_owned(),
            }],
            FieldKind::Password => password_rules(),
            FieldKind::ConfirmPassword => vec![Rule::Matches {
                empty_message: "Please confirm your password".to_owned(),
                mismatch_message: "Passwords do not match".to_owned(),
            }],
            FieldKind::Choice(options) => vec![Rule::OneOf {
                options: options.clone(),
                message: format!("Please select a valid {}", label.to_lowercase()),
            }],
            FieldKind::Confirmation { message } => vec![Rule::Accepted {
                message: message.clone(),
            }],
        }
    }
}

fn password_rules() -> Vec<Rule> {
    vec![
        Rule::MinLength {
            min: MIN_PASSWORD_LENGTH,
            message: format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        },
        Rule::Contains {
            class: CharClass::Lowercase,
            message: "Password must contain at least one lowercase letter".to_owned(),
        },
        Rule::Contains {
            class: CharClass::Uppercase,
            message: "Password must contain at least one uppercase letter".to_owned(),
        },
        Rule::Contains {
            class: CharClass::Digit,
            message: "Password must contain at least one number".to_owned(),
        },
    ]
}

pub fn run_rules(rules: &[Rule], value: &str, dependent: Option<&str>) -> ValidationResult {
    for rule in rules {
        if let Err(message) = rule.check(value, dependent) {
            return ValidationResult::invalid(message);
        }
    }
    ValidationResult::valid()
}

/// Validate a form field. Blank optional fields pass without running the kind's rules.
pub fn validate_field(
    label: &str,
    kind: &FieldKind,
    required: bool,
    value: &str,
    dependent: Option<&str>,
) -> ValidationResult {
    let blank = value.trim().is_empty();
    if blank && !required && *kind != FieldKind::ConfirmPassword {
        return ValidationResult::valid();
    }
    if required && !matches!(kind, FieldKind::ConfirmPassword | FieldKind::Confirmation { .. }) {
        let result = validate_required(label, value);
        if !result.is_valid {
            return result;
        }
    }
    run_rules(&kind.rules(label), value, dependent)
}

pub fn validate_required(label: &str, value: &str) -> ValidationResult {
    run_rules(
        &[Rule::Required {
            label: label.to_owned(),
        }],
        value,
        None,
    )
}

pub fn validate_email(value: &str) -> ValidationResult {
    run_rules(&FieldKind::Email.rules("Email"), value, None)
}

pub fn validate_password(value: &str) -> ValidationResult {
    run_rules(&password_rules(), value, None)
}

pub fn validate_confirm_password(value: &str, password: &str) -> ValidationResult {
    run_rules(
        &FieldKind::ConfirmPassword.rules("Confirm Password"),
        value,
        Some(password),
    )
}
