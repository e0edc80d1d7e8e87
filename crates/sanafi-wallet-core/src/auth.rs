use sanafi_api_types::Route;
use sanafi_services::ViewScope;
use sanafi_session::SessionService;
use sanafi_validate::FieldKind;
use sanafi_wizard::{FieldSpec, StepDefinition, Wizard};
use std::sync::Arc;
use tracing::info;
use zeroize::Zeroizing;

use crate::error::{FlowError, FlowResult};
use crate::flow::{Form, Progress, Stage, field, stage};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const GENERIC_FAILURE: &str = "Something went wrong";

const SECRET_FIELDS: [&str; 2] = ["password", "confirm_password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

fn form(mode: AuthMode) -> FlowResult<Wizard> {
    let step = match mode {
        AuthMode::SignIn => StepDefinition::new("Sign In")
            .field(FieldSpec::text("email", "Email").required())
            .field(FieldSpec::text("password", "Password").required()),
        AuthMode::SignUp => StepDefinition::new("Create Account")
            .field(FieldSpec::new("email", "Email", FieldKind::Email).required())
            .field(FieldSpec::new("password", "Password", FieldKind::Password).required())
            .field(
                FieldSpec::new("confirm_password", "Confirm password", FieldKind::ConfirmPassword)
                    .required()
                    .depends_on("password"),
            ),
    };
    Ok(Wizard::linear(vec![step])?)
}

/// Sign-in and sign-up screen. Both end in a credential check against the session.
pub struct AuthFlow {
    mode: AuthMode,
    wizard: Wizard,
    session: Arc<dyn SessionService>,
}

impl AuthFlow {
    pub fn new(session: Arc<dyn SessionService>, mode: AuthMode) -> FlowResult<Self> {
        Ok(Self {
            mode,
            wizard: form(mode)?,
            session,
        })
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Toggle between sign-in and sign-up, keeping what was typed for email and password.
    pub fn switch_mode(&mut self, mode: AuthMode) -> FlowResult<()> {
        if mode == self.mode {
            return Ok(());
        }
        let mut next = form(mode)?;
        if let Some(email) = self.wizard.values().get("email") {
            next.set_value("email", email.as_str())?;
        }
        if let Some(password) = self.wizard.take_value("password").map(Zeroizing::new) {
            next.set_value("password", password.as_str())?;
        }
        for name in SECRET_FIELDS {
            let _ = self.wizard.take_value(name).map(Zeroizing::new);
        }
        self.wizard = next;
        self.mode = mode;
        Ok(())
    }

    /// Validate the form and try the credentials. Finishes with the route to open next.
    pub async fn submit(&mut self, scope: &ViewScope) -> FlowResult<Progress<Route>> {
        let mut values = match stage(self.wizard.go_next())? {
            Stage::Interim(progress) => return Ok(progress),
            Stage::Submit(values) => values,
        };
        let email = field(&values, "email").to_owned();
        let password = values
            .remove("password")
            .map(Zeroizing::new)
            .unwrap_or_else(|| Zeroizing::new(String::new()));
        // Secrets leave the form before the check, whatever its outcome.
        for name in SECRET_FIELDS {
            let _ = values.remove(name).map(Zeroizing::new);
            let _ = self.wizard.take_value(name).map(Zeroizing::new);
        }

        let accepted = self
            .session
            .login(scope, &email, &password)
            .await
            .map_err(|err| FlowError::from_session(err, GENERIC_FAILURE))?;
        if !accepted {
            return Err(FlowError::failed(INVALID_CREDENTIALS));
        }

        info!(mode = ?self.mode, "credentials accepted");
        self.wizard.reset();
        Ok(Progress::Finished(self.session.route().await))
    }
}

impl Form for AuthFlow {
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
    use sanafi_services::Services;
    use sanafi_session::SessionStore;
    use sanafi_storage::InMemoryStore;
    use std::time::Duration;

    async fn session() -> anyhow::Result<Arc<dyn SessionService>> {
        let store = SessionStore::open(
            Arc::new(InMemoryStore::default()),
            Services::instant().credentials,
            Duration::from_secs(10),
        )
        .await?;
        Ok(Arc::new(store))
    }

    #[tokio::test]
    async fn sign_in_routes_to_onboarding() -> anyhow::Result<()> {
        let mut flow = AuthFlow::new(session().await?, AuthMode::SignIn)?;
        flow.set("email", "a@b.com")?;
        flow.set("password", "abcdef")?;

        let progress = flow.submit(&ViewScope::new()).await?;
        assert_eq!(progress, Progress::Finished(Route::Onboarding));
        assert!(flow.wizard().values().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn short_password_is_invalid_credentials() -> anyhow::Result<()> {
        let mut flow = AuthFlow::new(session().await?, AuthMode::SignIn)?;
        flow.set("email", "a@b.com")?;
        flow.set("password", "abc")?;

        let err = flow.submit(&ViewScope::new()).await.unwrap_err();
        assert_eq!(err.user_message().as_deref(), Some(INVALID_CREDENTIALS));
        assert_eq!(flow.wizard().value("email"), Some("a@b.com"));
        assert_eq!(flow.wizard().value("password"), None);
        Ok(())
    }

    #[tokio::test]
    async fn dismissed_sign_up_drops_both_password_entries() -> anyhow::Result<()> {
        let session = session().await?;
        let mut flow = AuthFlow::new(session.clone(), AuthMode::SignUp)?;
        flow.set("email", "a@b.com")?;
        flow.set("password", "Abcdefg1")?;
        flow.set("confirm_password", "Abcdefg1")?;

        let scope = ViewScope::new();
        scope.dismiss();
        assert!(matches!(flow.submit(&scope).await, Err(FlowError::Cancelled)));
        assert_eq!(flow.wizard().value("password"), None);
        assert_eq!(flow.wizard().value("confirm_password"), None);
        assert_eq!(flow.wizard().value("email"), Some("a@b.com"));
        assert!(!session.get().await.is_authenticated);
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_checks_password_strength_and_confirmation() -> anyhow::Result<()> {
        let mut flow = AuthFlow::new(session().await?, AuthMode::SignIn)?;
        flow.set("email", "a@b.com")?;
        flow.set("password", "abcdefgh")?;
        flow.switch_mode(AuthMode::SignUp)?;
        assert_eq!(flow.wizard().value("email"), Some("a@b.com"));

        let Progress::Blocked(failing) = flow.submit(&ViewScope::new()).await? else {
            panic!("weak password should block");
        };
        let messages: Vec<&str> = failing.iter().map(|e| e.result.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Password must contain at least one uppercase letter",
                "Please confirm your password",
            ]
        );

        flow.set("password", "Abcdefg1")?;
        flow.set("confirm_password", "Abcdefg2")?;
        assert_eq!(
            flow.wizard().visible_error("confirm_password").unwrap().message,
            "Passwords do not match"
        );
        flow.set("confirm_password", "Abcdefg1")?;
        assert_eq!(
            flow.submit(&ViewScope::new()).await?,
            Progress::Finished(Route::Onboarding)
        );
        Ok(())
    }
}
