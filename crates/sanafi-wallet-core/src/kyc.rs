use sanafi_api_types::{
    DocumentKind, DocumentRef, IdentitySubmission, KycStatus, Route, VerificationStatus,
};
use sanafi_services::{Services, ViewScope, guarded};
use sanafi_session::SessionService;
use sanafi_validate::FieldKind;
use sanafi_wizard::{FieldSpec, FormValues, StepDefinition, Wizard};
use std::sync::Arc;
use tracing::info;

use crate::error::{FlowError, FlowResult};
use crate::flow::{Form, Progress, Stage, field, stage};

pub const EMIRATES: [&str; 7] = [
    "Abu Dhabi",
    "Dubai",
    "Sharjah",
    "Ajman",
    "Umm Al Quwain",
    "Ras Al Khaimah",
    "Fujairah",
];

pub const SUBMIT_FAILURE: &str = "Failed to submit KYC. Please try again.";
pub const DOCUMENTS_REFUSED: &str = "Your documents could not be verified. Please upload them again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KycOutcome {
    pub status: KycStatus,
    pub route: Route,
}

fn document_field(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::EmiratesId => "emirates_id",
        DocumentKind::Passport => "passport",
        DocumentKind::Selfie => "selfie",
    }
}

fn steps() -> Vec<StepDefinition> {
    let emirates = EMIRATES.iter().map(|name| (*name).to_owned()).collect();
    vec![
        StepDefinition::new("Personal Information")
            .field(FieldSpec::text("first_name", "First name").required())
            .field(FieldSpec::text("last_name", "Last name").required())
            .field(FieldSpec::text("date_of_birth", "Date of birth").required())
            .field(FieldSpec::text("nationality", "Nationality").with_default("United Arab Emirates"))
            .field(FieldSpec::text("phone_number", "Phone number").required())
            .field(FieldSpec::new("email", "Email", FieldKind::Email).required())
            .field(FieldSpec::text("address", "Address").required())
            .field(FieldSpec::text("city", "City"))
            .field(FieldSpec::new("emirate", "Emirate", FieldKind::Choice(emirates)).with_default("Dubai"))
            .field(FieldSpec::text("postal_code", "Postal code")),
        StepDefinition::new("Document Upload")
            .field(FieldSpec::text("emirates_id", "Emirates ID").required())
            .field(FieldSpec::text("passport", "Passport"))
            .field(FieldSpec::text("selfie", "Selfie").required()),
        StepDefinition::new("Verification")
            .field(
                FieldSpec::new(
                    "phone_verified",
                    "Phone verification",
                    FieldKind::Confirmation {
                        message: "Please verify your phone number".to_owned(),
                    },
                )
                .required(),
            )
            .field(
                FieldSpec::new(
                    "email_verified",
                    "Email verification",
                    FieldKind::Confirmation {
                        message: "Please verify your email address".to_owned(),
                    },
                )
                .required(),
            ),
        StepDefinition::new("Review & Submit"),
    ]
}

fn submission(values: &FormValues) -> IdentitySubmission {
    let passport = field(values, "passport");
    IdentitySubmission {
        emirates_id: DocumentRef(field(values, "emirates_id").to_owned()),
        passport: (!passport.is_empty()).then(|| DocumentRef(passport.to_owned())),
        selfie: DocumentRef(field(values, "selfie").to_owned()),
    }
}

/// Identity verification screen. It is abandoned rather than reset when left.
pub struct KycFlow {
    wizard: Wizard,
    session: Arc<dyn SessionService>,
    services: Services,
}

impl KycFlow {
    pub fn new(session: Arc<dyn SessionService>, services: Services) -> FlowResult<Self> {
        Ok(Self {
            wizard: Wizard::linear(steps())?,
            session,
            services,
        })
    }

    /// Attach a captured document. Any non-empty reference counts as uploaded.
    pub fn upload_document(&mut self, kind: DocumentKind, reference: &str) -> FlowResult<()> {
        self.wizard.set_value(document_field(kind), reference)?;
        Ok(())
    }

    pub fn verify_phone(&mut self) -> FlowResult<()> {
        self.wizard.set_value("phone_verified", "true")?;
        Ok(())
    }

    pub fn verify_email(&mut self) -> FlowResult<()> {
        self.wizard.set_value("email_verified", "true")?;
        Ok(())
    }

    /// Advance one step; on the review step this submits the documents.
    pub async fn next(&mut self, scope: &ViewScope) -> FlowResult<Progress<KycOutcome>> {
        let values = match stage(self.wizard.go_next())? {
            Stage::Interim(progress) => return Ok(progress),
            Stage::Submit(values) => values,
        };

        let verification = guarded(
            scope,
            self.services.call_timeout,
            self.services.identity.submit_documents(submission(&values)),
        )
        .await
        .map_err(|err| FlowError::from_service(err, SUBMIT_FAILURE))?;

        let status = match verification {
            VerificationStatus::Verified => KycStatus::Verified,
            VerificationStatus::Pending => KycStatus::Pending,
            VerificationStatus::Rejected => return Err(FlowError::rejected(DOCUMENTS_REFUSED)),
        };

        self.session.record_kyc_status(status).await?;
        self.session.complete_kyc().await?;
        info!(?status, "kyc submitted");

        Ok(Progress::Finished(KycOutcome {
            status,
            route: self.session.route().await,
        }))
    }

    /// Defer verification. The gate opens with the status recorded as skipped.
    pub async fn skip(&mut self) -> FlowResult<KycOutcome> {
        self.session.skip_kyc().await?;
        info!("kyc skipped");
        Ok(KycOutcome {
            status: KycStatus::Skipped,
            route: self.session.route().await,
        })
    }
}

impl Form for KycFlow {
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
    use async_trait::async_trait;
    use sanafi_services::simulated::SimulatedIdentity;
    use sanafi_services::{IdentityVerifier, Latency, ServiceResult};
    use sanafi_session::SessionStore;
    use sanafi_storage::InMemoryStore;
    use std::time::Duration;

    struct RefuseAll;

    #[async_trait]
    impl IdentityVerifier for RefuseAll {
        async fn submit_documents(&self, _submission: IdentitySubmission) -> ServiceResult<VerificationStatus> {
            Ok(VerificationStatus::Rejected)
        }
    }

    async fn onboarded_session(services: &Services) -> anyhow::Result<Arc<dyn SessionService>> {
        let session = SessionStore::open(
            Arc::new(InMemoryStore::default()),
            services.credentials.clone(),
            Duration::from_secs(10),
        )
        .await?;
        session.login(&ViewScope::new(), "a@b.com", "abcdef").await?;
        session.complete_onboarding().await?;
        Ok(Arc::new(session))
    }

    fn fill_personal(flow: &mut KycFlow) -> FlowResult<()> {
        for (name, value) in [
            ("first_name", "Layla"),
            ("last_name", "Haddad"),
            ("date_of_birth", "1990-04-12"),
            ("phone_number", "+971501234567"),
            ("email", "layla@example.com"),
            ("address", "Marina Walk 12"),
        ] {
            flow.set(name, value)?;
        }
        Ok(())
    }

    async fn reach_review(flow: &mut KycFlow, scope: &ViewScope) -> anyhow::Result<()> {
        fill_personal(flow)?;
        flow.next(scope).await?;
        flow.upload_document(DocumentKind::EmiratesId, "doc://emirates-id")?;
        flow.upload_document(DocumentKind::Selfie, "doc://selfie")?;
        flow.next(scope).await?;
        flow.verify_phone()?;
        flow.verify_email()?;
        flow.next(scope).await?;
        assert_eq!(flow.step_title(), "Review & Submit");
        Ok(())
    }

    #[tokio::test]
    async fn personal_info_gates_the_first_step() -> anyhow::Result<()> {
        let services = Services::instant();
        let mut flow = KycFlow::new(onboarded_session(&services).await?, services)?;
        let scope = ViewScope::new();

        fill_personal(&mut flow)?;
        flow.set("first_name", "")?;
        let Progress::Blocked(failing) = flow.next(&scope).await? else {
            panic!("missing first name should block");
        };
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].result.message, "First name is required");
        assert_eq!(flow.step_index(), 0);
        assert!(flow.wizard().is_touched("last_name"));

        flow.set("first_name", "Layla")?;
        assert_eq!(flow.next(&scope).await?, Progress::Moved { from: 0, to: 1 });
        assert_eq!(flow.step_title(), "Document Upload");
        Ok(())
    }

    #[tokio::test]
    async fn unverified_contacts_block_the_verification_step() -> anyhow::Result<()> {
        let services = Services::instant();
        let mut flow = KycFlow::new(onboarded_session(&services).await?, services)?;
        let scope = ViewScope::new();
        fill_personal(&mut flow)?;
        flow.next(&scope).await?;
        flow.upload_document(DocumentKind::EmiratesId, "doc://emirates-id")?;
        flow.upload_document(DocumentKind::Selfie, "doc://selfie")?;
        flow.next(&scope).await?;

        flow.verify_phone()?;
        let Progress::Blocked(failing) = flow.next(&scope).await? else {
            panic!("email is not verified yet");
        };
        assert_eq!(failing[0].result.message, "Please verify your email address");
        Ok(())
    }

    #[tokio::test]
    async fn submission_records_pending_and_opens_home() -> anyhow::Result<()> {
        let services = Services::instant();
        let session = onboarded_session(&services).await?;
        let mut flow = KycFlow::new(session.clone(), services)?;
        let scope = ViewScope::new();
        reach_review(&mut flow, &scope).await?;

        let outcome = flow.next(&scope).await?;
        assert_eq!(
            outcome,
            Progress::Finished(KycOutcome {
                status: KycStatus::Pending,
                route: Route::Home,
            })
        );
        assert_eq!(session.kyc_status().await, KycStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn refused_documents_leave_the_gate_closed() -> anyhow::Result<()> {
        let mut services = Services::instant();
        services.identity = Arc::new(RefuseAll);
        let session = onboarded_session(&services).await?;
        let mut flow = KycFlow::new(session.clone(), services)?;
        let scope = ViewScope::new();
        reach_review(&mut flow, &scope).await?;

        let err = flow.next(&scope).await.unwrap_err();
        assert_eq!(err.to_string(), DOCUMENTS_REFUSED);
        assert_eq!(session.route().await, Route::Kyc);
        assert_eq!(flow.step_index(), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dismissed_submission_changes_nothing() -> anyhow::Result<()> {
        let mut services = Services::instant();
        services.identity = Arc::new(SimulatedIdentity::new(Latency::fixed(Duration::from_secs(2))));
        let session = onboarded_session(&services).await?;
        let mut flow = KycFlow::new(session.clone(), services)?;
        let scope = ViewScope::new();
        reach_review(&mut flow, &scope).await?;

        let (result, ()) = tokio::join!(flow.next(&scope), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            scope.dismiss();
        });

        assert!(matches!(result, Err(FlowError::Cancelled)));
        assert_eq!(session.kyc_status().await, KycStatus::Unverified);
        assert!(!session.get().await.has_completed_kyc);
        assert_eq!(session.route().await, Route::Kyc);
        assert_eq!(flow.step_index(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn skipping_is_tracked_separately() -> anyhow::Result<()> {
        let services = Services::instant();
        let session = onboarded_session(&services).await?;
        let mut flow = KycFlow::new(session.clone(), services)?;
        flow.set("first_name", "Layla")?;

        let outcome = flow.skip().await?;
        assert_eq!(outcome.status, KycStatus::Skipped);
        assert_eq!(outcome.route, Route::Home);
        assert_eq!(flow.wizard().value("first_name"), Some("Layla"));
        Ok(())
    }
}
