use sanafi_api_types::Route;
use sanafi_session::SessionService;
use sanafi_wizard::{StepDefinition, Wizard};
use std::sync::Arc;

use crate::error::FlowResult;
use crate::flow::{Form, Progress, Stage, stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub features: [&'static str; 3],
}

pub static SLIDES: [Slide; 4] = [
    Slide {
        title: "Welcome to Sanafi",
        subtitle: "Your Digital Wallet Revolution",
        description: "Experience the future of digital payments with our secure, fast, and user-friendly wallet platform.",
        features: ["Multi-currency support", "Bank-level security", "Instant transactions"],
    },
    Slide {
        title: "Secure & Compliant",
        subtitle: "UAE Central Bank Approved",
        description: "Built with the highest security standards and fully compliant with UAE financial regulations.",
        features: ["Biometric authentication", "Multi-signature support", "KYC verification"],
    },
    Slide {
        title: "Global Reach",
        subtitle: "Send Money Anywhere",
        description: "Transfer funds globally with competitive rates and lightning-fast processing times.",
        features: ["Real-time exchange rates", "Low transaction fees", "24/7 customer support"],
    },
    Slide {
        title: "Ready to Start?",
        subtitle: "Your Wallet Awaits",
        description: "Join thousands of users who trust Sanafi for their digital payment needs.",
        features: ["Easy account setup", "Instant verification", "Start with any amount"],
    },
];

/// Informational carousel. Finishing or skipping it completes onboarding.
pub struct OnboardingFlow {
    wizard: Wizard,
    session: Arc<dyn SessionService>,
}

impl OnboardingFlow {
    pub fn new(session: Arc<dyn SessionService>) -> FlowResult<Self> {
        let steps = SLIDES.iter().map(|slide| StepDefinition::new(slide.title)).collect();
        Ok(Self {
            wizard: Wizard::linear(steps)?,
            session,
        })
    }

    pub fn slide(&self) -> &'static Slide {
        &SLIDES[self.wizard.current_index()]
    }

    pub async fn next(&mut self) -> FlowResult<Progress<Route>> {
        match stage(self.wizard.go_next())? {
            Stage::Interim(progress) => Ok(progress),
            Stage::Submit(_) => self.finish().await,
        }
    }

    pub async fn skip(&mut self) -> FlowResult<Progress<Route>> {
        self.finish().await
    }

    async fn finish(&mut self) -> FlowResult<Progress<Route>> {
        self.session.complete_onboarding().await?;
        Ok(Progress::Finished(self.session.route().await))
    }
}

impl Form for OnboardingFlow {
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
    use sanafi_services::{Services, ViewScope};
    use sanafi_session::SessionStore;
    use sanafi_storage::InMemoryStore;
    use std::time::Duration;

    async fn signed_in() -> anyhow::Result<Arc<dyn SessionService>> {
        let session = SessionStore::open(
            Arc::new(InMemoryStore::default()),
            Services::instant().credentials,
            Duration::from_secs(10),
        )
        .await?;
        session.login(&ViewScope::new(), "a@b.com", "abcdef").await?;
        Ok(Arc::new(session))
    }

    #[tokio::test]
    async fn last_slide_completes_onboarding() -> anyhow::Result<()> {
        let session = signed_in().await?;
        let mut flow = OnboardingFlow::new(session.clone())?;
        assert_eq!(flow.slide().title, "Welcome to Sanafi");

        for _ in 0..3 {
            assert!(matches!(flow.next().await?, Progress::Moved { .. }));
        }
        assert!(flow.previous());
        assert!(matches!(flow.next().await?, Progress::Moved { .. }));
        assert_eq!(flow.slide().title, "Ready to Start?");
        assert!(!session.get().await.has_completed_onboarding);

        assert_eq!(flow.next().await?, Progress::Finished(Route::Kyc));
        assert!(session.get().await.has_completed_onboarding);
        Ok(())
    }

    #[tokio::test]
    async fn skip_completes_from_any_slide() -> anyhow::Result<()> {
        let session = signed_in().await?;
        let mut flow = OnboardingFlow::new(session.clone())?;
        assert_eq!(flow.skip().await?, Progress::Finished(Route::Kyc));
        Ok(())
    }
}
