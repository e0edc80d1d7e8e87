use sanafi_services::assistant::{GREETING, QUICK_PROMPTS};
use sanafi_services::{Services, ViewScope, guarded};

use crate::error::{FlowError, FlowResult};

pub const REPLY_FAILURE: &str = "Sorry, I couldn't answer that right now. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

/// Assistant conversation. One reply is in flight at a time.
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    services: Services,
}

impl ChatSession {
    pub fn new(services: Services) -> Self {
        Self {
            messages: vec![ChatMessage {
                speaker: Speaker::Assistant,
                text: GREETING.to_owned(),
            }],
            services,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn quick_prompts(&self) -> &'static [(&'static str, &'static str)] {
        &QUICK_PROMPTS
    }

    /// Post a prompt and wait for the reply. Blank prompts are ignored.
    pub async fn ask(&mut self, scope: &ViewScope, prompt: &str) -> FlowResult<Option<String>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }
        self.messages.push(ChatMessage {
            speaker: Speaker::User,
            text: prompt.to_owned(),
        });

        let reply = guarded(
            scope,
            self.services.call_timeout,
            self.services.assistant.reply(prompt),
        )
        .await
        .map_err(|err| FlowError::from_service(err, REPLY_FAILURE))?;

        self.messages.push(ChatMessage {
            speaker: Speaker::Assistant,
            text: reply.clone(),
        });
        Ok(Some(reply))
    }
}
