//! Single-turn answer refinement from user feedback.

use super::Refiner;
use crate::config::{Prompts, Settings};
use crate::error::{MentorError, Result};
use crate::openai::create_client_with_timeout;
use crate::render::Renderer;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

/// Rewrites an answer based on feedback. No tools, no history.
pub struct FeedbackRefiner {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: Prompts,
    temperature: Option<f32>,
    renderer: Renderer,
}

impl FeedbackRefiner {
    pub fn new(client: Client<OpenAIConfig>, model: &str, prompts: Prompts) -> Self {
        Self {
            client,
            model: model.to_string(),
            prompts,
            temperature: None,
            renderer: Renderer::new(Default::default()),
        }
    }

    pub fn from_settings(settings: &Settings, prompts: &Prompts) -> Result<Self> {
        let client = create_client_with_timeout(
            &settings.model.provider,
            Duration::from_secs(settings.model.timeout_seconds),
        )?;

        let mut refiner = Self::new(client, &settings.model.name, prompts.clone());
        refiner.temperature = settings.model.temperature;
        refiner.renderer = Renderer::new(settings.render.exponents);
        Ok(refiner)
    }

    /// The messages sent for one refinement.
    fn messages(
        &self,
        question: &str,
        answer: &str,
        feedback: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("answer".to_string(), answer.to_string());
        vars.insert("feedback".to_string(), feedback.to_string());

        let system = self
            .prompts
            .render_with_custom(&self.prompts.feedback.system, &HashMap::new());
        let user = self
            .prompts
            .render_with_custom(&self.prompts.feedback.user, &vars);

        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| MentorError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| MentorError::Agent(e.to_string()))?
                .into(),
        ])
    }
}

#[async_trait]
impl Refiner for FeedbackRefiner {
    #[instrument(skip(self, answer, feedback))]
    async fn refine(&self, question: &str, answer: &str, feedback: &str) -> Result<String> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(self.messages(question, answer, feedback)?);
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        let request = args.build().map_err(|e| MentorError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| MentorError::Provider(format!("Chat API error: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MentorError::Provider("No response from model".to_string()))?;

        Ok(self.renderer.render(&content))
    }
}
