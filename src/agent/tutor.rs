//! Tool-calling tutor loop.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use super::Tutor;
use crate::config::{Prompts, Settings, TutorPrompts};
use crate::error::{MentorError, Result};
use crate::openai::create_client_with_timeout;
use crate::render::Renderer;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Math tutor that consults its tools before answering.
pub struct MathTutor {
    client: Client<OpenAIConfig>,
    model: String,
    tools: ToolContext,
    max_iterations: usize,
    system_prompt: String,
    temperature: Option<f32>,
    renderer: Renderer,
}

impl MathTutor {
    /// Create a tutor with the default prompt and rendering.
    pub fn new(client: Client<OpenAIConfig>, model: &str, tools: ToolContext) -> Self {
        Self {
            client,
            model: model.to_string(),
            tools,
            max_iterations: 15,
            system_prompt: TutorPrompts::default().system,
            temperature: None,
            renderer: Renderer::new(Default::default()),
        }
    }

    /// Build a tutor from settings and loaded prompts.
    pub fn from_settings(settings: &Settings, prompts: &Prompts, tools: ToolContext) -> Result<Self> {
        let client = create_client_with_timeout(
            &settings.model.provider,
            Duration::from_secs(settings.model.timeout_seconds),
        )?;
        let system_prompt = prompts.render_with_custom(&prompts.tutor.system, &HashMap::new());

        Ok(Self::new(client, &settings.model.name, tools)
            .with_system_prompt(&system_prompt)
            .with_max_iterations(settings.model.max_iterations)
            .with_temperature(settings.model.temperature)
            .with_renderer(Renderer::new(settings.render.exponents)))
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Run the tool loop for one question.
    #[instrument(skip(self))]
    pub async fn run(&self, question: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| MentorError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(question)
                .build()
                .map_err(|e| MentorError::Agent(e.to_string()))?
                .into(),
        ];

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(MentorError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Tutor iteration {}", iterations);

            let mut args = CreateChatCompletionRequestArgs::default();
            args.model(&self.model)
                .messages(messages.clone())
                .tools(tool_definitions());
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

            let choice = response
                .choices
                .first()
                .ok_or_else(|| MentorError::Provider("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(self.build_response(
                        choice.message.content.as_deref(),
                        tool_calls_made,
                        iterations,
                    ));
                }
            };

            messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .tool_calls(tool_calls.clone())
                    .build()
                    .map_err(|e| MentorError::Agent(e.to_string()))?
                    .into(),
            );

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                messages.push(
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(&tool_call.id)
                        .content(record.result.clone())
                        .build()
                        .map_err(|e| MentorError::Agent(e.to_string()))?
                        .into(),
                );

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call. Failures become text for the model.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Tutor calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }

    fn build_response(
        &self,
        content: Option<&str>,
        tool_calls: Vec<ToolCallRecord>,
        iterations: usize,
    ) -> AgentResponse {
        AgentResponse {
            content: self.renderer.render(content.unwrap_or_default()),
            tool_calls,
            iterations,
        }
    }
}

#[async_trait]
impl Tutor for MathTutor {
    async fn solve(&self, question: &str) -> Result<String> {
        let response = self.run(question).await?;
        debug!(
            "Answered after {} iterations and {} tool calls",
            response.iterations,
            response.tool_calls.len()
        );
        Ok(response.content)
    }
}

/// Response from a tutor run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The rendered final answer.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
