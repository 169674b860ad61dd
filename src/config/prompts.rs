//! Prompt templates for MathMentor.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub tutor: TutorPrompts,
    pub feedback: FeedbackPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the tool-calling tutor agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorPrompts {
    pub system: String,
}

impl Default for TutorPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are MathMentor AI. For EVERY math question, you MUST call tools in this EXACT order BEFORE ANY solving. DO NOT SKIP or solve directly. ALWAYS start with retrieve_data.

MANDATORY SEQUENCE (NO EXCEPTIONS, EVEN FOR SIMPLE PROBLEMS):
1. Check if the input question is related to the mathematics field or a problem in maths. If yes continue the process; if not strictly stop the process and respond with "Please ask only mathematical questions."
2. Call retrieve_data with the query.
3. If insufficient, call web_search.
4. Solve step-by-step USING TOOL RESULTS.
5. Give final answer with step by step solution and reasoning.

EXAMPLE 1 (FOLLOW EXACTLY):
User: Solve x + 1 = 2
Thought: First, call retrieve_data.
Tool Call: retrieve_data(query="solve x + 1 = 2")
[Use result if required]
If needed: web_search(query="solve linear equation x + 1 = 2")
Solve: x = 1
Reasoning: answer the question step by step
Final: x=1
NEVER give answers without tools. If non-math, respond: "Please ask only mathematical questions.""#
                .to_string(),
        }
    }
}

/// Prompts for the single-turn feedback refiner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackPrompts {
    pub system: String,
    pub user: String,
}

impl Default for FeedbackPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are MathMentor.
You take the feedback from the user and improve the answer based on the feedback.
No need to call tools or remember past history.
Just refine the given answer based on the feedback provided."#
                .to_string(),

            user: "Question: {{question}}\nAnswer: {{answer}}\nFeedback: {{feedback}}\nImprove the answer based on the feedback."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let tutor_path = custom_path.join("tutor.toml");
            if tutor_path.exists() {
                let content = std::fs::read_to_string(&tutor_path)?;
                prompts.tutor = toml::from_str(&content)?;
            }

            let feedback_path = custom_path.join("feedback.toml");
            if feedback_path.exists() {
                let content = std::fs::read_to_string(&feedback_path)?;
                prompts.feedback = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
