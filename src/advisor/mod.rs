//! The financial advisor: forwards a question, together with a summary of the user's finances, to
//! a hosted text-generation model and hands back the model's reply.
//!
//! The model itself sits behind the [`Model`] trait. [`GoogleModel`] talks to the Gemini
//! `generateContent` endpoint. [`TestModel`] answers offline and is used when
//! `FINTRACK_IN_TEST_MODE` is set.

mod context;
mod google;
mod test_model;

pub(crate) use context::{build_context, FinancialSnapshot};
pub(crate) use google::GoogleModel;
pub(crate) use test_model::TestModel;

use crate::error::Res;
use crate::model::ValidationErrors;
use anyhow::bail;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The environment variable that switches the advisor to the offline [`TestModel`].
pub const TEST_MODE_ENV: &str = "FINTRACK_IN_TEST_MODE";

/// The longest question the advisor accepts, in characters.
pub const MAX_QUESTION_LEN: usize = 1000;

pub(crate) const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(crate) const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub(crate) const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a personal financial advisor, \
    sarcastic but helpful. Answer concisely, directly, and give practical advice about money.";
pub(crate) const DEFAULT_RECENT_TRANSACTIONS: u32 = 30;

/// Which text-generation backend to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Call the Google Gemini API.
    #[default]
    Google,
    /// Answer offline with canned replies.
    Testing,
}

impl Mode {
    /// `Mode::Testing` when `FINTRACK_IN_TEST_MODE` is set to a non-empty value, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Google,
        }
    }
}

/// Everything the advisor needs to know about the model it calls. It is passed in when the
/// advisor is built; the advisor never looks anything up on its own.
#[derive(Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    pub endpoint: String,
    pub model: String,
    pub system_instruction: String,
    /// How many of the newest transactions are described to the model.
    pub recent_transactions: u32,
    pub api_key: Option<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            recent_transactions: DEFAULT_RECENT_TRANSACTIONS,
            api_key: None,
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("system_instruction", &self.system_instruction)
            .field("recent_transactions", &self.recent_transactions)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Who said something in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

serde_plain::derive_display_from_serialize!(Role);

/// One message in a conversation with the advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A complete request for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Prompt {
    pub(crate) system_instruction: String,
    /// Oldest first. The last turn is always from the user.
    pub(crate) turns: Vec<Turn>,
}

/// A text-generation backend.
#[async_trait::async_trait]
pub(crate) trait Model: Send + Sync {
    /// Returns the model's reply. On failure the error message is the one given by the provider,
    /// unchanged.
    async fn generate(&self, prompt: &Prompt) -> Res<String>;
}

pub(crate) struct Advisor {
    config: AdvisorConfig,
    model: Box<dyn Model>,
}

impl Advisor {
    pub(crate) fn new(config: AdvisorConfig, mode: Mode) -> Res<Self> {
        let model: Box<dyn Model> = match mode {
            Mode::Google => {
                let Some(api_key) = config.api_key.clone() else {
                    bail!(
                        "No Gemini API key is configured. Set GEMINI_API_KEY or save the key in \
                        .secrets/gemini_api_key inside the fintrack home directory."
                    );
                };
                Box::new(GoogleModel::new(&config.endpoint, &config.model, api_key))
            }
            Mode::Testing => Box::new(TestModel::default()),
        };
        Ok(Self::with_model(config, model))
    }

    pub(crate) fn with_model(config: AdvisorConfig, model: Box<dyn Model>) -> Self {
        Self { config, model }
    }

    pub(crate) fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Checks the question and the earlier turns before anything is sent.
    pub(crate) fn validate(question: &str, history: &[Turn]) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if question.trim().is_empty() {
            errors.add("question", "must not be blank");
        } else if question.chars().count() > MAX_QUESTION_LEN {
            errors.add(
                "question",
                format!("must not be longer than {MAX_QUESTION_LEN} characters"),
            );
        }
        for (i, turn) in history.iter().enumerate() {
            if turn.text.trim().is_empty() {
                errors.add(format!("history.{i}.text"), "must not be blank");
            }
        }
        errors.into_result()
    }

    /// Sends one request made of the earlier turns followed by the financial context and the
    /// question. There are no retries.
    pub(crate) async fn ask(
        &self,
        snapshot: &FinancialSnapshot,
        question: &str,
        history: &[Turn],
    ) -> Res<String> {
        let context = build_context(snapshot);
        let mut turns = history.to_vec();
        turns.push(Turn::user(format!("{context}\nQuestion: {}", question.trim())));
        let prompt = Prompt {
            system_instruction: self.config.system_instruction.clone(),
            turns,
        };
        debug!(
            "Asking the advisor with {} turn(s) and {} characters of context",
            prompt.turns.len(),
            context.len()
        );
        self.model.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_question() {
        assert!(Advisor::validate("How am I doing?", &[]).is_ok());
        assert!(Advisor::validate("   ", &[]).unwrap_err().has("question"));
        let long = "?".repeat(MAX_QUESTION_LEN + 1);
        assert!(Advisor::validate(&long, &[]).unwrap_err().has("question"));
        assert!(Advisor::validate(&"?".repeat(MAX_QUESTION_LEN), &[]).is_ok());
    }

    #[test]
    fn test_validate_history() {
        let history = vec![Turn::user("hi"), Turn::model(" ")];
        let errors = Advisor::validate("ok?", &history).unwrap_err();
        assert!(errors.has("history.1.text"));
    }

    #[test]
    fn test_google_mode_requires_key() {
        assert!(Advisor::new(AdvisorConfig::default(), Mode::Google).is_err());
        assert!(Advisor::new(AdvisorConfig::default(), Mode::Testing).is_ok());
        let config = AdvisorConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert!(Advisor::new(config, Mode::Google).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let config = AdvisorConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn test_turn_json() {
        let turn: Turn = serde_json::from_str(r#"{"role":"model","text":"Spend less."}"#).unwrap();
        assert_eq!(turn, Turn::model("Spend less."));
        assert!(serde_json::from_str::<Turn>(r#"{"role":"system","text":"x"}"#).is_err());
    }

    #[tokio::test]
    async fn test_ask_sends_history_then_question() {
        let advisor = Advisor::new(AdvisorConfig::default(), Mode::Testing).unwrap();
        let reply = advisor
            .ask(
                &FinancialSnapshot::default(),
                " Should I buy a laptop? ",
                &[Turn::user("hello"), Turn::model("hi")],
            )
            .await
            .unwrap();
        assert_eq!(reply, "[test mode] 3 turn(s). Question: Should I buy a laptop?");
    }
}
