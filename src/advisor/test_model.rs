//! An offline [`Model`] for running the whole app without network access.
//!
//! Note: this is compiled into production builds on purpose, so that `FINTRACK_IN_TEST_MODE=1`
//! works with the released binary.

use crate::advisor::{Model, Prompt};
use crate::error::Res;
use anyhow::bail;

/// Replies with a fixed message built from the prompt.
#[derive(Debug, Default, Clone)]
pub(crate) struct TestModel {
    failure: Option<String>,
}

impl TestModel {
    /// A model whose every call fails with `message`.
    #[cfg(test)]
    pub(crate) fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
        }
    }
}

#[async_trait::async_trait]
impl Model for TestModel {
    async fn generate(&self, prompt: &Prompt) -> Res<String> {
        if let Some(message) = &self.failure {
            bail!("{message}");
        }
        let last_line = prompt
            .turns
            .last()
            .and_then(|turn| turn.text.lines().last())
            .unwrap_or_default();
        Ok(format!(
            "[test mode] {} turn(s). {last_line}",
            prompt.turns.len()
        ))
    }
}
