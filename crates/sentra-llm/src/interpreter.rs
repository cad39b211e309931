//! Finding interpretation contract and implementations.

use crate::error::{LlmError, Result};
use crate::provider::{CompletionRequest, LlmProvider};
use async_trait::async_trait;
use sentra_core::{Interpretation, RawFinding};
use std::sync::Arc;

/// System prompt used to translate raw findings for developers.
const SYSTEM_PROMPT: &str = "\
You are a senior security engineer. Translate the raw security tool finding \
you receive into plain, actionable English for developers.

RULES:
1. Use simple language. Avoid hacking jargon.
2. DO NOT use terms like \"POC\", \"Exploit\", \"Payload\", \"CVE\".
3. Respond with a JSON object containing exactly three string fields:
   - \"what_is_wrong\": clear one-sentence description
   - \"why_it_matters\": business/safety impact
   - \"how_to_fix\": 1-2 concrete steps (code/config)";

/// Contract for the interpretation stage.
///
/// Invoked once per prioritized finding. A failure interpreting a single
/// finding must not fail the scan; callers substitute
/// [`Interpretation::placeholder`] and continue.
#[async_trait]
pub trait FindingInterpreter: Send + Sync {
    /// Produce a plain-language explanation for one finding.
    ///
    /// # Errors
    /// Returns error if the provider fails or returns unusable output.
    async fn interpret(&self, finding: &RawFinding) -> Result<Interpretation>;
}

/// Interpreter backed by an LLM provider.
pub struct LlmInterpreter {
    provider: Arc<dyn LlmProvider>,
}

impl LlmInterpreter {
    /// Create an interpreter over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Minimal JSON view of a finding, keeping prompts small and focused.
    fn finding_prompt(finding: &RawFinding) -> Result<String> {
        let minimal = serde_json::json!({
            "id": finding.name,
            "name": finding.title,
            "severity": finding.severity,
            "matched-at": finding.url,
        });
        Ok(serde_json::to_string(&minimal)?)
    }
}

#[async_trait]
impl FindingInterpreter for LlmInterpreter {
    async fn interpret(&self, finding: &RawFinding) -> Result<Interpretation> {
        let request = CompletionRequest::new(Self::finding_prompt(finding)?)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_max_tokens(512)
            .with_temperature(0.2)
            .with_json_output();

        tracing::debug!(finding = %finding.name, "requesting interpretation");
        let response = self.provider.complete(request).await?;

        let interpretation: Interpretation =
            serde_json::from_str(response.content.trim()).map_err(|e| LlmError::ParseError {
                provider: self.provider.provider_id().to_string(),
                message: format!("interpretation was not a valid JSON object: {e}"),
            })?;

        Ok(interpretation)
    }
}

/// Interpreter that always answers with the deterministic placeholder.
///
/// Used when LLM interpretation is disabled by configuration, so scans
/// still complete with readable (if generic) explanations.
pub struct PlaceholderInterpreter;

#[async_trait]
impl FindingInterpreter for PlaceholderInterpreter {
    async fn interpret(&self, finding: &RawFinding) -> Result<Interpretation> {
        Ok(Interpretation::placeholder(finding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CompletionResponse;
    use sentra_core::Severity;

    fn sample_finding() -> RawFinding {
        RawFinding {
            name: "missing-hsts".to_string(),
            title: "Missing Strict-Transport-Security Header".to_string(),
            url: "https://example.com".to_string(),
            severity: Severity::Low,
            ease_of_fix: 9.0,
            confidence: 0.8,
        }
    }

    struct CannedProvider {
        content: String,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                content: self.content.clone(),
                model: "canned".to_string(),
                stop_reason: Some("stop".to_string()),
            })
        }

        fn provider_id(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_interpret_parses_json_object() {
        let provider = CannedProvider {
            content: r#"{
                "what_is_wrong": "Your site does not force encrypted connections.",
                "why_it_matters": "Visitors can be downgraded to an insecure connection.",
                "how_to_fix": "Add a Strict-Transport-Security header to all responses."
            }"#
            .to_string(),
        };

        let interpreter = LlmInterpreter::new(Arc::new(provider));
        let interpretation = interpreter
            .interpret(&sample_finding())
            .await
            .expect("interpret finding");

        assert!(interpretation.what_is_wrong.contains("encrypted connections"));
        assert!(interpretation.how_to_fix.contains("Strict-Transport-Security"));
    }

    #[tokio::test]
    async fn test_interpret_rejects_non_json() {
        let provider = CannedProvider {
            content: "Sorry, I cannot help with that.".to_string(),
        };

        let interpreter = LlmInterpreter::new(Arc::new(provider));
        let result = interpreter.interpret(&sample_finding()).await;

        assert!(matches!(result, Err(LlmError::ParseError { .. })));
    }

    #[tokio::test]
    async fn test_placeholder_interpreter() {
        let finding = sample_finding();
        let interpretation = PlaceholderInterpreter
            .interpret(&finding)
            .await
            .expect("placeholder interpretation");

        assert_eq!(interpretation, Interpretation::placeholder(&finding));
    }

    #[test]
    fn test_finding_prompt_is_minimal() {
        let prompt = LlmInterpreter::finding_prompt(&sample_finding()).expect("build prompt");
        let value: serde_json::Value = serde_json::from_str(&prompt).expect("valid JSON");

        assert_eq!(value["id"], "missing-hsts");
        assert_eq!(value["severity"], "low");
        // Scoring inputs are noise for the language model
        assert!(value.get("ease_of_fix").is_none());
        assert!(value.get("confidence").is_none());
    }
}
