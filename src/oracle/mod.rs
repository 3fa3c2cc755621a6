use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::OracleConfig;
use crate::metrics::CriterionAverage;

/// Shown in place of a summary when the oracle rejects or times out.
/// Oracle failures never propagate past this boundary.
pub const FALLBACK_SUMMARY: &str =
    "Summary unavailable. Review the individual report evaluations below.";

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Summarization request failed: {0}")]
    Request(String),
    #[error("Summarization timed out after {0}s")]
    Timeout(u64),
    #[error("Summarization returned an empty completion")]
    EmptyCompletion,
}

/// Text-summarization boundary. Implementations are assumed slow
/// (seconds-scale) and unreliable; callers go through
/// `summarize_or_fallback` or a `SummarySession`.
#[async_trait]
pub trait SummaryOracle: Send + Sync {
    async fn summarize(
        &self,
        reasonings: &[String],
        criteria: &[CriterionAverage],
    ) -> Result<String, OracleError>;
}

pub struct ChatCompletionClient {
    client: reqwest::Client,
    config: OracleConfig,
}

impl ChatCompletionClient {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn build_prompt(reasonings: &[String], criteria: &[CriterionAverage]) -> String {
        let mut prompt = String::from(
            "Summarize the following performance evaluations in two or three \
             sentences for a manager. Be concrete about strengths and gaps.\n\nEvaluations:\n",
        );
        for reasoning in reasonings {
            prompt.push_str("- ");
            prompt.push_str(reasoning);
            prompt.push('\n');
        }
        if !criteria.is_empty() {
            prompt.push_str("\nCriterion averages (0-10):\n");
            for c in criteria {
                prompt.push_str(&format!("- {}: {:.1}\n", c.name, c.average_score));
            }
        }
        prompt
    }
}

#[async_trait]
impl SummaryOracle for ChatCompletionClient {
    async fn summarize(
        &self,
        reasonings: &[String],
        criteria: &[CriterionAverage],
    ) -> Result<String, OracleError> {
        let prompt = Self::build_prompt(reasonings, criteria);

        let request = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&serde_json::json!({
                "model": self.config.model,
                "messages": [{"role": "user", "content": prompt}],
                "max_tokens": 300
            }))
            .send();

        let response = tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), request)
            .await
            .map_err(|_| OracleError::Timeout(self.config.timeout_secs))?
            .map_err(|e| OracleError::Request(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Request(e.to_string()))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();
        if content.is_empty() {
            return Err(OracleError::EmptyCompletion);
        }
        Ok(content)
    }
}

/// Run the oracle and swallow its failure into the fixed fallback string.
pub async fn summarize_or_fallback(
    oracle: &dyn SummaryOracle,
    reasonings: &[String],
    criteria: &[CriterionAverage],
) -> String {
    match oracle.summarize(reasonings, criteria).await {
        Ok(summary) => summary,
        Err(e) => {
            log::warn!("Summarization failed, using fallback: {e}");
            FALLBACK_SUMMARY.to_string()
        }
    }
}

/// Generation guard for in-flight summarizations. Each request takes a
/// fresh generation; a response that finishes after a newer request has
/// been issued is discarded so a stale summary can never overwrite a
/// fresher one when the user changes scope or window mid-flight.
#[derive(Debug, Default)]
pub struct SummarySession {
    latest: AtomicU64,
}

impl SummarySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Issue a request under a new generation. Returns None when the
    /// response arrives stale; the caller keeps whatever it already shows.
    pub async fn request(
        &self,
        oracle: &dyn SummaryOracle,
        reasonings: &[String],
        criteria: &[CriterionAverage],
    ) -> Option<String> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let summary = summarize_or_fallback(oracle, reasonings, criteria).await;

        let latest = self.latest.load(Ordering::SeqCst);
        if latest != generation {
            log::debug!("Discarding stale summary (generation {generation}, latest {latest})");
            return None;
        }
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedOracle {
        reply: Result<&'static str, ()>,
        delay_ms: u64,
    }

    #[async_trait]
    impl SummaryOracle for CannedOracle {
        async fn summarize(
            &self,
            _reasonings: &[String],
            _criteria: &[CriterionAverage],
        ) -> Result<String, OracleError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.reply
                .map(|s| s.to_string())
                .map_err(|_| OracleError::Request("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn fallback_replaces_failure() {
        let oracle = CannedOracle {
            reply: Err(()),
            delay_ms: 0,
        };
        let summary = summarize_or_fallback(&oracle, &[], &[]).await;
        assert_eq!(summary, FALLBACK_SUMMARY);
    }

    #[tokio::test]
    async fn successful_summary_passes_through() {
        let oracle = CannedOracle {
            reply: Ok("Strong quarter overall."),
            delay_ms: 0,
        };
        let summary = summarize_or_fallback(&oracle, &[], &[]).await;
        assert_eq!(summary, "Strong quarter overall.");
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let session = SummarySession::new();
        let slow = CannedOracle {
            reply: Ok("old scope"),
            delay_ms: 50,
        };
        let fast = CannedOracle {
            reply: Ok("new scope"),
            delay_ms: 0,
        };

        let slow_request = session.request(&slow, &[], &[]);
        let fast_request = session.request(&fast, &[], &[]);
        let (stale, fresh) = tokio::join!(slow_request, fast_request);

        assert_eq!(stale, None);
        assert_eq!(fresh.as_deref(), Some("new scope"));
    }

    #[tokio::test]
    async fn single_request_is_not_stale() {
        let session = SummarySession::new();
        let oracle = CannedOracle {
            reply: Ok("only one"),
            delay_ms: 0,
        };
        assert_eq!(session.request(&oracle, &[], &[]).await.as_deref(), Some("only one"));
        assert_eq!(session.current_generation(), 1);
    }

    #[test]
    fn prompt_includes_reasonings_and_criteria() {
        let prompt = ChatCompletionClient::build_prompt(
            &["delivered the migration early".to_string()],
            &[CriterionAverage {
                name: "quality".to_string(),
                average_score: 8.25,
                frequency: 4,
            }],
        );
        assert!(prompt.contains("delivered the migration early"));
        assert!(prompt.contains("quality: 8.2"));
    }
}
