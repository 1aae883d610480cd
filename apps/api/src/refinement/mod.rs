//! Experience refinement: rewrites free-text job responsibilities into short
//! achievement statements via the LLM client.
//!
//! Refinement is best-effort. Internally every step returns
//! `Result<_, RefinementError>`; the `Refine` boundary collapses any error into a
//! deterministic single-bullet fallback so rendering never fails because of it.

pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::{ChatMessage, ChatRequest, LlmClient, LlmError, LlmSettings};
use crate::refinement::prompts::{build_system_prompt, build_user_prompt};

pub const DEFAULT_MAX_BULLETS: usize = 5;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.6;
const TOP_P: f32 = 0.8;

/// A UTF-8 bullet decoded as Windows-1252. Lines carrying it are artifacts and dropped.
const MISENCODED_BULLET: &str = "â€¢";

/// Leading glyphs stripped from otherwise valid lines.
const BULLET_GLYPHS: &[char] = &['•', '·', '▪', '◦', '-', '–', '—', '*'];

#[derive(Debug, Error)]
pub enum RefinementError {
    #[error("refinement backend is not configured")]
    Disabled,

    #[error("nothing to refine")]
    EmptyInput,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model response contained no usable bullet lines")]
    NoBullets,
}

/// Turns raw responsibilities text into at most `max_bullets` statements.
///
/// Implementations must not fail: the result always has between 1 and
/// `max(max_bullets, 1)` entries.
#[async_trait]
pub trait Refine: Send + Sync {
    async fn refine(&self, text: &str, max_bullets: usize) -> Vec<String>;
}

/// Production refiner backed by an Azure OpenAI deployment.
pub struct TextRefiner {
    llm: Option<LlmClient>,
}

impl TextRefiner {
    /// Builds the refiner from optional settings. Missing settings or a client
    /// that fails to build leave the refiner in fallback-only mode.
    pub fn new(settings: Option<LlmSettings>) -> Self {
        let Some(settings) = settings else {
            warn!("Azure OpenAI endpoint or key not set; experience refinement disabled");
            return Self::disabled();
        };
        match LlmClient::new(settings) {
            Ok(client) => {
                info!("LLM client initialized (deployment: {})", client.deployment());
                Self { llm: Some(client) }
            }
            Err(e) => {
                warn!("LLM client initialization failed, refinement disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { llm: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    async fn try_refine(&self, text: &str, max_bullets: usize) -> Result<Vec<String>, RefinementError> {
        let llm = self.llm.as_ref().ok_or(RefinementError::Disabled)?;
        if text.trim().is_empty() {
            return Err(RefinementError::EmptyInput);
        }

        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(build_system_prompt(max_bullets)),
                ChatMessage::user(build_user_prompt(text)),
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        };

        let response = llm.chat(&request).await?;
        let content = response.text().ok_or(LlmError::EmptyContent)?;

        let bullets = parse_bullets(content, max_bullets);
        if bullets.is_empty() {
            return Err(RefinementError::NoBullets);
        }
        Ok(bullets)
    }
}

#[async_trait]
impl Refine for TextRefiner {
    async fn refine(&self, text: &str, max_bullets: usize) -> Vec<String> {
        let max_bullets = max_bullets.max(1);
        match self.try_refine(text, max_bullets).await {
            Ok(bullets) => {
                debug!("Refined experience into {} bullets", bullets.len());
                bullets
            }
            Err(e @ (RefinementError::Disabled | RefinementError::EmptyInput)) => {
                debug!("Skipping refinement: {e}");
                vec![fallback_bullet(text)]
            }
            Err(e) => {
                warn!("Experience refinement error, using fallback: {e}");
                vec![fallback_bullet(text)]
            }
        }
    }
}

/// Splits a model response into bullet lines.
///
/// Blank lines and mis-encoded bullet artifacts are dropped, leading bullet
/// glyphs are stripped, and the result is capped at `max_bullets`.
pub fn parse_bullets(content: &str, max_bullets: usize) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(MISENCODED_BULLET))
        .map(|line| line.trim_start_matches(BULLET_GLYPHS).trim())
        .filter(|line| !line.is_empty())
        .take(max_bullets)
        .map(String::from)
        .collect()
}

/// The first sentence of `text` with its period, or the whole trimmed text when
/// there is no period.
pub fn fallback_bullet(text: &str) -> String {
    let text = text.trim();
    match text.split_once('.') {
        Some((head, _)) => format!("{}.", head.trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_mock_completions(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/openai/deployments/:deployment/chat/completions",
            post(move |headers: HeaderMap| {
                let body = body.clone();
                async move {
                    if headers.get("api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
                        return (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"error": {"message": "bad key"}})),
                        );
                    }
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn refiner_for(endpoint: String) -> TextRefiner {
        TextRefiner::new(Some(LlmSettings {
            endpoint,
            api_key: "test-key".to_string(),
            api_version: "2024-02-15-preview".to_string(),
            deployment: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(5),
        }))
    }

    fn completion(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn test_fallback_bullet_keeps_first_sentence() {
        assert_eq!(
            fallback_bullet("Led a team of 5 engineers. Delivered on time."),
            "Led a team of 5 engineers."
        );
    }

    #[test]
    fn test_fallback_bullet_without_period_keeps_full_text() {
        assert_eq!(fallback_bullet("  Maintained CI pipelines  "), "Maintained CI pipelines");
    }

    #[test]
    fn test_parse_bullets_strips_glyphs_and_blank_lines() {
        let content = "• Cut build times by 40%\n\n- Migrated 12 services\n* Mentored 3 engineers\n";
        assert_eq!(
            parse_bullets(content, 5),
            vec![
                "Cut build times by 40%",
                "Migrated 12 services",
                "Mentored 3 engineers"
            ]
        );
    }

    #[test]
    fn test_parse_bullets_drops_misencoded_artifacts() {
        let content = "â€¢ garbled\nReduced costs by 15%";
        assert_eq!(parse_bullets(content, 5), vec!["Reduced costs by 15%"]);
    }

    #[test]
    fn test_parse_bullets_truncates_to_max() {
        let content = "One\nTwo\nThree\nFour";
        assert_eq!(parse_bullets(content, 2), vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_bullets_glyph_only_lines_are_dropped() {
        assert!(parse_bullets("•\n - \n", 5).is_empty());
    }

    #[tokio::test]
    async fn test_disabled_refiner_returns_first_sentence() {
        let refiner = TextRefiner::disabled();
        assert!(!refiner.is_enabled());
        let bullets = refiner
            .refine("Led a team of 5 engineers. Delivered on time.", 5)
            .await;
        assert_eq!(bullets, vec!["Led a team of 5 engineers."]);
    }

    #[tokio::test]
    async fn test_refiner_without_settings_is_disabled() {
        let refiner = TextRefiner::new(None);
        assert!(!refiner.is_enabled());
        assert_eq!(
            refiner.refine("Closed the books. Filed taxes.", 5).await,
            vec!["Closed the books."]
        );
    }

    #[tokio::test]
    async fn test_zero_max_bullets_still_returns_one() {
        let bullets = TextRefiner::disabled().refine("Did things.", 0).await;
        assert_eq!(bullets.len(), 1);
    }

    #[tokio::test]
    async fn test_refiner_uses_model_bullets() {
        let endpoint = spawn_mock_completions(
            StatusCode::OK,
            completion("• Led 5 engineers to ship v2\n• Cut latency by 30%\n• Saved $20k/yr"),
        )
        .await;
        let refiner = refiner_for(endpoint);
        assert!(refiner.is_enabled());

        let bullets = refiner.refine("Led a team. Shipped things.", 2).await;
        assert_eq!(bullets, vec!["Led 5 engineers to ship v2", "Cut latency by 30%"]);
    }

    #[tokio::test]
    async fn test_refiner_falls_back_on_api_error() {
        let endpoint = spawn_mock_completions(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": {"message": "overloaded"}}),
        )
        .await;
        let bullets = refiner_for(endpoint)
            .refine("Owned billing. Wrote docs.", 5)
            .await;
        assert_eq!(bullets, vec!["Owned billing."]);
    }

    #[tokio::test]
    async fn test_refiner_falls_back_when_response_has_no_bullets() {
        let endpoint = spawn_mock_completions(StatusCode::OK, completion("â€¢ only artifacts")).await;
        let bullets = refiner_for(endpoint).refine("Owned billing. Wrote docs.", 5).await;
        assert_eq!(bullets, vec!["Owned billing."]);
    }

    #[tokio::test]
    async fn test_refiner_falls_back_on_unreachable_endpoint() {
        let bullets = refiner_for("http://127.0.0.1:1".to_string())
            .refine("Ran payroll. Audited vendors.", 5)
            .await;
        assert_eq!(bullets, vec!["Ran payroll."]);
    }

    #[tokio::test]
    async fn test_refiner_falls_back_when_deployment_is_too_slow() {
        let app = Router::new().route(
            "/openai/deployments/:deployment/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(completion("Never arrives"))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let refiner = TextRefiner::new(Some(LlmSettings {
            endpoint,
            api_key: "test-key".to_string(),
            api_version: "2024-02-15-preview".to_string(),
            deployment: "gpt-4o-mini".to_string(),
            timeout: Duration::from_millis(100),
        }));
        let started = std::time::Instant::now();
        let bullets = refiner.refine("Owned billing. Wrote docs.", 5).await;
        assert_eq!(bullets, vec!["Owned billing."]);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
