use std::time::Duration;

use kopi_types::TranslationRequest;

mod cli;
mod deepl;
mod gemini;
pub mod parse;
pub mod registry;

pub use registry::{Backend, BackendKind};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEEPL_URL: &str = "https://api-free.deepl.com/v2/translate";

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("{0} CLI is not installed")]
    NotInstalled(String),

    #[error("translation timed out after {0} seconds")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("{var} environment variable is not set")]
    AuthMissing { var: &'static str },

    #[error("{message}")]
    Provider { message: String },

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("nothing to translate")]
    EmptyInput,
}

/// Builds the provider-agnostic prompt. The JSON-only envelope gives the
/// response parser a stable extraction target regardless of backend noise.
pub fn build_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    if source_lang == "auto" {
        format!(
            "Translate the following text to {target_lang}. Return ONLY a JSON object: {{\"translation\": \"your translation here\"}}\n\n{text}"
        )
    } else {
        format!(
            "Translate the following {source_lang} text to {target_lang}. Return ONLY a JSON object: {{\"translation\": \"your translation here\"}}\n\n{text}"
        )
    }
}

/// Routes a request to the backend registered for its model id.
///
/// Blocking from the caller's perspective for up to the CLI/API timeout;
/// callers run it on a worker task, never on the UI path.
pub struct TranslationClient {
    http: reqwest::Client,
    cli_timeout: Duration,
    api_timeout: Duration,
    gemini_base: String,
    deepl_url: String,
}

impl TranslationClient {
    pub fn new(cli_timeout: Duration, api_timeout: Duration) -> Self {
        Self::with_endpoints(cli_timeout, api_timeout, GEMINI_BASE_URL, DEEPL_URL)
    }

    pub fn with_endpoints(
        cli_timeout: Duration,
        api_timeout: Duration,
        gemini_base: &str,
        deepl_url: &str,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            cli_timeout,
            api_timeout,
            gemini_base: gemini_base.trim_end_matches('/').to_string(),
            deepl_url: deepl_url.to_string(),
        }
    }

    pub async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        if request.text.trim().is_empty() {
            return Err(TranslateError::EmptyInput);
        }

        let backend = registry::lookup(&request.model)
            .ok_or_else(|| TranslateError::UnknownModel(request.model.clone()))?;

        tracing::debug!(
            model = %request.model,
            kind = ?backend.kind,
            "dispatching translation"
        );

        match backend.kind {
            BackendKind::Cli => {
                let prompt = build_prompt(&request.text, &request.source_lang, &request.target_lang);
                let raw = cli::run_model(&request.model, &prompt, self.cli_timeout).await?;
                Ok(parse::extract_translation(&raw))
            }
            BackendKind::JsonApi => {
                let prompt = build_prompt(&request.text, &request.source_lang, &request.target_lang);
                let raw = gemini::generate(
                    &self.http,
                    &self.gemini_base,
                    &request.model,
                    &prompt,
                    self.api_timeout,
                )
                .await?;
                Ok(parse::extract_translation(&raw))
            }
            // DeepL responds with structured JSON; no noisy-text parsing.
            BackendKind::FormApi => {
                deepl::translate(
                    &self.http,
                    &self.deepl_url,
                    &request.text,
                    &request.source_lang,
                    &request.target_lang,
                    self.api_timeout,
                )
                .await
            }
        }
    }
}

/// Credential lookup happens before any network call is attempted.
fn api_key(var: &'static str) -> Result<String, TranslateError> {
    match std::env::var(var) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(TranslateError::AuthMissing { var }),
    }
}

fn http_error(err: reqwest::Error, timeout: Duration) -> TranslateError {
    if err.is_timeout() {
        TranslateError::Timeout(timeout.as_secs())
    } else if err.is_connect() {
        TranslateError::Network(format!("connection failed: {err}"))
    } else {
        TranslateError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str) -> TranslationRequest {
        TranslationRequest::new("annyeong", "auto", "English", model).unwrap()
    }

    #[test]
    fn prompt_mentions_source_language_when_known() {
        let p = build_prompt("bonjour", "French", "English");
        assert!(p.starts_with("Translate the following French text to English."));
        assert!(p.ends_with("\n\nbonjour"));
    }

    #[test]
    fn prompt_omits_source_language_when_auto() {
        let p = build_prompt("hola", "auto", "Korean");
        assert!(p.starts_with("Translate the following text to Korean."));
        assert!(p.contains("{\"translation\": \"your translation here\"}"));
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_dispatch() {
        let client = TranslationClient::new(Duration::from_secs(1), Duration::from_secs(1));
        let mut req = request("haiku");
        req.text = "   ".to_string();
        match client.translate(&req).await {
            Err(TranslateError::EmptyInput) => {}
            other => panic!("expected EmptyInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_model_is_a_dispatch_error() {
        let client = TranslationClient::new(Duration::from_secs(1), Duration::from_secs(1));
        match client.translate(&request("gpt-17-ultra")).await {
            Err(TranslateError::UnknownModel(m)) => assert_eq!(m, "gpt-17-ultra"),
            other => panic!("expected UnknownModel, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_gemini_key_fails_before_any_network_call() {
        unsafe { std::env::remove_var("GEMINI_API_KEY") };

        // Endpoint that would fail with a connection error if it were hit.
        let client = TranslationClient::with_endpoints(
            Duration::from_secs(1),
            Duration::from_secs(1),
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        );
        match client.translate(&request("gemini-2.5-flash")).await {
            Err(TranslateError::AuthMissing { var }) => assert_eq!(var, "GEMINI_API_KEY"),
            other => panic!("expected AuthMissing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deepl_rejects_unsupported_target_before_network() {
        unsafe { std::env::set_var("DEEPL_API_KEY", "test-key") };

        let client = TranslationClient::with_endpoints(
            Duration::from_secs(1),
            Duration::from_secs(1),
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        );
        let mut req = request("deepl-free");
        req.target_lang = "Thai".to_string();
        match client.translate(&req).await {
            Err(TranslateError::Provider { message }) => {
                assert!(message.contains("Thai"), "unexpected message: {message}")
            }
            other => panic!("expected Provider error, got {other:?}"),
        }
    }
}
