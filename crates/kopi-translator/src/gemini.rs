//! Gemini generateContent path (JSON body, `x-goog-api-key` header).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{api_key, http_error, TranslateError};

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Returns the model's raw text; the caller runs it through the
/// translation extractor.
pub(crate) async fn generate(
    http: &reqwest::Client,
    base_url: &str,
    model: &str,
    prompt: &str,
    wait: Duration,
) -> Result<String, TranslateError> {
    let key = api_key("GEMINI_API_KEY")?;

    let url = format!("{base_url}/models/{model}:generateContent");
    let body = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }],
    };

    let response = http
        .post(&url)
        .header("x-goog-api-key", key)
        .timeout(wait)
        .json(&body)
        .send()
        .await
        .map_err(|e| http_error(e, wait))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.error)
            .map(|e| e.message)
            .unwrap_or(body);
        return Err(TranslateError::Provider {
            message: format!("Gemini API error: {message}"),
        });
    }

    let parsed: GenerateResponse = response.json().await.map_err(|e| TranslateError::Provider {
        message: format!("could not parse Gemini response: {e}"),
    })?;

    parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.first())
        .map(|part| part.text.clone())
        .ok_or_else(|| TranslateError::Provider {
            message: "Gemini response contained no candidates".to_string(),
        })
}
