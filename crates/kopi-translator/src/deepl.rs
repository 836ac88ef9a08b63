//! DeepL path: form-encoded POST, provider-specific language codes,
//! structured JSON response read directly.

use std::time::Duration;

use serde::Deserialize;

use crate::{api_key, http_error, TranslateError};

static LANG_MAP: &[(&str, &str)] = &[
    ("Korean", "KO"),
    ("English", "EN"),
    ("Japanese", "JA"),
    ("Simplified Chinese", "ZH-HANS"),
    ("Traditional Chinese", "ZH-HANT"),
    ("Spanish", "ES"),
    ("French", "FR"),
    ("German", "DE"),
    ("Russian", "RU"),
    ("Portuguese", "PT"),
    ("Italian", "IT"),
    ("Indonesian", "ID"),
    ("Arabic", "AR"),
];

fn lang_code(name: &str) -> Option<&'static str> {
    LANG_MAP
        .iter()
        .find(|(label, _)| *label == name)
        .map(|(_, code)| *code)
}

#[derive(Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Deserialize)]
struct DeeplTranslation {
    text: String,
}

pub(crate) async fn translate(
    http: &reqwest::Client,
    url: &str,
    text: &str,
    source_lang: &str,
    target_lang: &str,
    wait: Duration,
) -> Result<String, TranslateError> {
    let key = api_key("DEEPL_API_KEY")?;

    let target = lang_code(target_lang).ok_or_else(|| TranslateError::Provider {
        message: format!("DeepL does not support '{target_lang}'"),
    })?;

    let mut params = vec![
        ("text", text.to_string()),
        ("target_lang", target.to_string()),
    ];
    if source_lang != "auto"
        && let Some(code) = lang_code(source_lang)
    {
        // DeepL source_lang takes only the major code (EN, ZH, ...).
        let major = code.split('-').next().unwrap_or(code);
        params.push(("source_lang", major.to_string()));
    }

    let response = http
        .post(url)
        .header("Authorization", format!("DeepL-Auth-Key {key}"))
        .timeout(wait)
        .form(&params)
        .send()
        .await
        .map_err(|e| http_error(e, wait))?;

    let status = response.status();
    match status.as_u16() {
        403 => {
            return Err(TranslateError::Provider {
                message: "DeepL API key is not valid".to_string(),
            });
        }
        456 => {
            return Err(TranslateError::Provider {
                message: "DeepL free quota exhausted".to_string(),
            });
        }
        _ if !status.is_success() => {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Provider {
                message: format!("DeepL API error ({status}): {body}"),
            });
        }
        _ => {}
    }

    let parsed: DeeplResponse = response.json().await.map_err(|e| TranslateError::Provider {
        message: format!("could not parse DeepL response: {e}"),
    })?;

    parsed
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| TranslateError::Provider {
            message: "DeepL response contained no translations".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_variants_map_to_distinct_codes() {
        assert_eq!(lang_code("Simplified Chinese"), Some("ZH-HANS"));
        assert_eq!(lang_code("Traditional Chinese"), Some("ZH-HANT"));
    }

    #[test]
    fn unmapped_language_is_none() {
        assert_eq!(lang_code("Thai"), None);
        assert_eq!(lang_code("auto"), None);
    }
}
