use serde::{Deserialize, Serialize};

fn default_source_lang() -> String {
    "auto".to_string()
}

fn default_target_lang() -> String {
    "English".to_string()
}

fn default_model() -> String {
    "haiku".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            model: default_model(),
        }
    }
}
