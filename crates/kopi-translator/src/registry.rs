//! Static model registry. Loaded once, never mutated at runtime.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Local executable invoked with the prompt as an argument.
    Cli,
    /// HTTP POST with a JSON body (Gemini generateContent).
    JsonApi,
    /// HTTP POST with form-encoded fields (DeepL).
    FormApi,
}

#[derive(Debug, Clone, Copy)]
pub struct Backend {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: BackendKind,
    /// Environment variable holding the credential, for API backends.
    pub key_var: Option<&'static str>,
}

pub static BACKENDS: &[Backend] = &[
    Backend {
        id: "haiku",
        label: "Claude Haiku (fast)",
        kind: BackendKind::Cli,
        key_var: None,
    },
    Backend {
        id: "sonnet",
        label: "Claude Sonnet (balanced)",
        kind: BackendKind::Cli,
        key_var: None,
    },
    Backend {
        id: "opus",
        label: "Claude Opus (quality)",
        kind: BackendKind::Cli,
        key_var: None,
    },
    Backend {
        id: "gemini-1.5-pro",
        label: "Gemini Pro (CLI)",
        kind: BackendKind::Cli,
        key_var: None,
    },
    Backend {
        id: "gemini-2.5-flash-lite",
        label: "Gemini 2.5 Flash Lite API",
        kind: BackendKind::JsonApi,
        key_var: Some("GEMINI_API_KEY"),
    },
    Backend {
        id: "gemini-2.0-flash",
        label: "Gemini 2.0 Flash API",
        kind: BackendKind::JsonApi,
        key_var: Some("GEMINI_API_KEY"),
    },
    Backend {
        id: "gemini-2.5-flash",
        label: "Gemini 2.5 Flash API",
        kind: BackendKind::JsonApi,
        key_var: Some("GEMINI_API_KEY"),
    },
    Backend {
        id: "gemini-2.5-pro",
        label: "Gemini 2.5 Pro API",
        kind: BackendKind::JsonApi,
        key_var: Some("GEMINI_API_KEY"),
    },
    Backend {
        id: "deepl-free",
        label: "DeepL API (fast)",
        kind: BackendKind::FormApi,
        key_var: Some("DEEPL_API_KEY"),
    },
];

pub fn lookup(model: &str) -> Option<&'static Backend> {
    BACKENDS.iter().find(|b| b.id == model)
}

/// Gemini CLI models use `gemini -p`; everything else on the CLI path is
/// the claude binary.
pub fn is_gemini_cli(model: &str) -> bool {
    model.starts_with("gemini-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_models_route_to_cli() {
        for id in ["haiku", "sonnet", "opus"] {
            let backend = lookup(id).expect(id);
            assert_eq!(backend.kind, BackendKind::Cli);
            assert!(backend.key_var.is_none());
        }
    }

    #[test]
    fn api_models_carry_their_credential_var() {
        assert_eq!(
            lookup("gemini-2.5-pro").unwrap().key_var,
            Some("GEMINI_API_KEY")
        );
        assert_eq!(lookup("deepl-free").unwrap().key_var, Some("DEEPL_API_KEY"));
    }

    #[test]
    fn unknown_model_is_absent() {
        assert!(lookup("mystery-model").is_none());
    }

    #[test]
    fn model_ids_are_unique() {
        for (i, a) in BACKENDS.iter().enumerate() {
            for b in &BACKENDS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
