/// Supported languages: UI label paired with the name passed to backends.
/// Loaded once, never mutated at runtime.
pub static LANGUAGES: &[(&str, &str)] = &[
    ("Auto Detect", "auto"),
    ("Korean", "Korean"),
    ("English", "English"),
    ("Japanese", "Japanese"),
    ("Chinese (Simplified)", "Simplified Chinese"),
    ("Chinese (Traditional)", "Traditional Chinese"),
    ("Spanish", "Spanish"),
    ("French", "French"),
    ("German", "German"),
    ("Russian", "Russian"),
    ("Portuguese", "Portuguese"),
    ("Italian", "Italian"),
    ("Vietnamese", "Vietnamese"),
    ("Thai", "Thai"),
    ("Indonesian", "Indonesian"),
    ("Arabic", "Arabic"),
];
