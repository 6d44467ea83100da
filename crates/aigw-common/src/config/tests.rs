use super::*;

#[test]
fn later_layers_win() {
    let mut patch = TranslatorConfigPatch::defaults();
    patch.overlay(TranslatorConfigPatch {
        publisher: Some("env-pub".to_string()),
        model_name_override: Some("env-model".to_string()),
    });
    patch.overlay(TranslatorConfigPatch {
        publisher: Some("cli-pub".to_string()),
        model_name_override: None,
    });
    let config = patch.into_config().unwrap();
    assert_eq!(config.publisher, "cli-pub");
    assert_eq!(config.model_name_override.as_deref(), Some("env-model"));
}

#[test]
fn defaults_use_google_publisher() {
    let config = TranslatorConfigPatch::defaults().into_config().unwrap();
    assert_eq!(config, TranslatorConfig::default());
    assert_eq!(config.publisher, "google");
}

#[test]
fn empty_publisher_is_rejected() {
    let patch = TranslatorConfigPatch {
        publisher: Some(String::new()),
        model_name_override: None,
    };
    assert!(matches!(
        patch.into_config(),
        Err(ConfigError::MissingField("publisher"))
    ));
    assert!(TranslatorConfigPatch::default().into_config().is_err());
}

#[test]
fn env_lookup_ignores_blank_values() {
    let patch = TranslatorConfigPatch::from_lookup(|key| match key {
        ENV_PUBLISHER => Some("  ".to_string()),
        ENV_MODEL_NAME_OVERRIDE => Some("gemini-2.5-pro".to_string()),
        _ => None,
    });
    assert_eq!(patch.publisher, None);
    assert_eq!(patch.model_name_override.as_deref(), Some("gemini-2.5-pro"));
}

#[test]
fn resolve_model_prefers_override() {
    let mut config = TranslatorConfig::default();
    assert_eq!(config.resolve_model("gemini-pro"), "gemini-pro");
    config.model_name_override = Some("gemini-2.5-flash".to_string());
    assert_eq!(config.resolve_model("gemini-pro"), "gemini-2.5-flash");
}
