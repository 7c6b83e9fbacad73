#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_valid() {
        let config = MoodlightConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.window_ms, 4_000);
        assert_eq!(config.throttle.min_interval_ms, 800);
    }

    #[test]
    fn test_config_validation_window() {
        let mut config = MoodlightConfig::default();
        config.window.window_ms = 0;
        assert!(config.validate().is_err());

        config.window.window_ms = 1_000_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_light_ids() {
        let mut config = MoodlightConfig::default();
        config.hue.light_ids = vec!["1".into(), " ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = MoodlightConfig::default();
        config
            .apply_overrides(env(&[
                ("HUME_API_KEY", "key"),
                ("HUME_ENDPOINT", "wss://api.hume.ai/v0/stream/models"),
                ("HUE_BRIDGE_IP", "192.168.1.2"),
                ("HUE_APP_KEY", "app"),
                ("HUE_LIGHT_IDS", " a1, b2 ,,c3"),
                ("MOODLIGHT_WINDOW_MS", "2500"),
            ]))
            .unwrap();

        assert_eq!(config.hume.api_key, "key");
        assert_eq!(config.hue.light_ids, vec!["a1", "b2", "c3"]);
        assert_eq!(config.window.window_ms, 2_500);
        assert_eq!(config.hume.config_id, None);
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = MoodlightConfig::default();
        let err = config
            .apply_overrides(env(&[("MOODLIGHT_MIN_INTERVAL_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_require_credentials_reports_first_missing() {
        let mut config = MoodlightConfig::default();
        config.apply_overrides(env(&[("HUME_API_KEY", "key")])).unwrap();
        match config.require_credentials() {
            Err(ConfigError::MissingField(field)) => assert_eq!(field, "HUME_ENDPOINT"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_hue_credentials_checked_alone() {
        let mut config = MoodlightConfig::default();
        config
            .apply_overrides(env(&[("HUE_BRIDGE_IP", "10.0.0.2"), ("HUE_APP_KEY", "app")]))
            .unwrap();
        match config.hue.require_credentials() {
            Err(ConfigError::MissingField(field)) => assert_eq!(field, "HUE_LIGHT_IDS"),
            other => panic!("unexpected: {:?}", other),
        }

        config.hue.light_ids = vec!["1".into()];
        assert!(config.hue.require_credentials().is_ok());
        // Hume credentials are not the bridge's concern.
        assert!(matches!(
            config.require_credentials(),
            Err(ConfigError::MissingField("HUME_API_KEY"))
        ));
    }

    #[test]
    fn test_hue_base_url_stands_in_for_bridge_ip() {
        let hue = HueConfig {
            app_key: "app".into(),
            light_ids: vec!["1".into()],
            base_url: Some("http://127.0.0.1:8080".into()),
            ..Default::default()
        };
        assert!(hue.require_credentials().is_ok());
        assert_eq!(hue.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_from_file_with_env() {
        let file = toml_file("[hue]\nlight_ids = [\"7\"]\n");
        let config = MoodlightConfig::from_file_with_env(file.path()).unwrap();
        assert!(config.validate().is_ok());

        let file = toml_file("[window]\nwindow_ms = 0\n");
        assert!(matches!(
            MoodlightConfig::from_file_with_env(file.path()),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            MoodlightConfig::from_file_with_env("/nonexistent/moodlight.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_config_from_file_partial() {
        let file = toml_file(
            r#"
[window]
window_ms = 6000

[hue]
bridge_ip = "10.0.0.5"
light_ids = ["7"]
"#,
        );
        let config = MoodlightConfig::from_file(file.path()).unwrap();
        assert_eq!(config.window.window_ms, 6_000);
        assert_eq!(config.throttle.min_interval_ms, 800);
        assert_eq!(config.hue.base_url(), "https://10.0.0.5");
    }

    #[test]
    fn test_config_from_file_invalid() {
        let file = toml_file("[window]\nwindow_ms = 0\n");
        assert!(matches!(
            MoodlightConfig::from_file(file.path()),
            Err(ConfigError::Validation(_))
        ));

        let file = toml_file("[window\n");
        assert!(matches!(
            MoodlightConfig::from_file(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_config_to_toml_string_round_trip() {
        let mut config = MoodlightConfig::default();
        config.hue.light_ids = vec!["1".into()];
        config.hume.config_id = Some("cfg".into());
        let text = config.to_toml_string().unwrap();
        let parsed: MoodlightConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_layered_missing_files_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let missing = Some(missing.as_path());
        let config = MoodlightConfig::load_layered(missing, missing).unwrap();
        assert_eq!(config.window.window_ms, MoodlightConfig::default().window.window_ms);
    }

    #[test]
    fn test_load_layered_user_file_wins() {
        let defaults = toml_file("[throttle]\nmin_interval_ms = 500\n");
        let user = toml_file("[throttle]\nmin_interval_ms = 1200\n");
        let config =
            MoodlightConfig::load_layered(Some(defaults.path()), Some(user.path())).unwrap();
        assert_eq!(config.throttle.min_interval_ms, 1_200);
    }
}
