use std::collections::{BTreeMap, HashMap};

use quill::config::{default_styles, QuillConfig};
use quill::providers::LocalClient;
use quill::styles::{StyleRegistry, TOPIC_PLACEHOLDER};
use quill::Error;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_registered_templates_have_one_placeholder()
{   let registry = StyleRegistry::default();
    for id in registry.style_ids()
    {   let template = registry.resolve(&id);
        assert_eq!(
          template.matches(TOPIC_PLACEHOLDER).count(), 1,
          "style {}", id
        );
    }
}

#[test]
fn test_unknown_style_falls_back()
{   let registry = StyleRegistry::default();
    let default = registry.resolve("blog_intro").to_string();
    for id in ["", "Tweet", "tweet ", "limerick", "blog-intro"]
    {   assert!(!registry.contains(id));
        assert_eq!(registry.resolve(id), default);
    }
}

#[test]
fn test_render()
{   let registry = StyleRegistry::default();
    assert_eq!(
      registry.render("tweet", "robots"),
      "Create a tweet (under 280 characters) about robots"
    );
    assert_eq!(
      registry.render("casual", "mondays"),
      "Write a casual message about mondays"
    );
}

#[test]
fn test_registry_rejects_bad_templates()
{   let mut styles = default_styles();
    styles.insert("broken".to_string(), "No placeholder".to_string());
    let err = assert_err!(StyleRegistry::new(styles, "blog_intro"));
    assert!(matches!(err, Error::InvalidConfiguration(_)));

    let mut styles = default_styles();
    styles.insert(
      "double".to_string(),
      "{topic} and {topic}".to_string()
    );
    assert_err!(StyleRegistry::new(styles, "blog_intro"));
}

#[test]
fn test_registry_requires_default_style()
{   let err = assert_err!(
      StyleRegistry::new(default_styles(), "sonnet")
    );
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_custom_registry()
{   let mut styles = BTreeMap::new();
    styles.insert("haiku".to_string(), "Write a haiku about {topic}".to_string());
    let registry = assert_ok!(StyleRegistry::new(styles, "haiku"));
    assert_eq!(registry.render("anything", "rain"), "Write a haiku about rain");
    assert_eq!(registry.style_ids(), vec!["haiku"]);
}

#[test]
fn test_config_defaults()
{   let config = QuillConfig::default();
    assert_eq!(
      config.backend_url,
      "http://127.0.0.1:1234/v1/chat/completions"
    );
    assert_eq!(config.default_model, "tinyllama");
    assert_eq!(config.default_style, "blog_intro");
    assert_eq!(config.timeout_secs, 60);
    assert_eq!(config.styles.len(), 5);
    assert!(config.audit_log_path().ends_with("generations.log"));
    assert_ok!(StyleRegistry::from_config(&config));
}

#[test]
fn test_config_env_overrides()
{   let env: HashMap<&str, &str> = [
      ("QUILL_BACKEND_URL", "http://localhost:9999/v1/chat/completions")
    , ("QUILL_DEFAULT_MODEL", "llama3")
    , ("QUILL_TIMEOUT_SECS", "15")
    , ("QUILL_LOG_DIR", "/tmp/quill-logs")
    , ("QUILL_LOG_TO_FILE", "true")
    ].into_iter().collect();

    let config = assert_ok!(QuillConfig::load_with(|key| {
      env.get(key).map(|v| v.to_string())
    }));
    assert_eq!(config.backend_url, "http://localhost:9999/v1/chat/completions");
    assert_eq!(config.default_model, "llama3");
    assert_eq!(config.timeout_secs, 15);
    assert!(config.log_to_file);
    assert_eq!(
      config.audit_log_path(),
      std::path::PathBuf::from("/tmp/quill-logs/generations.log")
    );
}

#[test]
fn test_config_rejects_bad_values()
{   let err = assert_err!(QuillConfig::load_with(|key| {
      (key == "QUILL_TIMEOUT_SECS").then(|| "soon".to_string())
    }));
    assert!(matches!(err, Error::InvalidConfiguration(_)));

    assert_err!(QuillConfig::load_with(|key| {
      (key == "QUILL_TIMEOUT_SECS").then(|| "0".to_string())
    }));
    assert_err!(QuillConfig::load_with(|key| {
      (key == "QUILL_LOG_TO_FILE").then(|| "maybe".to_string())
    }));
}

#[test]
fn test_config_file_keeps_missing_defaults()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quill.json");
    std::fs::write(
      &path,
      r#"{ "default_model": "qwen2",
           "styles": { "limerick": "Write a limerick about {topic}" },
           "default_style": "limerick" }"#
    ).unwrap();

    let path_str = path.to_string_lossy().to_string();
    let config = assert_ok!(QuillConfig::load_with(|key| {
      (key == "QUILL_CONFIG").then(|| path_str.clone())
    }));
    assert_eq!(config.default_model, "qwen2");
    assert_eq!(config.timeout_secs, 60);
    assert_eq!(config.styles.len(), 1);

    let registry = assert_ok!(StyleRegistry::from_config(&config));
    assert_eq!(
      registry.render("tweet", "cats"),
      "Write a limerick about cats"
    );
}

#[test]
fn test_config_file_errors()
{   let err = assert_err!(QuillConfig::from_file("/nonexistent/quill.json"));
    assert!(matches!(err, Error::InvalidConfiguration(_)));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert_err!(QuillConfig::from_file(&path));
}

#[test]
fn test_backend_client_from_config()
{   let client = assert_ok!(LocalClient::from_config(&QuillConfig::default()));
    assert_eq!(
      client.endpoint(),
      "http://127.0.0.1:1234/v1/chat/completions"
    );
    assert_eq!(client.timeout(), std::time::Duration::from_secs(60));

    let config = assert_ok!(QuillConfig::load_with(|key| {
      (key == "QUILL_TIMEOUT_SECS").then(|| "5".to_string())
    }));
    let client = assert_ok!(LocalClient::from_config(&config));
    assert_eq!(client.timeout(), std::time::Duration::from_secs(5));
}
