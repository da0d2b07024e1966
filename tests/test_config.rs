//! The shipped configuration file must load and describe a sane service.

use std::path::Path;

use qa_helper::config::{self, Overrides, DEFAULT_CONFIG_PATH};
use qa_helper::logger;

#[test]
fn default_config_loads() {
    let cfg = config::load_from(Path::new(DEFAULT_CONFIG_PATH), Overrides::default())
        .expect("config/default.toml should parse");
    assert_eq!(cfg.service_name, "AI Question-Answer Helper");
    assert_eq!(cfg.memory.max_messages, 10);
    assert_eq!(cfg.llm.provider, "groq");
    assert_eq!(cfg.llm.openai.max_tokens, 500);
    assert!((cfg.llm.openai.temperature - 0.7).abs() < f32::EPSILON);
}

#[test]
fn default_log_level_is_valid() {
    let cfg = config::load_from(Path::new(DEFAULT_CONFIG_PATH), Overrides::default()).unwrap();
    assert!(logger::parse_level(&cfg.log_level).is_ok());
}

#[test]
fn default_provider_needs_a_key() {
    let cfg = config::load_from(Path::new(DEFAULT_CONFIG_PATH), Overrides::default()).unwrap();
    assert!(qa_helper::llm::providers::build(&cfg.llm, None).is_err());
    assert!(qa_helper::llm::providers::build(&cfg.llm, Some("gsk-test".into())).is_ok());
}
