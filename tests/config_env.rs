// tests/config_env.rs
//
// Config loading and credential resolution through environment variables.
// Tests mutate process env, so they run serially.

use std::{env, fs};

use trend_prompt::config::app::{
    ENV_APIFY_API_TOKEN, ENV_APP_CONFIG_PATH, ENV_LIVEPEER_API_TOKEN, ENV_OPENAI_API_KEY,
};
use trend_prompt::config::AppConfig;
use trend_prompt::prompt::build_generator;
use trend_prompt::trends::TrendsProvider as _;
use trend_prompt::AppState;

fn clear_env() {
    for k in [
        ENV_APP_CONFIG_PATH,
        ENV_APIFY_API_TOKEN,
        ENV_LIVEPEER_API_TOKEN,
        ENV_OPENAI_API_KEY,
    ] {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn env_marker_reads_credentials() {
    clear_env();
    let cfg = AppConfig::from_toml_str("").unwrap();
    assert_eq!(cfg.trends.api_token(), None);
    assert_eq!(cfg.livepeer_token(), None);
    assert_eq!(cfg.openai_key(), None);

    env::set_var(ENV_APIFY_API_TOKEN, "apify-123");
    env::set_var(ENV_OPENAI_API_KEY, "  ");
    env::set_var(ENV_LIVEPEER_API_TOKEN, "lp-456");
    assert_eq!(cfg.trends.api_token().as_deref(), Some("apify-123"));
    assert_eq!(cfg.livepeer_token().as_deref(), Some("lp-456"));
    // Blank env value counts as unset.
    assert_eq!(cfg.openai_key(), None);

    assert_eq!(build_generator(&cfg).unwrap().provider_names(), vec!["livepeer"]);
    clear_env();
}

#[serial_test::serial]
#[test]
fn explicit_config_path_must_exist() {
    clear_env();
    env::set_var(ENV_APP_CONFIG_PATH, "/definitely/not/here/app.toml");
    assert!(AppConfig::load_default().is_err());
    clear_env();
}

#[serial_test::serial]
#[test]
fn explicit_config_path_is_loaded() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("app.toml");
    fs::write(
        &path,
        r#"
        [trends]
        fixture_path = "tests/fixtures/trends.json"

        [openai]
        model = "gpt-4o-mini"
        api_key = "sk-file"
        "#,
    )
    .unwrap();
    env::set_var(ENV_APP_CONFIG_PATH, path.display().to_string());

    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg.openai.model, "gpt-4o-mini");
    assert_eq!(cfg.openai.max_tokens, 59);

    // Fixture trends need no Apify token.
    let state = AppState::from_config(&cfg).unwrap();
    assert_eq!(state.trends.name(), "fixture");
    assert_eq!(state.generator.provider_names(), vec!["openai"]);
    clear_env();
}

#[serial_test::serial]
#[test]
fn apify_token_is_required_without_fixture() {
    clear_env();
    let cfg = AppConfig::from_toml_str("").unwrap();
    assert!(AppState::from_config(&cfg).is_err());

    env::set_var(ENV_APIFY_API_TOKEN, "apify-123");
    let state = AppState::from_config(&cfg).unwrap();
    assert_eq!(state.trends.name(), "apify");
    clear_env();
}
