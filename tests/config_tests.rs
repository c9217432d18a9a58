use conference_bot::config::Config;
use std::env;
use std::sync::Mutex;

// Config tests share process-wide environment variables
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 9] = [
    "TELEGRAM_BOT_TOKEN",
    "TG_TOKEN",
    "DATABASE_URL",
    "HTTP_PORT",
    "ADMIN_TOKEN",
    "DISPLAY_UTC_OFFSET_HOURS",
    "REMINDER_LEAD_MINUTES",
    "PAYMENT_PROVIDER_TOKEN",
    "DONATION_CURRENCY",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("ADMIN_TOKEN", "secret");
    env::set_var("DISPLAY_UTC_OFFSET_HOURS", "-5");
    env::set_var("REMINDER_LEAD_MINUTES", "30");
    env::set_var("PAYMENT_PROVIDER_TOKEN", "provider");
    env::set_var("DONATION_CURRENCY", "eur");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token.as_deref(), Some("test_token_123"));
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.admin_token.as_deref(), Some("secret"));
    assert_eq!(config.display_utc_offset_hours, -5);
    assert_eq!(config.display_offset().local_minus_utc(), -5 * 3600);
    assert_eq!(config.reminder_lead_minutes, 30);
    assert_eq!(config.payment_provider_token.as_deref(), Some("provider"));
    assert_eq!(config.donation_currency, "EUR");

    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, None);
    assert_eq!(config.database_url, "sqlite:./data/conference.db");
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.admin_token, None);
    assert_eq!(config.display_utc_offset_hours, 3);
    assert_eq!(config.reminder_lead_minutes, 15);
    assert_eq!(config.payment_provider_token, None);
    assert_eq!(config.donation_currency, "RUB");
}

#[test]
fn test_config_token_fallback_and_empty_values() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "   ");
    env::set_var("TG_TOKEN", "fallback_token");
    env::set_var("ADMIN_TOKEN", "");

    let config = Config::from_env().unwrap();
    assert_eq!(config.telegram_bot_token.as_deref(), Some("fallback_token"));
    assert_eq!(config.admin_token, None);

    clear_env();
}

#[test]
fn test_config_invalid_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("HTTP_PORT", "invalid_port");

    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("Invalid HTTP_PORT"));

    clear_env();
}

#[test]
fn test_config_offset_out_of_range() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("DISPLAY_UTC_OFFSET_HOURS", "15");

    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("DISPLAY_UTC_OFFSET_HOURS must be between -12 and 14"));

    clear_env();
}

#[test]
fn test_config_reminder_lead_out_of_range() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("REMINDER_LEAD_MINUTES", "0");

    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("REMINDER_LEAD_MINUTES must be between 1 and 1440"));

    clear_env();
}
