//! Integration tests for concierge-bot.

use concierge_bot::health::{self, HealthResponse, HealthState};
use concierge_bot::{ticket_settings, BotError, ConciergeBot};
use concierge_common::test_utils::init_test_logging;
use concierge_config::{Config, ConfigLoader};

async fn spawn_health() -> String {
    let listener = health::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(health::serve(listener, HealthState::new()));
    format!("http://{addr}")
}

#[tokio::test]
async fn test_liveness_root() {
    init_test_logging();
    let base = spawn_health().await;

    let body = reqwest::get(format!("{base}/")).await.unwrap().text().await.unwrap();
    assert_eq!(body, "Bot is alive!");
}

#[tokio::test]
async fn test_health_reports_uptime() {
    let base = spawn_health().await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert!(response.status().is_success());
    let health: HealthResponse = response.json().await.unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.uptime_seconds < 60);
}

#[tokio::test]
async fn test_missing_token_is_fatal() {
    let config = ConfigLoader::parse("discord:\n  token: \"   \"\n").unwrap();
    let bot = ConciergeBot::new(config);
    let err = bot.start().await.unwrap_err();
    assert!(matches!(err, BotError::MissingToken));
    assert!(err.to_string().starts_with("No Discord token found"));
}

#[test]
fn test_ticket_settings_defaults() {
    let settings = ticket_settings(&Config::default());
    assert_eq!(settings.inactivity_threshold, chrono::Duration::hours(24));
    assert_eq!(settings.sweep_interval.as_secs(), 3600);
}
