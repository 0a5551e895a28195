//! # Structured Logging Module
//!
//! Environment-aware structured logging for dispatch operations. Console
//! output is human-readable by default and JSON when
//! `WORKFLOW_LOG_FORMAT=json`.

use crate::constants::env_vars;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = std::env::var(env_vars::LOG_FORMAT)
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A subscriber may already be installed by the embedding engine
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    normalize_environment(
        &std::env::var(env_vars::ENVIRONMENT)
            .or_else(|_| std::env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string()),
    )
}

/// Environment names compare case-insensitively, as in configuration loading
fn normalize_environment(raw: &str) -> String {
    raw.to_lowercase()
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for a dispatched workflow operation
pub fn log_dispatch_operation(
    operation: &str,
    command: &str,
    element_id: Option<&str>,
    instance_key: Option<&str>,
    mode: &str,
    status: &str,
) {
    tracing::info!(
        operation = %operation,
        command = %command,
        element_id = element_id,
        instance_key = instance_key,
        mode = %mode,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "DISPATCH_OPERATION"
    );
}

/// Log structured data for a signal broadcast
pub fn log_broadcast_operation(
    signal_ref: &str,
    origin: Option<&str>,
    excluded: usize,
    status: &str,
) {
    tracing::info!(
        signal_ref = %signal_ref,
        origin = origin,
        excluded = excluded,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "SIGNAL_BROADCAST"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
