use chrono::{DateTime, Local, TimeZone};
use once_cell::sync::Lazy;
use std::fmt::Display;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("copilot-io")
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn runtime_handle() -> tokio::runtime::Handle {
    RUNTIME.handle().clone()
}

/// Install the `env_logger` backend. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

/// Prefix a scheme when the user typed a bare host. Loopback hosts get
/// plain http since the backend runs locally without TLS.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    let loopback = trimmed.starts_with("localhost")
        || trimmed.starts_with("127.")
        || trimmed.starts_with("[::1]");
    if loopback {
        format!("http://{}", trimmed)
    } else {
        format!("https://{}", trimmed)
    }
}

/// 24-hour `HH:MM`.
pub fn clock_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%H:%M").to_string()
}

pub fn now_clock() -> String {
    clock_time(&Local::now())
}
