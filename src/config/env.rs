//! Environment overrides applied on top of the config file.
//!
//! Variable names follow the function platform's conventions (`port`,
//! `read_timeout`, `write_timeout`, `basic_auth`, `secret_mount_path`).
//! Values that fail to parse are ignored and the file value is kept.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::schema::GatewayConfig;

/// Source of environment variables.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Apply every recognised override to `config`.
pub fn apply_env_overrides(config: &mut GatewayConfig, env: &dyn EnvSource) {
    if let Some(port) = parse_u16(env, "port") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(read) = parse_duration_ms(env, "read_timeout") {
        config.timeouts.read_ms = read;
    }

    if let Some(write) = parse_duration_ms(env, "write_timeout") {
        config.timeouts.write_ms = write;
    }

    if let Some(enabled) = parse_bool(env, "basic_auth") {
        config.auth.enabled = enabled;
    }

    if let Some(path) = env.get("secret_mount_path").filter(|p| !p.is_empty()) {
        config.auth.secret_mount_path = path;
    }
}

fn parse_u16(env: &dyn EnvSource, key: &str) -> Option<u16> {
    env.get(key)?.trim().parse().ok()
}

fn parse_bool(env: &dyn EnvSource, key: &str) -> Option<bool> {
    match env.get(key)?.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn parse_duration_ms(env: &dyn EnvSource, key: &str) -> Option<u64> {
    let raw = env.get(key)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // A bare integer is a number of seconds.
    let duration = match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => parse_duration_str(raw)?,
    };
    u64::try_from(duration.as_millis()).ok()
}

/// Parse strings such as `500ms`, `20s` or `1m30s`.
pub fn parse_duration_str(input: &str) -> Option<Duration> {
    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let value: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_secs = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];

        let part = Duration::try_from_secs_f64(value * unit_secs).ok()?;
        total = total.checked_add(part)?;
    }

    Some(total)
}
