// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mailtrace.toml` > `~/.config/mailtrace/mailtrace.toml`
//! > `/etc/mailtrace/mailtrace.toml` with environment variable overrides via
//! `MAILTRACE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MailtraceConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mailtrace/mailtrace.toml` (system-wide)
/// 3. `~/.config/mailtrace/mailtrace.toml` (user XDG config)
/// 4. `./mailtrace.toml` (local directory)
/// 5. `MAILTRACE_*` environment variables
pub fn load_config() -> Result<MailtraceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailtraceConfig::default()))
        .merge(Toml::file("/etc/mailtrace/mailtrace.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("mailtrace/mailtrace.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("mailtrace.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<MailtraceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailtraceConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MailtraceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailtraceConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `MAILTRACE_SMTP_FROM_ADDRESS`
/// must map to `smtp.from_address`, not `smtp.from.address`.
fn env_provider() -> Env {
    Env::prefixed("MAILTRACE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: MAILTRACE_SMTP_FROM_ADDRESS -> "smtp_from_address"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("smtp_", "smtp.", 1)
            .replacen("summarizer_", "summarizer.", 1);
        mapped.into()
    })
}
