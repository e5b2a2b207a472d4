// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pressroom.toml` > `~/.config/pressroom/pressroom.toml`
//! > `/etc/pressroom/pressroom.toml` with environment variable overrides via the
//! `PRESSROOM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PressroomConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/pressroom/pressroom.toml";
pub(crate) const LOCAL_CONFIG: &str = "pressroom.toml";

/// Top-level sections addressable from the environment.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "telegram",
    "anthropic",
    "linkedin",
    "rapid",
    "sources",
    "producer",
    "conversation",
    "suggestions",
];

/// Per-source sub-tables under `[sources]`.
const SOURCE_TABLES: &[&str] = &["arxiv", "google_news", "medium", "youtube", "manual"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pressroom/pressroom.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pressroom/pressroom.toml` (system-wide)
/// 3. `~/.config/pressroom/pressroom.toml` (user XDG config)
/// 4. `./pressroom.toml` (local directory)
/// 5. `PRESSROOM_*` environment variables
pub fn load_config() -> Result<PressroomConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PressroomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PressroomConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PressroomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PressroomConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PressroomConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `PRESSROOM_<SECTION>_<KEY>` to `section.key`.
///
/// Keys contain underscores, so only the section prefix is split off; a plain
/// `split("_")` would turn `telegram_bot_token` into `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("PRESSROOM_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        else {
            continue;
        };
        if *section == "sources" {
            for table in SOURCE_TABLES {
                if let Some(field) = rest.strip_prefix(table).and_then(|r| r.strip_prefix('_')) {
                    return format!("sources.{table}.{field}");
                }
            }
        }
        return format!("{section}.{rest}");
    }
    key.to_string()
}
