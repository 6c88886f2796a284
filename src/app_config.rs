//! Application configuration loading and merging for the CLI.
//!
//! Priority, highest first: CLI flags, config file, built-in defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use ff_downloader_core::config::{MAX_WORKERS, MIN_WORKERS};
use ff_downloader_core::{DEFAULT_LINKS_FILE, DownloaderConfig, default_output_dir};

use crate::cli::Args;

/// TOML-style file configuration (`key = value` lines).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default output directory for downloads.
    pub output_dir: Option<PathBuf>,
    /// Default links file.
    pub links_file: Option<PathBuf>,
    /// Default worker count (same range as CLI).
    pub workers: Option<u8>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Landing-page timeout in seconds.
    pub page_timeout_secs: Option<u64>,
    /// File request timeout in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// Host whose direct links are extracted.
    pub direct_host: Option<String>,
    /// Path segment marking direct-download URLs.
    pub direct_segment: Option<String>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers
            && !(MIN_WORKERS..=MAX_WORKERS).contains(&usize::from(workers))
        {
            bail!(
                "Invalid config value for `workers`: {workers}. Expected range: {MIN_WORKERS}..={MAX_WORKERS}"
            );
        }
        validate_timeout_secs("page_timeout_secs", self.page_timeout_secs)?;
        validate_timeout_secs("fetch_timeout_secs", self.fetch_timeout_secs)?;
        validate_non_empty("user_agent", self.user_agent.as_deref())?;
        validate_non_empty("direct_host", self.direct_host.as_deref())?;
        validate_non_empty("direct_segment", self.direct_segment.as_deref())?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: Option<&str>) -> Result<()> {
    if value.is_some_and(|v| v.trim().is_empty()) {
        bail!("Invalid config value for `{field}`: must not be empty");
    }
    Ok(())
}

/// Settings for one run, after merging all sources.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Library configuration handed to the engine.
    pub config: DownloaderConfig,
    /// Links file to read.
    pub links_file: PathBuf,
}

/// Merges CLI flags over file config over defaults.
#[must_use]
pub fn build_run_settings(args: &Args, file: &FileConfig) -> RunSettings {
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| file.output_dir.clone())
        .unwrap_or_else(default_output_dir);
    let links_file = args
        .links_file
        .clone()
        .or_else(|| file.links_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LINKS_FILE));

    let mut config = DownloaderConfig::new(output_dir);
    if let Some(workers) = args.workers.or(file.workers) {
        config = config.with_workers(usize::from(workers));
    }
    if let Some(user_agent) = args.user_agent.as_ref().or(file.user_agent.as_ref()) {
        config = config.with_user_agent(user_agent.clone());
    }
    if let Some(secs) = args.page_timeout.or(file.page_timeout_secs) {
        config = config.with_page_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.fetch_timeout.or(file.fetch_timeout_secs) {
        config = config.with_fetch_timeout(Duration::from_secs(secs));
    }
    if let Some(host) = args.direct_host.as_ref().or(file.direct_host.as_ref()) {
        config = config.with_direct_host(host.clone());
    }
    if let Some(segment) = args
        .direct_segment
        .as_ref()
        .or(file.direct_segment.as_ref())
    {
        config = config.with_direct_segment(segment.clone());
    }

    RunSettings { config, links_file }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/ff-downloader/config.toml`
/// 2. `$HOME/.config/ff-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("ff-downloader")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("ff-downloader")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional: a missing file
/// yields an empty config.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return load_file_config(path);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "links_file" => {
                cfg.links_file = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "workers" => {
                cfg.workers = Some(parse_integer_u8(value).with_context(context)?);
            }
            "user_agent" => {
                cfg.user_agent = Some(parse_string_literal(value).with_context(context)?);
            }
            "page_timeout_secs" => {
                cfg.page_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "fetch_timeout_secs" => {
                cfg.fetch_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "direct_host" => {
                cfg.direct_host = Some(parse_string_literal(value).with_context(context)?);
            }
            "direct_segment" => {
                cfg.direct_segment = Some(parse_string_literal(value).with_context(context)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<u16>()?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    Ok(token.parse::<u64>()?)
}
