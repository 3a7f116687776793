use chrono::Datelike;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{Bucket, MonthCode};

/// URL left in place by the sheet deployment template; never fetched.
pub const PLACEHOLDER_URL: &str = "PUT_YOUR_WEB_APP_URL_HERE";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Browse a spreadsheet-backed expense ledger by month and category
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sheet-ledger",
    about = "Browse a spreadsheet-backed expense ledger by month and category",
    version
)]
pub struct Settings {
    /// Web-app URL that returns the sheet rows as a JSON array
    #[arg(long, env = "SHEET_LEDGER_URL")]
    pub source_url: Option<String>,

    /// Read records from a local .json or .jsonl file instead of the URL
    #[arg(long)]
    pub source_file: Option<PathBuf>,

    /// Month to show (1-12, "03", "3월"); "auto" picks the current month
    #[arg(long, default_value = "auto", value_parser = parse_month_arg)]
    pub month: String,

    /// Category bucket
    #[arg(long, value_enum, default_value_t = Bucket::All)]
    pub bucket: Bucket,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Request timeout for the URL source in seconds (1-120)
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..=120))]
    pub timeout_secs: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

/// Where the session's raw records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Http { url: String, timeout: Duration },
    File(PathBuf),
    /// No usable source; the session goes straight to empty.
    Unconfigured,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.sheet-ledger/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<Bucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".sheet-ledger").join("last_used.json")
    }

    /// Load persisted params, or `Default` when the file is absent or broken.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, fill unset values from the last run, resolve
    /// `"auto"` and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        if !is_arg_explicitly_set(&matches, "source_url") && settings.source_url.is_none() {
            settings.source_url = last.source_url;
        }
        if !is_arg_explicitly_set(&matches, "month") {
            if let Some(v) = last.month.filter(|m| m.parse::<MonthCode>().is_ok()) {
                settings.month = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "bucket") {
            if let Some(v) = last.bucket {
                settings.bucket = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!(error = %e, "could not persist last-used settings");
        }

        settings
    }

    /// Resolve the `"auto"` month and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.month == "auto" {
            let current = chrono::Local::now().month();
            settings.month = format!("{:02}", current);
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The selected month. Falls back to January if the value was never
    /// resolved.
    pub fn selected_month(&self) -> MonthCode {
        self.month
            .parse()
            .ok()
            .or_else(|| MonthCode::new(1))
            .unwrap_or(MonthCode::UNKNOWN)
    }

    /// Record source chosen by the flags. A local file wins over a URL.
    pub fn source_config(&self) -> SourceConfig {
        if let Some(path) = &self.source_file {
            return SourceConfig::File(path.clone());
        }

        match self.source_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() && url != PLACEHOLDER_URL => SourceConfig::Http {
                url: url.to_string(),
                timeout: Duration::from_secs(self.timeout_secs),
            },
            _ => SourceConfig::Unconfigured,
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            source_url: s.source_url.clone(),
            month: Some(s.month.clone()),
            bucket: Some(s.bucket),
            format: Some(s.format.clone()),
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// Accepts `"auto"` or any readable month, normalized to two digits.
fn parse_month_arg(value: &str) -> Result<String, String> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok("auto".to_string());
    }
    value
        .parse::<MonthCode>()
        .map(|m| m.as_str().to_string())
        .map_err(|e| e.to_string())
}

/// `true` when `name` came from the command line or the environment rather
/// than a default.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine) | Some(clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
