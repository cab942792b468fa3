// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use workbook_tui::ViewOptions;

pub const APP_NAME: &str = "workbook";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_DELAY: &str = "1500ms";
const DEFAULT_DISPATCH_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub submission: Submission,
    #[serde(default)]
    pub dispatch: Dispatch,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            submission: Submission::default(),
            dispatch: Dispatch::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub delay: Option<String>,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            delay: Some(DEFAULT_DELAY.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dispatch {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Dispatch {
    fn default() -> Self {
        Self {
            enabled: Some(false),
            endpoint: None,
            timeout: Some(DEFAULT_DISPATCH_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub smooth_scroll: Option<bool>,
    pub show_progress: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            smooth_scroll: Some(true),
            show_progress: Some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("WORKBOOK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set WORKBOOK_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [submission], [dispatch], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(delay) = &self.submission.delay {
            parse_duration(delay)
                .with_context(|| format!("submission.delay in {}", path.display()))?;
        }

        if let Some(timeout) = &self.dispatch.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("dispatch.timeout in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!(
                    "dispatch.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if self.dispatch_enabled() {
            let endpoint = self.dispatch.endpoint.as_deref().ok_or_else(|| {
                anyhow!(
                    "[dispatch] is enabled in {} but dispatch.endpoint is missing",
                    path.display()
                )
            })?;
            workbook_dispatch::parse_endpoint(endpoint)?;
        }

        EnvFilter::try_new(self.log_level()).with_context(|| {
            format!(
                "log.level {:?} in {} is not a valid filter (try \"info\" or \"workbook_app=debug\")",
                self.log_level(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn submission_delay(&self) -> Result<Duration> {
        parse_duration(self.submission.delay.as_deref().unwrap_or(DEFAULT_DELAY))
    }

    pub fn dispatch_enabled(&self) -> bool {
        self.dispatch.enabled.unwrap_or(false)
    }

    pub fn dispatch_endpoint(&self) -> Option<&str> {
        self.dispatch.endpoint.as_deref()
    }

    pub fn dispatch_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.dispatch
                .timeout
                .as_deref()
                .unwrap_or(DEFAULT_DISPATCH_TIMEOUT),
        )
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            smooth_scroll: self.ui.smooth_scroll.unwrap_or(true),
            show_progress: self.ui.show_progress.unwrap_or(true),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].path in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("workbook.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# workbook config\n# Place this file at: {}\n\nversion = 1\n\n[submission]\n# How long the submit button stays in \"Processing...\"\ndelay = \"{}\"\n\n[dispatch]\n# Disabled means the summary request is simulated locally.\nenabled = false\n# endpoint = \"https://mail.example.com/hooks/workbook\"\ntimeout = \"{}\"\n\n[ui]\nsmooth_scroll = true\nshow_progress = true\n\n[log]\n# Overridden by WORKBOOK_LOG when set.\nlevel = \"{}\"\n# path = \"/absolute/path/to/workbook.log\"\n",
            path.display(),
            DEFAULT_DELAY,
            DEFAULT_DISPATCH_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 1500ms or 10s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::Duration;
    use workbook_testkit::{temp_config_path, write_temp_config};

    fn load_error(content: &str) -> Result<String> {
        let (_temp, path) = write_temp_config(content)?;
        let error = Config::load(&path).expect_err("config should be rejected");
        Ok(format!("{error:#}"))
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let (_temp, path) = temp_config_path()?;
        let config = Config::load(&path)?;
        assert_eq!(config.version, 1);
        assert_eq!(config.submission_delay()?, workbook_app::SUBMISSION_DELAY);
        assert!(!config.dispatch_enabled());
        assert!(config.view_options().smooth_scroll);
        assert!(config.view_options().show_progress);
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_temp_config(
            r#"
version = 1

[submission]
delay = "250ms"

[dispatch]
enabled = true
endpoint = "http://127.0.0.1:9000/hook"
timeout = "3s"

[ui]
smooth_scroll = false
show_progress = false

[log]
level = "debug"
path = "/tmp/wb.log"
"#,
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.submission_delay()?, Duration::from_millis(250));
        assert!(config.dispatch_enabled());
        assert_eq!(
            config.dispatch_endpoint(),
            Some("http://127.0.0.1:9000/hook")
        );
        assert_eq!(config.dispatch_timeout()?, Duration::from_secs(3));
        assert!(!config.view_options().smooth_scroll);
        assert!(!config.view_options().show_progress);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/wb.log"));
        Ok(())
    }

    #[test]
    fn rejected_configs_explain_the_fix() -> Result<()> {
        let cases = [
            ("[ui]\nsmooth_scroll = false\n", "Add `version = 1`"),
            ("version = 2\n", "unsupported config version 2"),
            ("version = ", "parse TOML config"),
            (
                "version = 1\n[dispatch]\nenabled = true\n",
                "dispatch.endpoint is missing",
            ),
            (
                "version = 1\n[dispatch]\nenabled = true\nendpoint = \"ftp://x\"\n",
                "http or https",
            ),
            ("version = 1\n[dispatch]\ntimeout = \"0s\"\n", "must be positive"),
            ("version = 1\n[submission]\ndelay = \"fast\"\n", "submission.delay"),
            (
                "version = 1\n[log]\nlevel = \"workbook=loud\"\n",
                "not a valid filter",
            ),
        ];
        for (content, expected) in cases {
            let message = load_error(content)?;
            assert!(
                message.contains(expected),
                "{content:?}: expected {expected:?} in {message:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn disabled_dispatch_ignores_endpoint() -> Result<()> {
        let (_temp, path) = write_temp_config(
            "version = 1\n[dispatch]\nenabled = false\nendpoint = \"nonsense\"\n",
        )?;
        let config = Config::load(&path)?;
        assert!(!config.dispatch_enabled());
        Ok(())
    }

    #[test]
    fn durations_accept_ms_seconds_and_minutes_only() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        for bad in ["soon", "5h", "ms", "-1s"] {
            let error = parse_duration(bad).expect_err("duration should be rejected");
            assert!(format!("{error:#}").contains("invalid duration"), "{bad}");
        }
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let (_temp, override_path) = temp_config_path()?;
        // SAFETY: no other test reads WORKBOOK_CONFIG_PATH.
        unsafe {
            std::env::set_var("WORKBOOK_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path();
        // SAFETY: see above.
        unsafe {
            std::env::remove_var("WORKBOOK_CONFIG_PATH");
        }
        assert_eq!(resolved?, override_path);
        Ok(())
    }

    #[test]
    fn example_config_loads_with_default_values() -> Result<()> {
        let (_temp, path) = temp_config_path()?;
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.submission_delay()?, Duration::from_millis(1500));
        assert_eq!(config.dispatch_timeout()?, Duration::from_secs(10));
        assert!(!config.dispatch_enabled());
        Ok(())
    }
}
