use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::auditor::DEFAULT_SCRIPT_URL;
use crate::core::ConformanceLevel;
use crate::report::ReportFormat;

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    pub ui: UiConfig,
    pub audit: AuditConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
    pub max_table_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditConfig {
    pub default_conformance: ConformanceLevel,
    pub script_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub default_format: ReportFormat,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            ui: UiConfig {
                color: true,
                max_table_rows: 20,
            },
            audit: AuditConfig {
                default_conformance: ConformanceLevel::AA,
                script_url: DEFAULT_SCRIPT_URL.to_string(),
            },
            report: ReportConfig {
                default_format: ReportFormat::All,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ui: Option<RawUiConfig>,
    audit: Option<RawAuditConfig>,
    report: Option<RawReportConfig>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
    max_table_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawAuditConfig {
    default_conformance: Option<ConformanceLevel>,
    script_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReportConfig {
    default_format: Option<ReportFormat>,
}

pub fn effective_home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("環境変数 HOME が設定されていません"))
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/a11yscan/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("設定ファイルの読み取りに失敗しました: {}", path.display()))?;
        let raw: RawConfig =
            toml::from_str(&s).context("設定ファイル(TOML)の解析に失敗しました")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(max_table_rows) = ui.max_table_rows {
            cfg.ui.max_table_rows = max_table_rows;
        }
    }

    if let Some(audit) = raw.audit {
        if let Some(default_conformance) = audit.default_conformance {
            cfg.audit.default_conformance = default_conformance;
        }
        if let Some(script_url) = audit.script_url {
            cfg.audit.script_url = script_url;
        }
    }

    if let Some(report) = raw.report {
        if let Some(default_format) = report.default_format {
            cfg.report.default_format = default_format;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("A11YSCAN_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "A11YSCAN_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("A11YSCAN_UI_MAX_TABLE_ROWS") {
        cfg.ui.max_table_rows = v
            .trim()
            .parse::<usize>()
            .with_context(|| "A11YSCAN_UI_MAX_TABLE_ROWS")?;
    }
    if let Ok(v) = std::env::var("A11YSCAN_AUDIT_DEFAULT_CONFORMANCE") {
        cfg.audit.default_conformance = v
            .parse::<ConformanceLevel>()
            .map_err(anyhow::Error::msg)
            .with_context(|| "A11YSCAN_AUDIT_DEFAULT_CONFORMANCE")?;
    }
    if let Ok(v) = std::env::var("A11YSCAN_AUDIT_SCRIPT_URL") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.audit.script_url = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("A11YSCAN_REPORT_DEFAULT_FORMAT") {
        cfg.report.default_format = v
            .parse::<ReportFormat>()
            .map_err(anyhow::Error::msg)
            .with_context(|| "A11YSCAN_REPORT_DEFAULT_FORMAT")?;
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!(
            "真偽値が不正です: {s}（true|false|1|0|yes|no|on|off を指定してください）"
        )),
    }
}
