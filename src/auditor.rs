use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::browser::{BrowserOptions, BrowserSession};
use crate::core::{AuditOutcome, AuditRecord, ConformanceLevel, ErrorRecord};
use crate::errors::{AuditError, InjectionError, NavigationError};

pub const DEFAULT_SCRIPT_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/axe-core/4.8.2/axe.min.js";

#[derive(Debug, Clone)]
pub struct AuditorOptions {
    pub headless: bool,
    pub timeout: Duration,
    pub script_url: String,
    pub show_progress: bool,
}

impl Default for AuditorOptions {
    fn default() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(10),
            script_url: DEFAULT_SCRIPT_URL.to_string(),
            show_progress: false,
        }
    }
}

pub struct Auditor {
    session: BrowserSession,
    opts: AuditorOptions,
}

impl Auditor {
    pub async fn launch(opts: AuditorOptions) -> Result<Self> {
        let session = BrowserSession::launch(&BrowserOptions {
            headless: opts.headless,
            ..BrowserOptions::default()
        })
        .await?;
        Ok(Self { session, opts })
    }

    pub fn timeout(&self) -> Duration {
        self.opts.timeout
    }

    pub async fn audit_url(&self, url: &str, level: ConformanceLevel) -> Result<AuditRecord> {
        let timestamp = now_rfc3339();

        self.session
            .goto(url)
            .await
            .map_err(|e| audit_error(url, e))?;

        let loaded = self
            .session
            .poll_until("document.readyState === 'complete'", self.opts.timeout)
            .await;
        if !loaded {
            return Err(NavigationError::new(url, self.opts.timeout).into());
        }

        self.inject_axe(url).await?;

        let results = self
            .session
            .evaluate_async(&axe_run_script(level))
            .await
            .map_err(|e| audit_error(url, e))?;

        AuditRecord::from_axe_results(url, timestamp, level.label(), &results)
            .map_err(|e| audit_error(url, e))
    }

    pub async fn audit_batch(
        &self,
        urls: &[String],
        level: ConformanceLevel,
    ) -> Vec<AuditOutcome> {
        let mut outcomes = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            let pb = if self.opts.show_progress {
                let pb = indicatif::ProgressBar::new_spinner();
                pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                pb.set_message(format!("監査中 ({}/{}) {url}", i + 1, urls.len()));
                pb.enable_steady_tick(Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };

            let outcome = match self.audit_url(url, level).await {
                Ok(record) => AuditOutcome::Audited(record),
                Err(err) => AuditOutcome::Failed(ErrorRecord {
                    url: url.clone(),
                    error: format!("{err:#}"),
                    timestamp: now_rfc3339(),
                }),
            };
            outcomes.push(outcome);

            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
        }

        outcomes
    }

    pub async fn shutdown(self) {
        self.session.shutdown().await;
    }

    async fn inject_axe(&self, url: &str) -> Result<()> {
        let loader = format!(
            "var script = document.createElement('script');\n\
             script.src = '{}';\n\
             document.head.appendChild(script);",
            self.opts.script_url
        );
        self.session
            .exec(&loader)
            .await
            .map_err(|e| audit_error(url, e))?;

        let available = self
            .session
            .poll_until("typeof axe !== 'undefined'", self.opts.timeout)
            .await;
        if !available {
            return Err(InjectionError::new(url, self.opts.timeout).into());
        }
        Ok(())
    }
}

fn axe_run_script(level: ConformanceLevel) -> String {
    let tags = serde_json::to_string(level.tags()).unwrap_or_else(|_| "[]".to_string());
    format!("axe.run({{ runOnly: {{ type: 'tag', values: {tags} }} }})")
}

fn audit_error(url: &str, err: anyhow::Error) -> anyhow::Error {
    AuditError::new(url, err).into()
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

pub fn output_filename(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let sanitized: String = stripped
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{sanitized}.json")
}

pub fn write_json_file(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!(
                    "出力ディレクトリを作成できませんでした: {}",
                    parent.display()
                )
            })?;
        }
    }
    let buf = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, buf)
        .with_context(|| format!("結果を書き込めませんでした: {}", path.display()))?;
    Ok(())
}
