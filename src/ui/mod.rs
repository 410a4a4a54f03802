use anyhow::Error;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

use crate::core::{AuditOutcome, AuditRecord, Finding, Impact};
use crate::report::accessibility_score;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub max_table_rows: usize,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "エラー:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "原因:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "次に:");
    let _ = writeln!(
        stderr,
        "  - 詳細を見るには `--verbose` を付けて再実行してください"
    );
    let _ = writeln!(
        stderr,
        "  - 利用可能なコマンド/オプションは `a11yscan --help` を参照してください"
    );
}

pub fn print_audit_summary(record: &AuditRecord, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }

    let mut out = io::stdout().lock();
    let _ = writeln!(out, "監査サマリ: {}", record.url);
    let _ = writeln!(out, "- 基準: {}", record.conformance_level);
    let _ = writeln!(out, "- 違反: {}", record.summary.violations);
    let _ = writeln!(out, "- 合格: {}", record.summary.passes);
    let _ = writeln!(out, "- 要確認: {}", record.summary.incomplete);
    let _ = writeln!(out, "- 対象外: {}", record.summary.inapplicable);
    let _ = writeln!(
        out,
        "- アクセシビリティスコア: {:.1}%",
        accessibility_score(record.summary.passes, record.summary.violations)
    );

    if record.violations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "違反は見つかりませんでした。");
        return;
    }

    let total = record.violations.len();
    let rows = cfg.max_table_rows.min(total).max(1);

    let _ = writeln!(out);
    if total > rows {
        let _ = writeln!(out, "違反（{rows}件表示 / 全{total}件）:");
    } else {
        let _ = writeln!(out, "違反（{rows}件表示）:");
    }
    print_violations_table(&mut out, &record.violations, rows, cfg.color);
}

pub fn print_batch_summary(outcomes: &[AuditOutcome], cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }

    let mut out = io::stdout().lock();
    let _ = writeln!(out, "全体サマリ（{}件）:", outcomes.len());
    for outcome in outcomes {
        match outcome {
            AuditOutcome::Audited(record) => {
                let _ = writeln!(
                    out,
                    "- {}: {}件の違反",
                    record.url, record.summary.violations
                );
            }
            AuditOutcome::Failed(record) => {
                let _ = writeln!(out, "- {}: エラー - {}", record.url, record.error);
            }
        }
    }
}

fn print_violations_table(out: &mut dyn Write, violations: &[Finding], rows: usize, color: bool) {
    let label_impact = "インパクト";
    let label_count = "件数";
    let label_description = "説明";

    let impact_w = violations
        .iter()
        .take(rows)
        .map(|v| visible_width_ansi(v.impact_level().as_str()))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_impact));
    let count_w = violations
        .iter()
        .take(rows)
        .map(|v| visible_width_ansi(&v.nodes.len().to_string()))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_count));
    let description_w = visible_width_ansi(label_description).max(4);

    let _ = writeln!(
        out,
        "{}  {}  {}",
        pad_end_display(label_impact, impact_w),
        pad_start_display(label_count, count_w),
        label_description
    );
    let _ = writeln!(
        out,
        "{}  {}  {}",
        "-".repeat(impact_w),
        "-".repeat(count_w),
        "-".repeat(description_w)
    );

    for violation in violations.iter().take(rows) {
        let impact = pad_end_ansi(&format_impact(violation.impact_level(), color), impact_w);
        let count = pad_start_display(&violation.nodes.len().to_string(), count_w);
        let _ = writeln!(out, "{impact}  {count}  {}", violation.description);
    }
}

fn format_impact(impact: Impact, color: bool) -> String {
    let s = impact.as_str();
    if !color {
        return s.to_string();
    }

    let code = match impact {
        Impact::Critical => "31",
        Impact::Serious => "33",
        Impact::Moderate => "35",
        Impact::Minor => "32",
        Impact::Unknown => "90",
    };
    format!("\x1b[{code}m{s}\x1b[0m")
}

fn pad_end_ansi(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn pad_start_display(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{}{}", " ".repeat(width - w), s)
}

fn visible_width_ansi(s: &str) -> usize {
    let mut width: usize = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                let _ = chars.next();
                while let Some(ch2) = chars.next() {
                    if ch2 == 'm' {
                        break;
                    }
                }
                continue;
            }
        }
        width = width.saturating_add(UnicodeWidthChar::width(ch).unwrap_or(0));
    }
    width
}
