use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{AuditRecord, Finding, Impact};
use crate::errors::SchemaError;

pub const MAX_NODES_SHOWN: usize = 5;
pub const MAX_SNIPPET_CHARS: usize = 200;
pub const HELP_URL_FALLBACK: &str = "（URLなし）";

pub const MARKDOWN_FILENAME: &str = "report.md";
pub const HTML_FILENAME: &str = "report.html";

pub const IMPACT_COLORS: [(Impact, &str); 4] = [
    (Impact::Critical, "#d32f2f"),
    (Impact::Serious, "#f57c00"),
    (Impact::Moderate, "#fbc02d"),
    (Impact::Minor, "#7cb342"),
];

pub const PRINCIPLES: [(&str, &str); 4] = [
    (
        "知覚可能（Perceivable）",
        "情報とユーザーインターフェースの構成要素は、利用者が知覚できる方法で提示できなければならない。",
    ),
    (
        "操作可能（Operable）",
        "ユーザーインターフェースの構成要素とナビゲーションは操作可能でなければならない。",
    ),
    (
        "理解可能（Understandable）",
        "情報とユーザーインターフェースの操作は理解可能でなければならない。",
    ),
    (
        "堅牢（Robust）",
        "コンテンツは、支援技術を含む多様なユーザーエージェントが解釈できる程度に堅牢でなければならない。",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Markdown,
    Html,
    All,
}

impl ReportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
            ReportFormat::All => "all",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            "all" => Ok(ReportFormat::All),
            _ => Err(format!(
                "出力形式が不正です: {s}（markdown|html|all を指定してください）"
            )),
        }
    }
}

pub fn accessibility_score(passes: usize, violations: usize) -> f64 {
    let total = passes + violations;
    if total == 0 {
        return 0.0;
    }
    passes as f64 / total as f64 * 100.0
}

pub struct ReportGenerator {
    record: AuditRecord,
}

impl ReportGenerator {
    pub fn new(record: AuditRecord) -> Result<Self> {
        validate(&record)?;
        Ok(Self { record })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| {
            format!(
                "監査結果ファイルを読み取れませんでした: {}",
                path.display()
            )
        })?;
        Self::from_json_str(&s)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| SchemaError::new(format!("JSON を解析できませんでした: {e}")))?;
        for field in ["url", "timestamp", "summary"] {
            if value.get(field).is_none() {
                return Err(
                    SchemaError::new(format!("必須フィールドがありません: {field}")).into(),
                );
            }
        }
        let record: AuditRecord = serde_json::from_value(value)
            .map_err(|e| SchemaError::new(format!("監査レコードを解析できませんでした: {e}")))?;
        Self::new(record)
    }

    pub fn record(&self) -> &AuditRecord {
        &self.record
    }

    pub fn markdown(&self) -> String {
        use std::fmt::Write as _;

        let record = &self.record;
        let mut out = String::new();

        let _ = writeln!(out, "# アクセシビリティ監査レポート");
        let _ = writeln!(out);
        let _ = writeln!(out, "- URL: {}", record.url);
        let _ = writeln!(out, "- 日時: {}", record.timestamp);
        let _ = writeln!(out, "- 基準: {}", record.conformance_level);
        let _ = writeln!(out);

        let _ = writeln!(out, "## サマリ");
        let _ = writeln!(out);
        let _ = writeln!(out, "- 違反: {}", record.summary.violations);
        let _ = writeln!(out, "- 合格: {}", record.summary.passes);
        let _ = writeln!(out, "- 要確認: {}", record.summary.incomplete);
        let _ = writeln!(out, "- 対象外: {}", record.summary.inapplicable);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**アクセシビリティスコア:** {:.1}%",
            accessibility_score(record.summary.passes, record.summary.violations)
        );
        let _ = writeln!(out);

        if record.violations.is_empty() {
            let _ = writeln!(out, "## 🎉 違反は見つかりませんでした！");
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "このページは指定した適合レベルの WCAG 2.2 チェックをすべて満たしています。"
            );
        } else {
            let _ = writeln!(out, "## インパクト別の違反");
            let _ = writeln!(out);
            for (impact, group) in violations_by_impact(&record.violations) {
                let _ = writeln!(out, "- {impact}: {}件", group.len());
            }
            let _ = writeln!(out);

            let _ = writeln!(out, "## 違反の詳細 ({})", record.violations.len());
            let _ = writeln!(out);
            for violation in &record.violations {
                write_violation_markdown(&mut out, violation);
            }
        }

        if !record.incomplete.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## 要確認 ({})", record.incomplete.len());
            let _ = writeln!(out);
            let _ = writeln!(out, "手動での確認が必要な項目です:");
            let _ = writeln!(out);
            for item in &record.incomplete {
                let _ = writeln!(
                    out,
                    "- **{}**（{}件）",
                    item.description,
                    item.nodes.len()
                );
            }
        }

        out
    }

    pub fn html(&self) -> String {
        use std::fmt::Write as _;

        let record = &self.record;
        let score = accessibility_score(record.summary.passes, record.summary.violations);
        let mut out = String::new();

        let _ = write!(
            out,
            r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>アクセシビリティ監査レポート - {title}</title>
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{
  font-family: -apple-system, BlinkMacSystemFont, 'Hiragino Sans', 'Segoe UI', Roboto, sans-serif;
  line-height: 1.6;
  color: #333;
  max-width: 1200px;
  margin: 0 auto;
  padding: 20px;
  background: #f5f5f5;
}}
.header {{
  background: white;
  padding: 30px;
  border-radius: 8px;
  margin-bottom: 20px;
  box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}}
h1 {{ color: #1a73e8; margin-bottom: 10px; }}
h2 {{ margin: 20px 0 10px; }}
.meta {{ color: #666; font-size: 14px; }}
.summary {{
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 15px;
  margin-bottom: 20px;
}}
.summary-card {{
  background: white;
  padding: 20px;
  border-radius: 8px;
  box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}}
.summary-card h3 {{ font-size: 14px; color: #666; margin-bottom: 5px; }}
.summary-card .number {{ font-size: 32px; font-weight: bold; }}
.violations-count {{ color: #d32f2f; }}
.passes-count {{ color: #388e3c; }}
.score {{
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  color: white;
  padding: 30px;
  border-radius: 8px;
  text-align: center;
  margin-bottom: 20px;
}}
.score .number {{ font-size: 48px; font-weight: bold; }}
.violation {{
  background: white;
  padding: 20px;
  margin-bottom: 15px;
  border-radius: 8px;
  border-left: 4px solid #999;
  box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}}
.violation[data-impact="critical"] {{ border-left-color: #d32f2f; }}
.violation[data-impact="serious"] {{ border-left-color: #f57c00; }}
.violation[data-impact="moderate"] {{ border-left-color: #fbc02d; }}
.violation[data-impact="minor"] {{ border-left-color: #7cb342; }}
.violation-header {{
  display: flex;
  justify-content: space-between;
  align-items: start;
  margin-bottom: 10px;
}}
.violation-header h3 {{ flex: 1; margin-right: 10px; }}
.impact-badge {{
  padding: 4px 12px;
  border-radius: 4px;
  color: white;
  font-size: 12px;
  font-weight: bold;
  text-transform: uppercase;
}}
.violation-meta {{
  color: #666;
  font-size: 14px;
  margin-bottom: 15px;
}}
.violation-meta span {{ margin-right: 20px; }}
details {{ margin-top: 15px; }}
summary {{
  cursor: pointer;
  color: #1a73e8;
  font-weight: 500;
  padding: 5px 0;
}}
.nodes {{ margin-top: 10px; }}
.node {{
  background: #f5f5f5;
  padding: 10px;
  margin: 10px 0;
  border-radius: 4px;
}}
.target {{
  display: block;
  color: #d32f2f;
  font-weight: bold;
  margin-bottom: 5px;
}}
pre {{
  background: #263238;
  color: #aed581;
  padding: 10px;
  border-radius: 4px;
  overflow-x: auto;
  font-size: 12px;
}}
.no-violations {{
  background: white;
  padding: 40px;
  text-align: center;
  border-radius: 8px;
  box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}}
.no-violations h2 {{ color: #388e3c; font-size: 32px; }}
.review, .principles {{
  background: white;
  padding: 20px;
  border-radius: 8px;
  margin-bottom: 20px;
  box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}}
.review li {{ margin-left: 20px; }}
.principles dt {{ font-weight: bold; margin-top: 10px; }}
.principles dd {{ color: #666; margin-left: 0; }}
</style>
</head>
<body>
<div class="header">
<h1>アクセシビリティ監査レポート</h1>
<div class="meta">
<p><strong>URL:</strong> {url}</p>
<p><strong>日時:</strong> {timestamp}</p>
<p><strong>基準:</strong> {conformance}</p>
</div>
</div>
<div class="summary">
<div class="summary-card"><h3>違反</h3><div class="number violations-count">{violations}</div></div>
<div class="summary-card"><h3>合格</h3><div class="number passes-count">{passes}</div></div>
<div class="summary-card"><h3>要確認</h3><div class="number">{incomplete}</div></div>
<div class="summary-card"><h3>対象外</h3><div class="number">{inapplicable}</div></div>
</div>
<div class="score">
<div class="number">{score:.1}%</div>
<p>アクセシビリティスコア</p>
</div>
"#,
            title = escape_html(&record.url),
            url = escape_html(&record.url),
            timestamp = escape_html(&record.timestamp),
            conformance = escape_html(&record.conformance_level),
            violations = record.summary.violations,
            passes = record.summary.passes,
            incomplete = record.summary.incomplete,
            inapplicable = record.summary.inapplicable,
            score = score,
        );

        if record.violations.is_empty() {
            let _ = writeln!(
                out,
                "<div class=\"no-violations\">\n<h2>🎉 違反は見つかりませんでした！</h2>\n<p>このページは指定した適合レベルの WCAG 2.2 チェックをすべて満たしています。</p>\n</div>"
            );
        } else {
            let _ = writeln!(out, "<h2>違反</h2>");
            for (impact, group) in violations_by_impact(&record.violations) {
                let _ = writeln!(out, "<h3>{impact}（{}件）</h3>", group.len());
                for violation in group {
                    write_violation_html(&mut out, violation);
                }
            }
        }

        if !record.incomplete.is_empty() {
            let _ = writeln!(
                out,
                "<div class=\"review\">\n<h2>要確認（{}件）</h2>\n<p>手動での確認が必要な項目です:</p>\n<ul>",
                record.incomplete.len()
            );
            for item in &record.incomplete {
                let _ = writeln!(
                    out,
                    "<li><strong>{}</strong>（{}件）</li>",
                    escape_html(&item.description),
                    item.nodes.len()
                );
            }
            let _ = writeln!(out, "</ul>\n</div>");
        }

        let _ = writeln!(out, "<div class=\"principles\">\n<h2>WCAG の4原則</h2>\n<dl>");
        for (name, description) in PRINCIPLES {
            let _ = writeln!(out, "<dt>{name}</dt>\n<dd>{description}</dd>");
        }
        let _ = writeln!(out, "</dl>\n</div>\n</body>\n</html>");

        out
    }

    pub fn write_markdown(&self, path: &Path) -> Result<()> {
        write_text(path, &self.markdown())
    }

    pub fn write_html(&self, path: &Path) -> Result<()> {
        write_text(path, &self.html())
    }

    pub fn write_all(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir).with_context(|| {
            format!("出力ディレクトリを作成できませんでした: {}", dir.display())
        })?;
        let markdown_path = dir.join(MARKDOWN_FILENAME);
        let html_path = dir.join(HTML_FILENAME);
        self.write_markdown(&markdown_path)?;
        self.write_html(&html_path)?;
        Ok((markdown_path, html_path))
    }
}

fn validate(record: &AuditRecord) -> Result<()> {
    let checks = [
        (
            "violations",
            record.summary.violations,
            record.violations.len(),
        ),
        ("passes", record.summary.passes, record.passes.len()),
        (
            "incomplete",
            record.summary.incomplete,
            record.incomplete.len(),
        ),
        (
            "inapplicable",
            record.summary.inapplicable,
            record.inapplicable.len(),
        ),
    ];
    for (name, declared, actual) in checks {
        if declared != actual {
            return Err(SchemaError::new(format!(
                "summary.{name} が件数と一致しません（summary={declared}, 実際={actual}）"
            ))
            .into());
        }
    }
    Ok(())
}

fn write_violation_markdown(out: &mut String, violation: &Finding) {
    use std::fmt::Write as _;

    let nodes_count = violation.nodes.len();

    let _ = writeln!(out, "### {}", violation.description);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "- インパクト: {}",
        violation.impact_level().as_str().to_uppercase()
    );
    let _ = writeln!(out, "- インスタンス: {nodes_count}件");
    let _ = writeln!(out, "- WCAG: {}", violation.tags.join(", "));
    let _ = writeln!(out, "- ヘルプ: {}", violation.help);
    let _ = writeln!(
        out,
        "- 修正方法: {}",
        violation.help_url.as_deref().unwrap_or(HELP_URL_FALLBACK)
    );

    if nodes_count > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "対象要素（{nodes_count}件）:");
        let _ = writeln!(out);
        for (i, node) in violation.nodes.iter().take(MAX_NODES_SHOWN).enumerate() {
            let _ = writeln!(out, "{}. `{}`", i + 1, node.display_target());
            write_fenced_code_block(out, "   ", "html", &truncate_snippet(&node.html));
        }
        if nodes_count > MAX_NODES_SHOWN {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "*…残り{}件のインスタンス*",
                nodes_count - MAX_NODES_SHOWN
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(out);
}

fn write_violation_html(out: &mut String, violation: &Finding) {
    use std::fmt::Write as _;

    let impact = violation.impact_level();
    let nodes_count = violation.nodes.len();

    let _ = writeln!(out, "<div class=\"violation\" data-impact=\"{impact}\">");
    let _ = writeln!(out, "<div class=\"violation-header\">");
    let _ = writeln!(out, "<h3>{}</h3>", escape_html(&violation.description));
    let _ = writeln!(
        out,
        "<span class=\"impact-badge\" style=\"background-color: {};\">{impact}</span>",
        impact_color(impact)
    );
    let _ = writeln!(out, "</div>");
    let _ = writeln!(out, "<div class=\"violation-meta\">");
    let _ = writeln!(out, "<span>インスタンス: {nodes_count}件</span>");
    let _ = writeln!(
        out,
        "<span>WCAG: {}</span>",
        escape_html(&violation.tags.join(", "))
    );
    let _ = writeln!(out, "</div>");
    let _ = writeln!(
        out,
        "<p><strong>ヘルプ:</strong> {}</p>",
        escape_html(&violation.help)
    );
    match violation.help_url.as_deref() {
        Some(url) => {
            let _ = writeln!(
                out,
                "<p><strong>修正方法:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener\">解説を見る</a></p>",
                escape_html(url)
            );
        }
        None => {
            let _ = writeln!(out, "<p><strong>修正方法:</strong> {HELP_URL_FALLBACK}</p>");
        }
    }

    if nodes_count > 0 {
        let _ = writeln!(
            out,
            "<details><summary>対象要素を表示（{nodes_count}件）</summary><div class=\"nodes\">"
        );
        for node in violation.nodes.iter().take(MAX_NODES_SHOWN) {
            let _ = writeln!(out, "<div class=\"node\">");
            let _ = writeln!(
                out,
                "<code class=\"target\">{}</code>",
                escape_html(node.display_target())
            );
            let _ = writeln!(
                out,
                "<pre><code>{}</code></pre>",
                escape_html(&truncate_snippet(&node.html))
            );
            let _ = writeln!(out, "</div>");
        }
        if nodes_count > MAX_NODES_SHOWN {
            let _ = writeln!(
                out,
                "<p><em>…残り{}件のインスタンス</em></p>",
                nodes_count - MAX_NODES_SHOWN
            );
        }
        let _ = writeln!(out, "</div></details>");
    }

    let _ = writeln!(out, "</div>");
}

fn violations_by_impact(violations: &[Finding]) -> Vec<(Impact, Vec<&Finding>)> {
    Impact::NAMED
        .iter()
        .map(|&impact| {
            let group: Vec<&Finding> = violations
                .iter()
                .filter(|v| v.impact_level() == impact)
                .collect();
            (impact, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

fn impact_color(impact: Impact) -> &'static str {
    IMPACT_COLORS
        .iter()
        .find(|(i, _)| *i == impact)
        .map(|(_, color)| *color)
        .unwrap_or("#999")
}

fn truncate_snippet(html: &str) -> String {
    if html.chars().count() <= MAX_SNIPPET_CHARS {
        return html.to_string();
    }
    let head: String = html.chars().take(MAX_SNIPPET_CHARS).collect();
    format!("{head}...")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_fenced_code_block(out: &mut String, indent: &str, lang: &str, content: &str) {
    use std::fmt::Write as _;

    let _ = writeln!(out, "{indent}```{lang}");
    for line in content.lines() {
        let _ = writeln!(out, "{indent}{line}");
    }
    let _ = writeln!(out, "{indent}```");
}

fn write_text(path: &Path, content: &str) -> Result<()> {
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
    std::fs::write(path, content)
        .with_context(|| format!("レポートを書き込めませんでした: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AuditSummary, FindingNode};

    fn finding(description: &str, impact: Option<&str>, node_count: usize) -> Finding {
        Finding {
            description: description.to_string(),
            help: format!("{description} を修正してください"),
            help_url: Some("https://dequeuniversity.com/rules/axe/4.8/sample".to_string()),
            impact: impact.map(str::to_string),
            tags: vec!["wcag2a".to_string(), "wcag21a".to_string()],
            nodes: (0..node_count)
                .map(|i| FindingNode {
                    target: vec![format!("#node-{i}")],
                    html: format!("<div id=\"node-{i}\"></div>"),
                })
                .collect(),
        }
    }

    fn record_with(violations: Vec<Finding>, passes_len: usize, incomplete: Vec<Finding>) -> AuditRecord {
        let passes: Vec<Finding> = (0..passes_len)
            .map(|i| finding(&format!("pass-{i}"), None, 0))
            .collect();
        AuditRecord {
            url: "https://example.com".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            conformance_level: "WCAG 2.2 Level AA".to_string(),
            summary: AuditSummary {
                violations: violations.len(),
                passes: passes.len(),
                incomplete: incomplete.len(),
                inapplicable: 0,
            },
            violations,
            passes,
            incomplete,
            inapplicable: vec![],
        }
    }

    #[test]
    fn score_is_the_pass_rate_and_zero_without_applicable_checks() {
        assert_eq!(accessibility_score(0, 0), 0.0);
        assert_eq!(accessibility_score(8, 2), 80.0);
        assert_eq!(accessibility_score(0, 5), 0.0);
    }

    #[test]
    fn snippet_of_exactly_200_chars_is_not_truncated() {
        let snippet = "a".repeat(MAX_SNIPPET_CHARS);
        assert_eq!(truncate_snippet(&snippet), snippet);
    }

    #[test]
    fn snippet_of_201_chars_keeps_200_and_appends_ellipsis() {
        let snippet = "a".repeat(MAX_SNIPPET_CHARS + 1);
        let truncated = truncate_snippet(&snippet);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), MAX_SNIPPET_CHARS + 3);
        assert!(truncated.starts_with(&"a".repeat(MAX_SNIPPET_CHARS)));
    }

    #[test]
    fn markdown_caps_affected_elements_at_five_with_a_more_note() {
        let record = record_with(vec![finding("見出しの順序が不正", Some("moderate"), 7)], 0, vec![]);
        let md = ReportGenerator::new(record).expect("generator").markdown();

        assert!(md.contains("#node-4"));
        assert!(!md.contains("#node-5"));
        assert!(md.contains("*…残り2件のインスタンス*"));
    }

    #[test]
    fn markdown_shows_all_elements_without_a_note_when_under_the_cap() {
        let record = record_with(vec![finding("コントラスト不足", Some("serious"), 3)], 0, vec![]);
        let md = ReportGenerator::new(record).expect("generator").markdown();

        assert!(md.contains("#node-2"));
        assert!(!md.contains("…残り"));
    }

    #[test]
    fn zero_violations_render_a_celebration_block_in_both_formats() {
        let record = record_with(vec![], 4, vec![]);
        let generator = ReportGenerator::new(record).expect("generator");

        let md = generator.markdown();
        assert!(md.contains("🎉 違反は見つかりませんでした！"));
        assert!(!md.contains("## インパクト別の違反"));
        assert!(!md.contains("## 違反の詳細"));

        let html = generator.html();
        assert!(html.contains("no-violations"));
        assert!(!html.contains("<h3>critical"));
        assert!(!html.contains("<h3>serious"));
    }

    #[test]
    fn impact_buckets_keep_the_fixed_severity_order() {
        let record = record_with(
            vec![
                finding("minor-v", Some("minor"), 1),
                finding("critical-v", Some("critical"), 1),
                finding("serious-v", Some("serious"), 1),
            ],
            0,
            vec![],
        );
        let html = ReportGenerator::new(record).expect("generator").html();

        let critical = html.find("<h3>critical").expect("critical heading");
        let serious = html.find("<h3>serious").expect("serious heading");
        let minor = html.find("<h3>minor").expect("minor heading");
        assert!(critical < serious);
        assert!(serious < minor);
    }

    #[test]
    fn unknown_impact_is_counted_but_excluded_from_named_buckets() {
        let record = record_with(
            vec![
                finding("no-impact-v", None, 1),
                finding("minor-v", Some("minor"), 1),
            ],
            0,
            vec![],
        );
        let generator = ReportGenerator::new(record).expect("generator");

        let md = generator.markdown();
        assert!(md.contains("- 違反: 2"));
        assert!(md.contains("- minor: 1件"));
        assert!(!md.contains("- unknown:"));
        assert!(md.contains("### no-impact-v"));
        assert!(md.contains("- インパクト: UNKNOWN"));

        let html = generator.html();
        assert!(!html.contains("<h3>unknown"));
    }

    #[test]
    fn missing_help_url_falls_back_instead_of_failing() {
        let mut violation = finding("alt-missing", Some("critical"), 1);
        violation.help_url = None;
        let record = record_with(vec![violation], 0, vec![]);
        let md = ReportGenerator::new(record).expect("generator").markdown();

        assert!(md.contains("- 修正方法: （URLなし）"));
    }

    #[test]
    fn incomplete_findings_render_as_a_manual_review_section() {
        let record = record_with(
            vec![finding("v", Some("minor"), 1)],
            0,
            vec![finding("色のコントラストを確認", None, 4)],
        );
        let md = ReportGenerator::new(record).expect("generator").markdown();

        assert!(md.contains("## 要確認 (1)"));
        assert!(md.contains("- **色のコントラストを確認**（4件）"));
    }

    #[test]
    fn html_escapes_page_supplied_snippets() {
        let mut violation = finding("inline-script", Some("critical"), 0);
        violation.nodes = vec![FindingNode {
            target: vec!["body > script".to_string()],
            html: "<script>alert('x')</script>".to_string(),
        }];
        let record = record_with(vec![violation], 0, vec![]);
        let html = ReportGenerator::new(record).expect("generator").html();

        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn from_json_str_rejects_missing_required_fields() {
        let err = ReportGenerator::from_json_str(r#"{ "timestamp": "t", "summary": {} }"#)
            .err()
            .expect("missing url should fail");
        let schema = err
            .downcast_ref::<SchemaError>()
            .expect("schema error expected");
        assert!(schema.message.contains("url"));
    }

    #[test]
    fn from_json_str_rejects_a_summary_that_disagrees_with_the_lists() {
        let err = ReportGenerator::from_json_str(
            r#"{
                "url": "https://example.com",
                "timestamp": "2026-01-01T00:00:00Z",
                "conformance_level": "WCAG 2.2 Level AA",
                "summary": { "violations": 3, "passes": 0, "incomplete": 0, "inapplicable": 0 },
                "violations": [],
                "passes": [],
                "incomplete": [],
                "inapplicable": []
            }"#,
        )
        .err()
        .expect("count mismatch should fail");
        let schema = err
            .downcast_ref::<SchemaError>()
            .expect("schema error expected");
        assert!(schema.message.contains("violations"));
    }

    #[test]
    fn write_all_creates_the_directory_and_fixed_filenames() {
        use std::sync::atomic::{AtomicU64, Ordering};
        static DIR_SEQ: AtomicU64 = AtomicU64::new(0);

        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "a11yscan-report-test-{}-{seq}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        let record = record_with(vec![], 1, vec![]);
        let generator = ReportGenerator::new(record).expect("generator");
        let (md_path, html_path) = generator.write_all(&dir).expect("write all");

        assert_eq!(md_path, dir.join("report.md"));
        assert_eq!(html_path, dir.join("report.html"));
        assert!(md_path.exists());
        assert!(html_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
