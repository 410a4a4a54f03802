use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

fn a11yscan_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_a11yscan"));
    cmd.env("HOME", home);
    cmd.env_remove("A11YSCAN_CONFIG");
    cmd.env_remove("A11YSCAN_UI_COLOR");
    cmd.env_remove("A11YSCAN_UI_MAX_TABLE_ROWS");
    cmd.env_remove("A11YSCAN_AUDIT_DEFAULT_CONFORMANCE");
    cmd.env_remove("A11YSCAN_AUDIT_SCRIPT_URL");
    cmd.env_remove("A11YSCAN_REPORT_DEFAULT_FORMAT");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    a11yscan_cmd(home).args(args).output().expect("run a11yscan")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);

    let temp = std::env::temp_dir();
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let uniq = format!("a11yscan-report-md-test-{}-{seq}", std::process::id());
    let home = temp.join(uniq);
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdirs");
    }
    std::fs::write(path, bytes).expect("write");
}

fn sample_audit_json() -> String {
    let long_snippet = "x".repeat(201);
    let exact_snippet = "y".repeat(200);
    let nodes: Vec<serde_json::Value> = (0..7)
        .map(|i| {
            serde_json::json!({
                "target": [format!("#btn-{i}")],
                "html": format!("<button id=\"btn-{i}\"></button>"),
            })
        })
        .collect();

    serde_json::json!({
        "url": "https://example.com",
        "timestamp": "2026-01-01T00:00:00Z",
        "conformance_level": "WCAG 2.2 Level AA",
        "summary": { "violations": 3, "passes": 8, "incomplete": 1, "inapplicable": 2 },
        "violations": [
            {
                "description": "画像に代替テキストがありません",
                "help": "img 要素に alt 属性を付与してください",
                "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/image-alt",
                "impact": "critical",
                "tags": ["wcag2a", "wcag111"],
                "nodes": [
                    { "target": ["#hero > img"], "html": long_snippet },
                    { "target": ["#footer > img"], "html": exact_snippet }
                ]
            },
            {
                "description": "ボタンに判別可能なテキストがありません",
                "help": "button 要素にテキストを持たせてください",
                "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/button-name",
                "impact": "serious",
                "tags": ["wcag2a", "wcag412"],
                "nodes": nodes
            },
            {
                "description": "インパクト不明の違反",
                "help": "詳細を確認してください",
                "tags": ["wcag2a"],
                "nodes": [
                    { "target": ["#misc"], "html": "<div id=\"misc\"></div>" }
                ]
            }
        ],
        "passes": [
            { "description": "p1" }, { "description": "p2" }, { "description": "p3" },
            { "description": "p4" }, { "description": "p5" }, { "description": "p6" },
            { "description": "p7" }, { "description": "p8" }
        ],
        "incomplete": [
            {
                "description": "色のコントラストを確認してください",
                "help": "前景色と背景色のコントラスト比を確認",
                "nodes": [
                    { "target": ["p"], "html": "<p>a</p>" },
                    { "target": ["span"], "html": "<span>b</span>" }
                ]
            }
        ],
        "inapplicable": [
            { "description": "n1" }, { "description": "n2" }
        ]
    })
    .to_string()
}

#[test]
fn report_markdown_renders_summary_score_and_violation_sections() {
    let home = make_temp_home();
    let input = home.join("audit.json");
    write_file(&input, sample_audit_json().as_bytes());
    let output = home.join("report.md");

    let out = run(
        &home,
        &[
            "report",
            input.to_str().expect("input path"),
            "--format",
            "markdown",
            "--output",
            output.to_str().expect("output path"),
        ],
    );
    assert!(
        out.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    let md = std::fs::read_to_string(&output).expect("read report");
    assert!(md.contains("# アクセシビリティ監査レポート"), "md={md}");
    assert!(md.contains("- URL: https://example.com"), "md={md}");
    assert!(md.contains("- 基準: WCAG 2.2 Level AA"), "md={md}");
    assert!(md.contains("- 違反: 3"), "md={md}");
    assert!(md.contains("- 合格: 8"), "md={md}");
    assert!(
        md.contains("**アクセシビリティスコア:** 72.7%"),
        "md={md}"
    );
    assert!(md.contains("- critical: 1件"), "md={md}");
    assert!(md.contains("- serious: 1件"), "md={md}");
    assert!(!md.contains("- unknown:"), "md={md}");
    assert!(md.contains("## 違反の詳細 (3)"), "md={md}");
    assert!(md.contains("### 画像に代替テキストがありません"), "md={md}");
    assert!(md.contains("- インパクト: CRITICAL"), "md={md}");
    assert!(md.contains("- WCAG: wcag2a, wcag111"), "md={md}");
    assert!(md.contains("### インパクト不明の違反"), "md={md}");
    assert!(md.contains("- 修正方法: （URLなし）"), "md={md}");

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn report_markdown_truncates_snippets_at_200_chars() {
    let home = make_temp_home();
    let input = home.join("audit.json");
    write_file(&input, sample_audit_json().as_bytes());
    let output = home.join("report.md");

    let out = run(
        &home,
        &[
            "report",
            input.to_str().expect("input path"),
            "--format",
            "markdown",
            "--output",
            output.to_str().expect("output path"),
        ],
    );
    assert!(out.status.success());

    let md = std::fs::read_to_string(&output).expect("read report");
    let truncated = format!("{}...", "x".repeat(200));
    assert!(md.contains(&truncated), "201-char snippet should be cut");
    assert!(!md.contains(&"x".repeat(201)), "no full 201-char snippet");
    assert!(md.contains(&"y".repeat(200)), "200-char snippet kept whole");
    assert!(!md.contains("y..."), "200-char snippet gets no ellipsis");

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn report_markdown_caps_nodes_at_five_and_lists_incomplete_items() {
    let home = make_temp_home();
    let input = home.join("audit.json");
    write_file(&input, sample_audit_json().as_bytes());
    let output = home.join("report.md");

    let out = run(
        &home,
        &[
            "report",
            input.to_str().expect("input path"),
            "--format",
            "markdown",
            "--output",
            output.to_str().expect("output path"),
        ],
    );
    assert!(out.status.success());

    let md = std::fs::read_to_string(&output).expect("read report");
    assert!(md.contains("#btn-4"), "md={md}");
    assert!(!md.contains("#btn-5"), "md={md}");
    assert!(md.contains("*…残り2件のインスタンス*"), "md={md}");
    assert!(md.contains("## 要確認 (1)"), "md={md}");
    assert!(
        md.contains("- **色のコントラストを確認してください**（2件）"),
        "md={md}"
    );

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn report_markdown_celebrates_when_there_are_no_violations() {
    let home = make_temp_home();
    let input = home.join("audit.json");
    write_file(
        &input,
        serde_json::json!({
            "url": "https://clean.example",
            "timestamp": "2026-01-01T00:00:00Z",
            "conformance_level": "WCAG 2.2 Level AAA",
            "summary": { "violations": 0, "passes": 4, "incomplete": 0, "inapplicable": 0 },
            "violations": [],
            "passes": [
                { "description": "p1" }, { "description": "p2" },
                { "description": "p3" }, { "description": "p4" }
            ],
            "incomplete": [],
            "inapplicable": []
        })
        .to_string()
        .as_bytes(),
    );
    let output = home.join("report.md");

    let out = run(
        &home,
        &[
            "report",
            input.to_str().expect("input path"),
            "--format",
            "markdown",
            "--output",
            output.to_str().expect("output path"),
        ],
    );
    assert!(out.status.success());

    let md = std::fs::read_to_string(&output).expect("read report");
    assert!(md.contains("🎉 違反は見つかりませんでした！"), "md={md}");
    assert!(md.contains("**アクセシビリティスコア:** 100.0%"), "md={md}");
    assert!(!md.contains("## インパクト別の違反"), "md={md}");
    assert!(!md.contains("## 違反の詳細"), "md={md}");

    let _ = std::fs::remove_dir_all(&home);
}
