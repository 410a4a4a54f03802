use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::auditor::{Auditor, AuditorOptions, output_filename, write_json_file};
use crate::core::ConformanceLevel;
use crate::report::{ReportFormat, ReportGenerator};
use crate::ui::UiConfig;

#[derive(Debug, Parser)]
#[command(
    name = "a11yscan",
    version,
    about = "ヘッドレスブラウザで axe-core を実行し、WCAG 2.2 アクセシビリティ監査とレポート生成を行う"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Audit(AuditArgs),
    Report(ReportArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[arg(required = true)]
    pub url: Vec<String>,
    #[arg(long, short = 'c')]
    pub conformance: Option<ConformanceLevel>,
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub visible: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    pub json_file: PathBuf,
    #[arg(long, short = 'f')]
    pub format: Option<ReportFormat>,
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::config::effective_home_dir()?;
    let env_config_path = std::env::var_os("A11YSCAN_CONFIG").map(PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;
    let ui_cfg = UiConfig {
        color,
        stdout_is_tty,
        stderr_is_tty,
        max_table_rows: cfg.ui.max_table_rows,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Audit(args) => {
            let level = args.conformance.unwrap_or(cfg.audit.default_conformance);
            if args.url.len() > 1 {
                if let Some(output) = &args.output {
                    if output.exists() && !output.is_dir() {
                        return Err(crate::exit::invalid_args(
                            "audit: 複数URLの --output にはディレクトリを指定してください",
                        ));
                    }
                }
            }

            let show_progress = ui_cfg.stderr_is_tty && !cli.quiet && !cli.json;
            let opts = AuditorOptions {
                headless: !args.visible,
                timeout: Duration::from_secs(cli.timeout),
                script_url: cfg.audit.script_url.clone(),
                show_progress,
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                let auditor = Auditor::launch(opts)
                    .await
                    .map_err(crate::exit::browser_failed_err)?;
                let result = run_audit(&auditor, &args, level, &ui_cfg, cli.json, show_progress).await;
                auditor.shutdown().await;
                result
            })?;
        }
        Commands::Report(args) => {
            if cli.json {
                return Err(crate::exit::invalid_args("report は --json と併用できません"));
            }
            run_report(args, cfg.report.default_format, &ui_cfg)?;
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "a11yscan", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    let stdout = std::io::stdout();
                    serde_json::to_writer_pretty(stdout.lock(), &cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: `a11yscan config --show` を使用してください");
            }
        }
    }

    Ok(())
}

async fn run_audit(
    auditor: &Auditor,
    args: &AuditArgs,
    level: ConformanceLevel,
    ui_cfg: &UiConfig,
    json: bool,
    show_progress: bool,
) -> Result<()> {
    if let [url] = args.url.as_slice() {
        let pb = if show_progress {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            pb.set_message(format!("監査中 {url}"));
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };
        let result = auditor.audit_url(url, level).await;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let record = result?;

        if let Some(output) = &args.output {
            write_json_file(output, &record)?;
            if !ui_cfg.quiet && !json {
                println!("結果を保存しました: {}", output.display());
            }
        }
        if json {
            write_json(&record)?;
        } else {
            crate::ui::print_audit_summary(&record, ui_cfg);
        }
        return Ok(());
    }

    let outcomes = auditor.audit_batch(&args.url, level).await;

    if let Some(output_dir) = &args.output {
        for outcome in &outcomes {
            let path = output_dir.join(output_filename(outcome.url()));
            write_json_file(&path, outcome)?;
        }
        if !ui_cfg.quiet && !json {
            println!("結果を保存しました: {}", output_dir.display());
        }
    }
    if json {
        write_json(&outcomes)?;
    } else {
        crate::ui::print_batch_summary(&outcomes, ui_cfg);
    }
    Ok(())
}

fn run_report(args: ReportArgs, default_format: ReportFormat, ui_cfg: &UiConfig) -> Result<()> {
    let generator =
        ReportGenerator::from_json_file(&args.json_file).map_err(crate::exit::invalid_args_err)?;

    match args.format.unwrap_or(default_format) {
        ReportFormat::Markdown => {
            let path = args
                .output
                .unwrap_or_else(|| PathBuf::from(crate::report::MARKDOWN_FILENAME));
            generator.write_markdown(&path)?;
            if !ui_cfg.quiet {
                println!("Markdown レポートを保存しました: {}", path.display());
            }
        }
        ReportFormat::Html => {
            let path = args
                .output
                .unwrap_or_else(|| PathBuf::from(crate::report::HTML_FILENAME));
            generator.write_html(&path)?;
            if !ui_cfg.quiet {
                println!("HTML レポートを保存しました: {}", path.display());
            }
        }
        ReportFormat::All => {
            let dir = args.output.unwrap_or_else(|| PathBuf::from("reports"));
            let (markdown_path, html_path) = generator.write_all(&dir)?;
            if !ui_cfg.quiet {
                println!("レポートを生成しました: {}", dir.display());
                println!("- Markdown: {}", markdown_path.display());
                println!("- HTML: {}", html_path.display());
            }
        }
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "未対応のシェルです: {other}（bash|zsh|fish を指定してください）"
        ))),
    }
}
