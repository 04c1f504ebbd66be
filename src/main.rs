use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use log2mermaid::app::{convert, Config, ConvertOptions};
use log2mermaid::Error;

/// log2mermaid - ログをMermaidシーケンス図に変換
#[derive(Parser)]
#[command(name = "log2mermaid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Echo each matched log line as a note (length capped by LOG2M_NOTE_MAX)
    #[arg(long)]
    note: bool,

    /// Rule table delimiter (overrides config file)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Write the diagram to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log file to scan
    log_file: PathBuf,

    /// Rule table (title,match,src,dst[,kind])
    rule_table: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let err = Error::Usage(e.render().to_string());
            eprint!("{}", err);
            return ExitCode::from(err.exit_code());
        }
    };

    // 設定を先に読み込む（ログ初期化前なので警告は後で出す）
    let (config, config_err) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(e) = init_logging(level) {
        eprintln!("Warning: {:#}", e);
    }
    if let Some(e) = config_err {
        warn!("Using default config: {:#}", e);
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Usage errors exit with 1, everything else with 2
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map_or(2, Error::exit_code)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {}", level))?;

    // stdoutは図の出力に使うのでログはstderrへ
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let options = ConvertOptions {
        delimiter: cli.delimiter.unwrap_or(config.delimiter),
        emit: config.emit_options(cli.note),
    };

    let diagram = convert(&cli.log_file, &cli.rule_table, &options)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &diagram)
                .with_context(|| format!("Failed to write diagram: {}", path.display()))?;
            info!("Diagram written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(diagram.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write diagram to stdout")?;
        }
    }

    Ok(())
}
