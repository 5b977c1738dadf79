//! al-report — one-shot traffic and audience report for an access log.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use al_core::FileLogSource;
use al_report::cli::Cli;
use al_report::config::{LogOutput, OutputFormat, ReportConfig};
use al_report::prompt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ReportConfig::resolve(&cli)?;

    init_tracing(config.log_format);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        max_line_length = config.max_line_length,
        "al-report starting"
    );

    let source = FileLogSource;

    let path = match cli.path {
        Some(path) => path,
        None => {
            let stdin = std::io::stdin();
            match prompt::ask_path(&source, stdin.lock(), std::io::stdout()).await? {
                Some(path) => path,
                None => return Ok(()),
            }
        }
    };

    let report = al_report::run(&source, &path, &config).await?;

    match config.output {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn init_tracing(output: LogOutput) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match output {
        LogOutput::Pretty => builder.init(),
        LogOutput::Json => builder.json().init(),
    }
}
