use anyhow::{Context, Result};
use cifold_config::{GitlabArgs, ReporterConfig, load_config};
use cifold_console::ConsolePrinter;
use cifold_ids::{SectionIdSource, SequentialSectionIds, UuidSectionIds};
use cifold_ingest_jsonl::JsonlEventSource;
use cifold_logging::{LogFormat, LogLevel, LoggingConfig};
use cifold_ports::EventSource;
use cifold_reporter::GitlabReporter;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cifold")]
#[command(
    about = "Replay scenario runs as GitLab CI logs with collapsible sections.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a recorded run (JSONL events) as a CI log.
    Render {
        /// JSONL file, one run event per line.
        #[arg(long)]
        events: PathBuf,
        /// Reporter config file (YAML, or JSON by extension). Flags override it.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the log here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Disable ANSI colors.
        #[arg(long)]
        plain: bool,
        /// Number sections `section-1`, `section-2`, ... instead of random ids.
        #[arg(long)]
        deterministic_ids: bool,
        /// Diagnostics level (stderr). RUST_LOG takes precedence.
        #[arg(long, default_value = "warn")]
        log_level: LogLevel,
        /// Diagnostics format: plain, compact or json.
        #[arg(long, default_value = "plain")]
        log_format: LogFormat,
        /// Omit timestamps from diagnostics.
        #[arg(long)]
        log_without_time: bool,
        #[command(flatten)]
        gitlab: GitlabArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Render {
            events,
            config,
            output,
            plain,
            deterministic_ids,
            log_level,
            log_format,
            log_without_time,
            gitlab,
        } => {
            LoggingConfig::new()
                .with_level(log_level)
                .with_format(log_format)
                .with_timestamps(!log_without_time)
                .with_colors(!plain)
                .init()?;

            let file_config = match &config {
                Some(path) => load_config(path)?,
                None => ReporterConfig::default(),
            };
            let config = file_config.apply_args(&gitlab)?;

            let events = JsonlEventSource::new(events).events()?;
            tracing::info!(events = events.len(), "replaying run");

            let out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("create {path:?}"))?,
                )),
                None => Box::new(BufWriter::new(io::stdout())),
            };
            let printer = ConsolePrinter::new(out)
                .with_colors(!plain)
                .with_timings(config.show_timings);
            let section_ids: Box<dyn SectionIdSource> = if deterministic_ids {
                Box::new(SequentialSectionIds::default())
            } else {
                Box::new(UuidSectionIds)
            };

            let mut reporter =
                GitlabReporter::with_section_ids(printer, section_ids).with_config(config);
            reporter.replay(&events)?;
            reporter
                .into_printer()
                .into_inner()
                .flush()
                .context("flush output")?;

            if let Some(path) = output {
                tracing::info!(path = ?path, "wrote log");
            }
        }
    }

    Ok(())
}
