use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, error::ErrorKind};
use tracing_subscriber::EnvFilter;

use packet_carver::application::ExtractFilesUseCase;
use packet_carver::application::dto::ExtractionOptions;
use packet_carver::domain::repositories::{PayloadSource, WriteOptions};
use packet_carver::domain::services::{CancellationToken, CarvingEngine, SignatureCatalog};
use packet_carver::infrastructure::payload::{
    RawFilePayloadSource, TsharkConfig, TsharkPayloadSource,
};
use packet_carver::infrastructure::persistence::LocalFileWriter;
use packet_carver::presentation::cli::{Cli, ProgressReporter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.list_types {
        print_types();
        return Ok(());
    }

    let selection = cli.selected_types();
    if selection.is_empty() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "select at least one file type (--all or e.g. --jpg --pdf)",
            )
            .exit();
    }

    let Some(capture) = cli.capture.clone() else {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "a capture file is required")
            .exit();
    };

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;

    let engine = CarvingEngine::standard().with_cancellation(token);
    let options = ExtractionOptions::new(&cli.output).with_selection(selection);
    let options = if cli.manifest { options.with_manifest() } else { options };

    if cli.raw {
        run(RawFilePayloadSource, engine, &cli, &capture, &options)
    } else {
        let config = TsharkConfig::default().with_program(cli.tshark.as_str());
        let source = TsharkPayloadSource::new(config);
        run(source, engine, &cli, &capture, &options)
    }
}

fn run<P: PayloadSource>(
    source: P,
    engine: CarvingEngine,
    cli: &Cli,
    capture: &std::path::Path,
    options: &ExtractionOptions,
) -> Result<()> {
    let write_options = WriteOptions {
        overwrite: !cli.no_clobber,
        sync: cli.sync,
        ..WriteOptions::default()
    };
    let writer = LocalFileWriter::new(&options.output_dir, write_options).with_context(|| {
        format!("Failed to prepare output directory {}", options.output_dir.display())
    })?;

    let reporter = ProgressReporter::new();
    let on_progress = |event: &packet_carver::ProgressEvent| reporter.handle(event);

    let use_case = ExtractFilesUseCase::new(source, engine);
    let report = use_case
        .execute(capture, options, &writer, Some(&on_progress))
        .with_context(|| format!("Failed to extract files from {}", capture.display()))?;

    println!("\n{}", report.summary());
    Ok(())
}

fn print_types() {
    println!("{:<6} {:<16} {:<28} FOOTER", "ID", "NAME", "HEADER");
    println!("{}", "-".repeat(64));
    for signature in SignatureCatalog::standard().signatures() {
        let footer = signature
            .footer()
            .map(hex::encode_upper)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<16} {:<28} {}",
            signature.id(),
            signature.file_type().name(),
            hex::encode_upper(signature.header()),
            footer
        );
    }
}
