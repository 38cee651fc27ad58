mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tagseek::TagFinder;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Logs go to stderr so stdout only carries the JSON results
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();

    let config = config::with_cli_args(&args)?;
    info!("Parsed configuration: {:#?}", config);

    let finder = TagFinder::new(config)?;
    let spectra = processing::read_spectra(&args.spectra)?;
    let out = processing::process_spectra(&finder, spectra, args.chunk_size);
    processing::write_output(&out, std::io::stdout().lock(), args.pretty)?;

    Ok(())
}
