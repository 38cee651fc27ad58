use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file (defaults are used when missing)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to a JSON array of spectra: [{"id": "...", "peaks": [[mass, intensity], ...]}]
    #[arg(short, long)]
    pub spectra: PathBuf,

    /// Maximum number of tags reported per spectrum (will over-write the config file)
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Maximum number of residues per tag (will over-write the config file)
    #[arg(long)]
    pub max_tag_length: Option<usize>,

    /// Number of spectra handed to the search at a time
    #[arg(long, default_value_t = 512)]
    pub chunk_size: usize,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pub pretty: bool,
}
