use std::path::Path;
use tagseek::TagFinderConfig;

use crate::cli::Cli;
use crate::errors::CliError;

pub fn read_config_file(path: &Path) -> Result<TagFinderConfig, CliError> {
    let config = TagFinderConfig::from_json_file(path)?;
    Ok(config)
}

/// Loads the config file (if any) and applies the command line overrides.
pub fn with_cli_args(args: &Cli) -> Result<TagFinderConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => TagFinderConfig::default(),
    };

    if let Some(max_candidates) = args.max_candidates {
        config.max_candidates = max_candidates;
    }
    if let Some(max_tag_length) = args.max_tag_length {
        config.max_tag_length = max_tag_length;
        // Keep the pair consistent when only the upper bound is lowered
        config.min_tag_length = config.min_tag_length.min(max_tag_length);
    }

    config.validate().map_err(|e| CliError::Config {
        source: e.to_string(),
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> Cli {
        Cli {
            config: None,
            spectra: PathBuf::from("spectra.json"),
            max_candidates: None,
            max_tag_length: None,
            chunk_size: 512,
            pretty: false,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        let config = with_cli_args(&args()).unwrap();
        assert_eq!(config, TagFinderConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = with_cli_args(&Cli {
            max_candidates: Some(3),
            max_tag_length: Some(2),
            ..args()
        })
        .unwrap();
        assert_eq!(config.max_candidates, 3);
        assert_eq!(config.max_tag_length, 2);
        assert_eq!(config.min_tag_length, 2);
    }

    #[test]
    fn test_invalid_override() {
        let out = with_cli_args(&Cli {
            max_candidates: Some(0),
            ..args()
        });
        assert!(matches!(out, Err(CliError::Config { .. })));
    }

    #[test]
    fn test_missing_file() {
        let out = with_cli_args(&Cli {
            config: Some(PathBuf::from("/definitely/not/here.json")),
            ..args()
        });
        assert!(matches!(out, Err(CliError::Io { .. })));
    }
}
