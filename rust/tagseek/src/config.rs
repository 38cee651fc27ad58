use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;

use crate::errors::{
    ConfigError,
    TagSeekError,
};
use crate::models::{
    MassTolerance,
    Residue,
    ResidueTable,
};
use crate::scoring::ScoreWeights;

fn default_max_tag_length() -> usize {
    8
}

fn default_min_tag_length() -> usize {
    4
}

fn default_max_candidates() -> usize {
    100
}

fn default_weight() -> f64 {
    1.0
}

fn default_cell_width() -> f64 {
    0.01
}

fn default_parallel() -> bool {
    true
}

/// Settings for a [`crate::TagFinder`].
///
/// Every field has a default, so `{}` is a valid JSON configuration.
///
/// ```
/// use tagseek::{MassTolerance, TagFinderConfig};
///
/// let config: TagFinderConfig =
///     serde_json::from_str(r#"{"tolerance": {"da": 0.02}, "max_tag_length": 5}"#).unwrap();
/// assert_eq!(config.tolerance, MassTolerance::Absolute(0.02));
/// assert_eq!(config.max_tag_length, 5);
/// assert_eq!(config.max_candidates, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagFinderConfig {
    #[serde(default)]
    pub tolerance: MassTolerance,
    #[serde(default = "default_max_tag_length")]
    pub max_tag_length: usize,
    /// Paths with fewer residues are never reported.
    #[serde(default = "default_min_tag_length")]
    pub min_tag_length: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_weight")]
    pub rank_sum_weight: f64,
    #[serde(default = "default_weight")]
    pub hypergeometric_weight: f64,
    /// Width (Da) of the cells used by the hypergeometric score.
    #[serde(default = "default_cell_width")]
    pub cell_width: f64,
    /// Extra residues (e.g. modified amino acids) added to the standard 20.
    #[serde(default)]
    pub custom_residues: Vec<Residue>,
    /// Stop walking a spectrum once this many paths were emitted.
    #[serde(default)]
    pub max_paths_per_spectrum: Option<usize>,
    /// Walk the roots of a spectrum on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for TagFinderConfig {
    fn default() -> Self {
        Self {
            tolerance: MassTolerance::default(),
            max_tag_length: default_max_tag_length(),
            min_tag_length: default_min_tag_length(),
            max_candidates: default_max_candidates(),
            rank_sum_weight: default_weight(),
            hypergeometric_weight: default_weight(),
            cell_width: default_cell_width(),
            custom_residues: Vec::new(),
            max_paths_per_spectrum: None,
            parallel: default_parallel(),
        }
    }
}

impl TagFinderConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    ///
    /// The result is not validated, so callers can still override fields
    /// before building a [`crate::TagFinder`].
    pub fn from_json_file(path: &Path) -> crate::errors::Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| TagSeekError::Io {
            source,
            path: Some(path.to_path_buf()),
        })?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tag_length == 0
            || self.min_tag_length == 0
            || self.min_tag_length > self.max_tag_length
        {
            return Err(ConfigError::InvalidTagLength {
                min: self.min_tag_length,
                max: self.max_tag_length,
            });
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::InvalidMaxCandidates(self.max_candidates));
        }

        let weights_ok = [self.rank_sum_weight, self.hypergeometric_weight]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
            && (self.rank_sum_weight + self.hypergeometric_weight) > 0.0;
        if !weights_ok {
            return Err(ConfigError::InvalidWeights {
                rank_sum: self.rank_sum_weight,
                hypergeometric: self.hypergeometric_weight,
            });
        }

        if !self.cell_width.is_finite() || self.cell_width <= 0.0 {
            return Err(ConfigError::InvalidCellWidth(self.cell_width));
        }
        self.tolerance.validate()?;
        self.residue_table()?;
        Ok(())
    }

    /// Standard residues plus `custom_residues`.
    pub fn residue_table(&self) -> Result<ResidueTable, ConfigError> {
        if self.custom_residues.is_empty() {
            return Ok(ResidueTable::standard());
        }
        ResidueTable::standard().with_custom_residues(self.custom_residues.iter().copied())
    }

    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            rank_sum: self.rank_sum_weight,
            hypergeometric: self.hypergeometric_weight,
        }
    }
}
