use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum DataProcessingError {
    ExpectedFiniteNonNanData {
        context: String,
    },
    ExpectedSortedData {
        context: String,
    },
}

/// Configuration mistakes, reported when a [`crate::TagFinder`] is built.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidTagLength { min: usize, max: usize },
    InvalidMaxCandidates(usize),
    InvalidWeights { rank_sum: f64, hypergeometric: f64 },
    InvalidCellWidth(f64),
    InvalidTolerance(f64),
    EmptyResidueTable,
    DuplicateResidue(char),
    InvalidResidueMass { symbol: char, mass: f64 },
    NominalMassOverflow { symbol: char, mass: f64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidTagLength { min, max } => write!(
                f,
                "Invalid tag length bounds: min_tag_length={} max_tag_length={} (need 1 <= min <= max)",
                min, max
            ),
            ConfigError::InvalidMaxCandidates(x) => {
                write!(f, "max_candidates must be at least 1, got {}", x)
            }
            ConfigError::InvalidWeights {
                rank_sum,
                hypergeometric,
            } => write!(
                f,
                "Score weights must be finite, non-negative and not both zero, got rank_sum={} hypergeometric={}",
                rank_sum, hypergeometric
            ),
            ConfigError::InvalidCellWidth(x) => {
                write!(f, "cell_width must be finite and positive, got {}", x)
            }
            ConfigError::InvalidTolerance(x) => {
                write!(f, "Mass tolerance must be finite and positive, got {}", x)
            }
            ConfigError::EmptyResidueTable => write!(f, "Residue table is empty"),
            ConfigError::DuplicateResidue(c) => {
                write!(f, "Residue '{}' is defined more than once", c)
            }
            ConfigError::InvalidResidueMass { symbol, mass } => {
                write!(f, "Residue '{}' has an invalid mass: {}", symbol, mass)
            }
            ConfigError::NominalMassOverflow { symbol, mass } => write!(
                f,
                "Residue '{}' with mass {} does not fit a single byte nominal mass",
                symbol, mass
            ),
        }
    }
}

#[derive(Debug)]
pub enum TagSeekError {
    Config(ConfigError),
    DataProcessingError(DataProcessingError),
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    ParseError {
        msg: String,
    },
}

impl std::fmt::Display for TagSeekError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagSeekError::Config(e) => write!(f, "Configuration error: {}", e),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for TagSeekError {}

pub type Result<T> = std::result::Result<T, TagSeekError>;

impl From<ConfigError> for TagSeekError {
    fn from(x: ConfigError) -> Self {
        Self::Config(x)
    }
}

impl From<DataProcessingError> for TagSeekError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessingError(x)
    }
}

impl From<serde_json::Error> for TagSeekError {
    fn from(val: serde_json::Error) -> Self {
        TagSeekError::ParseError {
            msg: val.to_string(),
        }
    }
}
