//! De novo sequence tags from deconvoluted spectra.
//!
//! Peaks whose mass differences match amino acid residue masses are linked
//! into a graph, every bounded path through it is scored, and the best
//! scoring tags are reported together with the residue strings they spell.
//!
//! ```
//! use tagseek::{PeakList, TagFinder, TagFinderConfig};
//!
//! let finder = TagFinder::new(TagFinderConfig::default()).unwrap();
//! let result = finder.find_tags(&PeakList::default());
//! assert!(result.tags.is_empty());
//! ```
pub mod config;
pub mod errors;
pub mod finder;
pub mod graph;
pub mod models;
pub mod scoring;
pub mod sequences;

pub use config::TagFinderConfig;
pub use errors::{
    ConfigError,
    DataProcessingError,
    TagSeekError,
};
pub use finder::{
    TagFinder,
    TagSearchResult,
    TagSearchStats,
};
pub use graph::{
    MassGapGraph,
    PathWalker,
    TagPath,
    TagSignature,
};
pub use models::{
    MassTolerance,
    Peak,
    PeakList,
    Residue,
    ResidueTable,
    SequenceTag,
};
pub use scoring::{
    CandidateManager,
    TagScorer,
};
pub use sequences::{
    TagSequences,
    tag_strings,
};
