pub mod peak;
pub mod residue;
pub mod sequence_tag;
pub mod tolerance;

pub use peak::{
    Peak,
    PeakList,
};
pub use residue::{
    Residue,
    ResidueTable,
};
pub use sequence_tag::SequenceTag;
pub use tolerance::MassTolerance;
