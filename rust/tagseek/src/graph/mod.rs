pub mod builder;
pub mod path;
pub mod traversal;

pub use builder::{
    EdgeId,
    MassGapEdge,
    MassGapGraph,
    ResidueMatch,
};
pub use path::{
    TagPath,
    TagSignature,
};
pub use traversal::{
    PathWalker,
    WalkOutcome,
};
