mod accumulator;
pub mod candidates;
pub mod math;
pub mod ranking;
pub mod scorer;
pub mod timings;

pub(crate) use accumulator::{
    RootSearch,
    TraversalAccumulator,
};
pub use candidates::{
    CandidateManager,
    CandidatePool,
    RankedCandidate,
    ScoreStats,
    ScoreWeights,
    TagCandidate,
};
pub use math::MAX_SCORE;
pub use ranking::{
    RankingCache,
    WindowRanking,
};
pub use scorer::{
    TagScorer,
    TagScores,
};
pub use timings::TagSearchTimings;
