//! Accumulator for per-root traversal results.
//!
//! Each root of the mass-gap graph is walked and scored independently; this
//! module folds the per-root candidate sets back into one
//! [`CandidateManager`] per spectrum.

use super::candidates::CandidateManager;
use rayon::iter::{
    FromParallelIterator,
    IntoParallelIterator,
    ParallelIterator,
};

/// Candidates and bookkeeping produced by walking a single root.
#[derive(Debug, Clone)]
pub(crate) struct RootSearch {
    pub(crate) candidates: CandidateManager,
    pub(crate) num_paths: usize,
    pub(crate) aborted: bool,
}

/// Fold-reduce target for [`RootSearch`] items.
///
/// Threads fold roots into a local accumulator, then local accumulators are
/// merged pairwise. The merge is the same deduplication as
/// [`CandidateManager::add`], so no lock is needed.
#[derive(Debug, Default)]
pub(crate) struct TraversalAccumulator {
    pub(crate) candidates: Option<CandidateManager>,
    pub(crate) num_paths: usize,
    pub(crate) aborted: bool,
}

impl TraversalAccumulator {
    pub(crate) fn reduce(mut self, other: Self) -> Self {
        self.candidates = match (self.candidates, other.candidates) {
            (Some(left), Some(right)) => Some(left.merge(right)),
            (left, right) => left.or(right),
        };
        self.num_paths += other.num_paths;
        self.aborted |= other.aborted;
        self
    }

    pub(crate) fn fold(mut self, item: RootSearch) -> Self {
        self.candidates = Some(match self.candidates {
            Some(current) => current.merge(item.candidates),
            None => item.candidates,
        });
        self.num_paths += item.num_paths;
        self.aborted |= item.aborted;
        self
    }

    /// Final candidate set; `template` supplies limits when no root was
    /// walked.
    pub(crate) fn into_manager(self, template: CandidateManager) -> CandidateManager {
        self.candidates.unwrap_or(template)
    }
}

impl FromIterator<RootSearch> for TraversalAccumulator {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = RootSearch>,
    {
        iter.into_iter()
            .fold(TraversalAccumulator::default(), TraversalAccumulator::fold)
    }
}

impl FromParallelIterator<RootSearch> for TraversalAccumulator {
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = RootSearch>,
    {
        par_iter
            .into_par_iter()
            .fold(TraversalAccumulator::default, TraversalAccumulator::fold)
            .reduce(TraversalAccumulator::default, TraversalAccumulator::reduce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        EdgeId,
        TagPath,
        TagSignature,
    };
    use crate::scoring::{
        ScoreWeights,
        TagCandidate,
        TagScores,
    };
    use rayon::prelude::*;

    fn root_search(root: u8) -> RootSearch {
        let mut candidates = CandidateManager::new(3, ScoreWeights::default());
        for offset in 0..4u8 {
            let score = (root as f64) + offset as f64 * 0.5;
            candidates.add(TagCandidate::new(
                TagPath::new(vec![EdgeId(root as usize)]),
                TagSignature::from(vec![57 + offset, 71]),
                TagScores {
                    rank_sum: score,
                    hypergeometric: score,
                },
            ));
        }
        RootSearch {
            candidates,
            num_paths: 4,
            aborted: root == 7,
        }
    }

    #[test]
    fn test_parallel_and_serial_collect_agree() {
        let serial: TraversalAccumulator = (0..10u8).map(root_search).collect();
        let parallel: TraversalAccumulator = (0..10u8).into_par_iter().map(root_search).collect();

        assert_eq!(serial.num_paths, 40);
        assert_eq!(parallel.num_paths, 40);
        assert!(serial.aborted && parallel.aborted);

        let template = CandidateManager::new(3, ScoreWeights::default());
        let serial = serial.into_manager(template.clone()).finalize().into_vec();
        let parallel = parallel.into_manager(template).finalize().into_vec();
        assert_eq!(serial.len(), 3);
        // Each signature keeps the copy from the highest scoring root
        assert!(serial.iter().all(|c| c.candidate.path.edge_ids() == [EdgeId(9)]));
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_empty_uses_template() {
        let acc: TraversalAccumulator = Vec::<RootSearch>::new().into_iter().collect();
        let manager = acc.into_manager(CandidateManager::new(7, ScoreWeights::default()));
        assert!(manager.is_empty());
        assert_eq!(manager.max_candidates(), 7);
    }
}
