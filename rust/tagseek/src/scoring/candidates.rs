use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;

use super::scorer::TagScores;
use crate::graph::{
    TagPath,
    TagSignature,
};

/// A scored path, before the combined score is known.
#[derive(Debug, Clone, PartialEq)]
pub struct TagCandidate {
    pub path: TagPath,
    pub signature: TagSignature,
    pub rank_sum_score: f64,
    pub hypergeometric_score: f64,
}

impl TagCandidate {
    pub fn new(path: TagPath, signature: TagSignature, scores: TagScores) -> Self {
        Self {
            path,
            signature,
            rank_sum_score: scores.rank_sum,
            hypergeometric_score: scores.hypergeometric,
        }
    }

    pub fn scores(&self) -> TagScores {
        TagScores {
            rank_sum: self.rank_sum_score,
            hypergeometric: self.hypergeometric_score,
        }
    }
}

/// Relative weight of each raw score in the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub rank_sum: f64,
    pub hypergeometric: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            rank_sum: 1.0,
            hypergeometric: 1.0,
        }
    }
}

/// Running extremes of the raw scores over every candidate ever added.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStats {
    pub min_rank_sum: f64,
    pub max_rank_sum: f64,
    pub min_hypergeometric: f64,
    pub max_hypergeometric: f64,
    pub num_observed: usize,
}

impl Default for ScoreStats {
    fn default() -> Self {
        Self {
            min_rank_sum: f64::INFINITY,
            max_rank_sum: f64::NEG_INFINITY,
            min_hypergeometric: f64::INFINITY,
            max_hypergeometric: f64::NEG_INFINITY,
            num_observed: 0,
        }
    }
}

impl ScoreStats {
    fn observe(&mut self, scores: TagScores) {
        self.min_rank_sum = self.min_rank_sum.min(scores.rank_sum);
        self.max_rank_sum = self.max_rank_sum.max(scores.rank_sum);
        self.min_hypergeometric = self.min_hypergeometric.min(scores.hypergeometric);
        self.max_hypergeometric = self.max_hypergeometric.max(scores.hypergeometric);
        self.num_observed += 1;
    }

    fn combine(&mut self, other: &Self) {
        self.min_rank_sum = self.min_rank_sum.min(other.min_rank_sum);
        self.max_rank_sum = self.max_rank_sum.max(other.max_rank_sum);
        self.min_hypergeometric = self.min_hypergeometric.min(other.min_hypergeometric);
        self.max_hypergeometric = self.max_hypergeometric.max(other.max_hypergeometric);
        self.num_observed += other.num_observed;
    }

    /// Maps the raw scores onto the hypergeometric score scale.
    ///
    /// Each raw score is min-max normalised (a degenerate range contributes
    /// 0), the normalised values are averaged with `weights`, and the result
    /// is stretched back over `[min_hypergeometric, max_hypergeometric]`.
    /// When every hypergeometric score is the same the weighted average is
    /// added to that value unscaled, so the rank-sum still orders the pool.
    pub fn combined_score(&self, scores: TagScores, weights: ScoreWeights) -> f64 {
        fn normalise(x: f64, min: f64, max: f64) -> f64 {
            let range = max - min;
            if range > 0.0 && range.is_finite() {
                (x - min) / range
            } else {
                0.0
            }
        }

        if self.num_observed == 0 {
            return 0.0;
        }

        let norm_rs = normalise(scores.rank_sum, self.min_rank_sum, self.max_rank_sum);
        let norm_hg = normalise(
            scores.hypergeometric,
            self.min_hypergeometric,
            self.max_hypergeometric,
        );
        let total_weight = weights.rank_sum + weights.hypergeometric;
        let combined = if total_weight > 0.0 {
            (weights.rank_sum * norm_rs + weights.hypergeometric * norm_hg) / total_weight
        } else {
            0.0
        };
        let hg_range = self.max_hypergeometric - self.min_hypergeometric;
        if hg_range > 0.0 && hg_range.is_finite() {
            self.min_hypergeometric + combined * hg_range
        } else {
            self.min_hypergeometric + combined
        }
    }
}

/// Collects scored paths for one spectrum, reporting one candidate per
/// signature.
///
/// Which copy of a signature wins depends on the combined score, and that
/// is only known once every candidate has been seen. Until then each
/// signature keeps the copies that no other copy beats on both raw scores;
/// the best of those under any weighting is among them.
///
/// Nothing is ranked until [`CandidateManager::finalize`] is called, so the
/// final order does not depend on the order candidates arrive in.
///
/// Example:
/// ```
/// use tagseek::graph::{TagPath, TagSignature};
/// use tagseek::scoring::{CandidateManager, ScoreWeights, TagCandidate, TagScores};
///
/// let mut manager = CandidateManager::new(2, ScoreWeights::default());
/// for (sig, score) in [(vec![71u8, 57], 3.0), (vec![57, 71], 5.0), (vec![71, 57], 4.0), (vec![99], 1.0)] {
///     let scores = TagScores { rank_sum: score, hypergeometric: score };
///     manager.add(TagCandidate::new(TagPath::default(), TagSignature::from(sig), scores));
/// }
/// assert_eq!(manager.len(), 3);
///
/// let pool = manager.finalize();
/// let sigs: Vec<&[u8]> = pool.iter().map(|c| c.candidate.signature.as_bytes()).collect();
/// assert_eq!(sigs, vec![&[57u8, 71][..], &[71, 57][..]]);
/// assert_eq!(pool.iter().next().unwrap().combined_score, 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct CandidateManager {
    max_candidates: usize,
    weights: ScoreWeights,
    candidates: HashMap<TagSignature, Vec<TagCandidate>>,
    stats: ScoreStats,
}

/// Whether `a` is at least as good as `b` on both raw scores.
fn covers(a: &TagScores, b: &TagScores) -> bool {
    a.rank_sum >= b.rank_sum && a.hypergeometric >= b.hypergeometric
}

impl CandidateManager {
    pub fn new(max_candidates: usize, weights: ScoreWeights) -> Self {
        Self {
            max_candidates,
            weights,
            candidates: HashMap::new(),
            stats: ScoreStats::default(),
        }
    }

    /// Adds a candidate.
    ///
    /// A copy of an already seen signature is dropped when a stored copy
    /// is at least as good on both raw scores (so exact ties keep the one
    /// stored first), and replaces every stored copy it beats on both. The
    /// running min/max include every added candidate, dropped ones too.
    pub fn add(&mut self, candidate: TagCandidate) {
        self.stats.observe(candidate.scores());
        self.insert_deduplicated(candidate);
    }

    fn insert_deduplicated(&mut self, candidate: TagCandidate) {
        match self.candidates.entry(candidate.signature.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(vec![candidate]);
            }
            Entry::Occupied(mut slot) => {
                let scores = candidate.scores();
                let front = slot.get_mut();
                if front.iter().any(|kept| covers(&kept.scores(), &scores)) {
                    return;
                }
                front.retain(|kept| !covers(&scores, &kept.scores()));
                front.push(candidate);
            }
        }
    }

    /// Merges the candidates and statistics of another manager.
    ///
    /// Equivalent to adding every candidate of `other` to `self`, so on an
    /// exact score tie the candidate of `self` stays. The limits and
    /// weights of `self` are kept.
    pub fn merge(mut self, other: Self) -> Self {
        self.stats.combine(&other.stats);
        for candidate in other.candidates.into_values().flatten() {
            self.insert_deduplicated(candidate);
        }
        self
    }

    /// Number of unique signatures held.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    pub fn score_stats(&self) -> &ScoreStats {
        &self.stats
    }

    /// Computes combined scores from the final statistics, picks the best
    /// copy of every signature and keeps the best `max_candidates`.
    ///
    /// Copies of a signature with equal combined scores resolve by higher
    /// rank-sum, then by path. Candidates are ordered by descending combined
    /// score; ties are broken by ascending signature bytes.
    pub fn finalize(self) -> CandidatePool {
        let stats = self.stats;
        let weights = self.weights;
        let mut ranked: Vec<RankedCandidate> = self
            .candidates
            .into_values()
            .filter_map(|front| {
                front
                    .into_iter()
                    .map(|candidate| {
                        let combined_score = stats.combined_score(candidate.scores(), weights);
                        RankedCandidate {
                            candidate,
                            combined_score,
                        }
                    })
                    .max_by(|a, b| {
                        a.combined_score
                            .total_cmp(&b.combined_score)
                            .then(a.candidate.rank_sum_score.total_cmp(&b.candidate.rank_sum_score))
                            .then_with(|| b.candidate.path.cmp(&a.candidate.path))
                    })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.combined_score
                .total_cmp(&a.combined_score)
                .then_with(|| a.candidate.signature.cmp(&b.candidate.signature))
        });
        ranked.truncate(self.max_candidates);

        CandidatePool {
            candidates: ranked,
            stats,
        }
    }
}

impl Default for CandidateManager {
    fn default() -> Self {
        Self::new(100, ScoreWeights::default())
    }
}

/// A candidate with its final combined score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: TagCandidate,
    pub combined_score: f64,
}

/// Finalised, ranked candidates of one spectrum.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Vec<RankedCandidate>,
    stats: ScoreStats,
}

impl CandidatePool {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedCandidate> {
        self.candidates.iter()
    }

    pub fn into_vec(self) -> Vec<RankedCandidate> {
        self.candidates
    }

    pub fn stats(&self) -> &ScoreStats {
        &self.stats
    }
}
