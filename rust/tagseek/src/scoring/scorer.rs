//! Statistical scores for a single tag.
//!
//! Two independent measures are computed over the peaks a tag visits,
//! relative to all the peaks in the tag's mass window:
//!
//! - **Rank-sum**: are the tag's peaks more intense than the other peaks in
//!   the window? (Mann-Whitney U, normal approximation)
//! - **Hypergeometric**: how unlikely is it to land on observed peaks at every
//!   one of the tag's positions, if the window were sliced into
//!   `cell_width` sized cells and the observed peaks scattered at random?
//!
//! Both are reported as `-log10(p)` and clamped to [`MAX_SCORE`](super::MAX_SCORE).

use serde::Serialize;

use super::math::{
    hypergeometric_upper_tail_ln,
    ln_normal_upper_tail,
    neg_log10_from_ln,
};
use super::ranking::RankingCache;
use crate::graph::{
    EdgeId,
    MassGapGraph,
};
use crate::models::PeakList;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TagScores {
    pub rank_sum: f64,
    pub hypergeometric: f64,
}

/// Scores tag paths for one spectrum.
///
/// Holds the ranking cache and scratch space, so each worker thread owns
/// its own scorer.
#[derive(Debug)]
pub struct TagScorer<'a> {
    graph: &'a MassGapGraph,
    peaks: &'a PeakList,
    cell_width: f64,
    cache: RankingCache,
    peak_buffer: Vec<usize>,
}

impl<'a> TagScorer<'a> {
    pub fn new(graph: &'a MassGapGraph, peaks: &'a PeakList, cell_width: f64) -> Self {
        Self {
            graph,
            peaks,
            cell_width,
            cache: RankingCache::new(),
            peak_buffer: Vec::new(),
        }
    }

    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }

    /// Forgets cached rankings; scores after a reset only depend on the
    /// paths scored since.
    pub fn reset_cache(&mut self) {
        self.cache.clear();
    }

    /// Scores a path given as edge ids. An empty path scores zero.
    pub fn score(&mut self, edges: &[EdgeId]) -> TagScores {
        self.peak_buffer.clear();
        let Some(first) = edges.first() else {
            return TagScores::default();
        };
        self.peak_buffer.push(self.graph.edge(*first).source);
        self.peak_buffer
            .extend(edges.iter().map(|id| self.graph.edge(*id).target));

        let min_mass = self.peaks[self.peak_buffer[0]].mass;
        let max_mass = self.peaks[self.peak_buffer[self.peak_buffer.len() - 1]].mass;

        TagScores {
            rank_sum: self.rank_sum_score(min_mass, max_mass),
            hypergeometric: self.hypergeometric_score(min_mass, max_mass),
        }
    }

    fn rank_sum_score(&mut self, min_mass: f64, max_mass: f64) -> f64 {
        let ranking = self.cache.get_or_insert(self.peaks, min_mass, max_mass);
        let population = ranking.population();

        let (n1, rank_total) = self
            .peak_buffer
            .iter()
            .filter_map(|&idx| ranking.rank_of(idx))
            .fold((0usize, 0f64), |(n, total), rank| (n + 1, total + rank as f64));

        if n1 == 0 || n1 >= population {
            return 0.0;
        }

        let n1f = n1 as f64;
        let n2f = (population - n1) as f64;
        let u = n1f * n2f + n1f * (n1f + 1.0) / 2.0 - rank_total;
        let mean = n1f * n2f / 2.0;
        let sd = (n1f * n2f * (population as f64 + 1.0) / 12.0).sqrt();
        if sd <= 0.0 {
            return 0.0;
        }

        let z = (u - mean) / sd;
        neg_log10_from_ln(ln_normal_upper_tail(z))
    }

    fn hypergeometric_score(&self, min_mass: f64, max_mass: f64) -> f64 {
        let observed = self.peaks.index_range(min_mass, max_mass).len() as u64;
        let draws = self.peak_buffer.len() as u64;
        let width = max_mass - min_mass;

        let cells = (width / self.cell_width).ceil();
        if !cells.is_finite() {
            return 0.0;
        }
        let cells = (cells.max(0.0) as u64).max(observed);

        let ln_p = hypergeometric_upper_tail_ln(cells, observed, draws, draws);
        neg_log10_from_ln(ln_p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PathWalker;
    use crate::models::{
        MassTolerance,
        ResidueTable,
    };
    use crate::scoring::math::MAX_SCORE;
    use std::sync::atomic::AtomicBool;

    fn all_paths(graph: &MassGapGraph, max_len: usize) -> Vec<Vec<EdgeId>> {
        let mut walker = PathWalker::new(graph, max_len);
        let mut out = Vec::new();
        walker.walk_all(&AtomicBool::new(false), &mut |p: &[EdgeId]| out.push(p.to_vec()));
        out
    }

    fn ladder_with_noise(ladder_intensity: f64) -> PeakList {
        let table = ResidueTable::standard();
        let mut pairs = Vec::new();
        let mut mass = 400.0;
        pairs.push((mass, ladder_intensity));
        for c in "SAMPLER".chars() {
            mass += table.get(c).unwrap().mass;
            pairs.push((mass, ladder_intensity));
        }
        // Noise peaks between the ladder rungs, none a residue mass apart
        // from a rung.
        for i in 0..60 {
            pairs.push((401.5 + i as f64 * 11.0 + 0.37, 1.0 + (i % 5) as f64));
        }
        PeakList::from_unsorted(pairs)
    }

    #[test]
    fn test_intense_ladder_scores_high() {
        let peaks = ladder_with_noise(1000.0);
        let graph = MassGapGraph::build(&peaks, &ResidueTable::standard(), &MassTolerance::Ppm(10.0));
        let mut scorer = TagScorer::new(&graph, &peaks, 0.01);

        let best = all_paths(&graph, 7)
            .into_iter()
            .max_by_key(|p| p.len())
            .unwrap();
        assert_eq!(best.len(), 7);
        let scores = scorer.score(&best);
        assert!(scores.rank_sum > 3.0, "{:?}", scores);
        assert!(scores.hypergeometric > 3.0, "{:?}", scores);
        assert!(scores.rank_sum <= MAX_SCORE && scores.hypergeometric <= MAX_SCORE);
    }

    #[test]
    fn test_weak_ladder_ranks_low() {
        let strong = ladder_with_noise(1000.0);
        let weak = ladder_with_noise(0.1);
        let table = ResidueTable::standard();
        let tol = MassTolerance::Ppm(10.0);

        let score_longest = |peaks: &PeakList| {
            let graph = MassGapGraph::build(peaks, &table, &tol);
            let path = all_paths(&graph, 7)
                .into_iter()
                .max_by_key(|p| p.len())
                .unwrap();
            TagScorer::new(&graph, peaks, 0.01).score(&path)
        };

        let strong = score_longest(&strong);
        let weak = score_longest(&weak);
        assert!(strong.rank_sum > weak.rank_sum);
        assert!(weak.rank_sum < 0.01, "{:?}", weak);
        // Positions do not depend on intensity
        assert!((strong.hypergeometric - weak.hypergeometric).abs() < 1e-9);
    }

    #[test]
    fn test_path_covering_whole_window() {
        let peaks = PeakList::try_new(vec![(100.0, 10.0), (171.037, 20.0), (228.058, 30.0)]).unwrap();
        let graph = MassGapGraph::build(&peaks, &ResidueTable::standard(), &MassTolerance::Absolute(0.01));
        let path: Vec<EdgeId> = all_paths(&graph, 2)
            .into_iter()
            .find(|p| p.len() == 2)
            .unwrap();

        let mut scorer = TagScorer::new(&graph, &peaks, 0.01);
        let scores = scorer.score(&path);
        assert_eq!(scores.rank_sum, 0.0);
        assert!(scores.hypergeometric.is_finite());
        assert!((0.0..=MAX_SCORE).contains(&scores.hypergeometric));
    }

    #[test]
    fn test_empty_path_and_cache_reuse() {
        let peaks = ladder_with_noise(10.0);
        let graph = MassGapGraph::build(&peaks, &ResidueTable::standard(), &MassTolerance::Ppm(10.0));
        let mut scorer = TagScorer::new(&graph, &peaks, 0.01);
        assert_eq!(scorer.score(&[]), TagScores::default());

        let paths = all_paths(&graph, 3);
        assert!(!paths.is_empty());
        for path in &paths {
            let first = scorer.score(path);
            let second = scorer.score(path);
            assert_eq!(first, second);
        }
        assert!(scorer.cache().hits() >= paths.len());
    }
}
