use serde::Serialize;

use crate::graph::MassGapGraph;
use crate::models::{
    MassTolerance,
    PeakList,
};
use crate::scoring::RankedCandidate;
use crate::sequences::tag_strings;

/// A reported sequence tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceTag {
    /// Nominal mass of each gap, in order.
    pub signature: Vec<u8>,
    pub peak_indices: Vec<usize>,
    pub first_peak: usize,
    pub last_peak: usize,
    pub start_mass: f64,
    pub end_mass: f64,
    pub mass_gaps: Vec<f64>,
    pub rank_sum_score: f64,
    pub hypergeometric_score: f64,
    pub combined_score: f64,
    /// Residue strings consistent with the tag, sorted.
    pub sequences: Vec<String>,
}

impl SequenceTag {
    /// Resolves a ranked candidate against the spectrum it was found in.
    ///
    /// Returns `None` for an empty path.
    pub fn from_ranked(
        graph: &MassGapGraph,
        peaks: &PeakList,
        tolerance: &MassTolerance,
        ranked: &RankedCandidate,
    ) -> Option<Self> {
        let candidate = &ranked.candidate;
        let path = &candidate.path;
        let first_peak = path.first_peak(graph)?;
        let last_peak = path.last_peak(graph)?;

        Some(Self {
            signature: candidate.signature.as_bytes().to_vec(),
            peak_indices: path.peak_indices(graph),
            first_peak,
            last_peak,
            start_mass: peaks[first_peak].mass,
            end_mass: peaks[last_peak].mass,
            mass_gaps: path.edges(graph).map(|e| e.mass_gap).collect(),
            rank_sum_score: candidate.rank_sum_score,
            hypergeometric_score: candidate.hypergeometric_score,
            combined_score: ranked.combined_score,
            sequences: tag_strings(graph, peaks, tolerance, path),
        })
    }

    /// Number of residues in the tag.
    pub fn len(&self) -> usize {
        self.signature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }
}
