//! Expansion of a tag's mass gaps into residue strings.
//!
//! Every edge can be explained by one or more residues (I/L always, and
//! near-isobaric pairs at loose tolerances), so a tag stands for the
//! Cartesian product of its edges' matches. The product is walked lazily
//! like an odometer: the last position advances first and carries to the
//! left when it wraps.

use crate::graph::{
    MassGapEdge,
    MassGapGraph,
    TagPath,
};
use crate::models::{
    MassTolerance,
    PeakList,
};

/// Lazy iterator over the residue strings of a tag.
///
/// A combination is only yielded when the first peak's mass plus the
/// summed residue masses lands on the last peak, within the tolerance
/// evaluated at the last peak's mass. Edges are matched on the same
/// (peak mass) scale, so a tag whose edges all match is not rejected just
/// because its end-to-end gap is small.
///
/// Example:
/// ```
/// use std::sync::atomic::AtomicBool;
/// use tagseek::graph::{EdgeId, TagPath};
/// use tagseek::sequences::tag_strings;
/// use tagseek::{MassGapGraph, MassTolerance, PathWalker, PeakList, ResidueTable};
///
/// let peaks = PeakList::try_new(vec![(100.0, 1.0), (171.037, 1.0), (228.058, 1.0)]).unwrap();
/// let tolerance = MassTolerance::Absolute(0.01);
/// let graph = MassGapGraph::build(&peaks, &ResidueTable::standard(), &tolerance);
///
/// let mut paths = Vec::new();
/// PathWalker::new(&graph, 2).walk_all(&AtomicBool::new(false), &mut |p: &[EdgeId]| {
///     paths.push(TagPath::from_slice(p))
/// });
/// let longest = paths.iter().find(|p| p.len() == 2).unwrap();
/// assert_eq!(tag_strings(&graph, &peaks, &tolerance, longest), vec!["AG".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct TagSequences<'a> {
    edges: Vec<&'a MassGapEdge>,
    digits: Vec<usize>,
    start_mass: f64,
    end_mass: f64,
    tolerance: MassTolerance,
    exhausted: bool,
}

impl<'a> TagSequences<'a> {
    pub fn new(
        graph: &'a MassGapGraph,
        peaks: &PeakList,
        tolerance: &MassTolerance,
        path: &TagPath,
    ) -> Self {
        let edges: Vec<&'a MassGapEdge> = path
            .edge_ids()
            .iter()
            .map(|id| graph.edge(*id))
            .collect();
        let (start_mass, end_mass) = match (path.first_peak(graph), path.last_peak(graph)) {
            (Some(first), Some(last)) => (peaks[first].mass, peaks[last].mass),
            _ => (0.0, 0.0),
        };

        Self {
            digits: vec![0; edges.len()],
            exhausted: edges.is_empty(),
            edges,
            start_mass,
            end_mass,
            tolerance: *tolerance,
        }
    }

    /// Size of the full product of residue matches, before the mass check.
    /// Saturates at `usize::MAX`.
    pub fn combinations(&self) -> usize {
        if self.edges.is_empty() {
            return 0;
        }
        self.edges
            .iter()
            .fold(1usize, |acc, e| acc.saturating_mul(e.matched_residues.len()))
    }

    fn advance(&mut self) {
        for pos in (0..self.digits.len()).rev() {
            self.digits[pos] += 1;
            if self.digits[pos] < self.edges[pos].matched_residues.len() {
                return;
            }
            self.digits[pos] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for TagSequences<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let mut total = 0.0;
            let mut out = String::with_capacity(self.edges.len());
            for (edge, &digit) in self.edges.iter().zip(self.digits.iter()) {
                let residue = &edge.matched_residues[digit];
                total += residue.mass;
                out.push(residue.symbol);
            }
            self.advance();

            if self.tolerance.matches(self.end_mass, self.start_mass + total) {
                return Some(out);
            }
        }
        None
    }
}

/// All residue strings of a tag, sorted and deduplicated.
pub fn tag_strings(
    graph: &MassGapGraph,
    peaks: &PeakList,
    tolerance: &MassTolerance,
    path: &TagPath,
) -> Vec<String> {
    let mut out: Vec<String> = TagSequences::new(graph, peaks, tolerance, path).collect();
    out.sort();
    out.dedup();
    out
}
