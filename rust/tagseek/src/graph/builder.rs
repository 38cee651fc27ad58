use serde::Serialize;
use tracing::debug;

use crate::models::residue::nominal_mass;
use crate::models::{
    MassTolerance,
    PeakList,
    ResidueTable,
};

/// Position of an edge in the graph's edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A residue that explains a mass gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidueMatch {
    pub symbol: char,
    pub mass: f64,
    /// `mass_gap - residue mass`
    pub mass_error: f64,
}

/// Directed edge between two peaks whose mass difference matches at least
/// one residue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassGapEdge {
    pub source: usize,
    pub target: usize,
    pub mass_gap: f64,
    pub nominal_mass: u8,
    /// Sorted by absolute mass error, best match first. Never empty.
    pub matched_residues: Vec<ResidueMatch>,
}

/// Graph over peak indices where edges are residue-sized mass gaps.
///
/// Peaks are mass sorted and gaps positive, so every edge goes from a lower
/// to a higher index and the graph is acyclic.
///
/// Edges live in a single arena grouped by source vertex; the outgoing
/// edges of vertex `v` are `edges[offsets[v]..offsets[v + 1]]`.
#[derive(Debug, Clone, Default)]
pub struct MassGapGraph {
    edges: Vec<MassGapEdge>,
    offsets: Vec<usize>,
    has_incoming: Vec<bool>,
}

impl MassGapGraph {
    /// Builds the edge set for a spectrum.
    ///
    /// The tolerance is evaluated at the mass of the source peak. The inner
    /// scan stops as soon as the gap exceeds the largest residue mass, so
    /// the cost is proportional to the number of peaks times the number of
    /// peaks within one residue mass of each other.
    ///
    /// Example:
    /// ```
    /// use tagseek::{MassGapGraph, MassTolerance, PeakList, ResidueTable};
    ///
    /// let peaks = PeakList::try_new(vec![(100.0, 1.0), (171.037, 1.0), (228.058, 1.0)]).unwrap();
    /// let graph = MassGapGraph::build(&peaks, &ResidueTable::standard(), &MassTolerance::Absolute(0.01));
    ///
    /// let first = &graph.outgoing(0)[0];
    /// assert_eq!(first.target, 1);
    /// assert_eq!(first.matched_residues[0].symbol, 'A');
    /// ```
    pub fn build(peaks: &PeakList, residues: &ResidueTable, tolerance: &MassTolerance) -> Self {
        let num_peaks = peaks.len();
        let mut edges: Vec<MassGapEdge> = Vec::new();
        let mut offsets = Vec::with_capacity(num_peaks + 1);
        let mut has_incoming = vec![false; num_peaks];

        let min_residue = residues.min_mass();
        let max_residue = residues.max_mass();
        let peak_slice = peaks.as_slice();

        for (i, source) in peak_slice.iter().enumerate() {
            offsets.push(edges.len());
            let tol = tolerance.tolerance_at(source.mass);
            let lowest_gap = min_residue - tol;
            let highest_gap = max_residue + tol;

            for target in &peak_slice[i + 1..] {
                let gap = target.mass - source.mass;
                if gap > highest_gap {
                    break;
                }
                if gap < lowest_gap {
                    continue;
                }

                let mut matched_residues: Vec<ResidueMatch> = residues
                    .matching(gap, tol)
                    .map(|r| ResidueMatch {
                        symbol: r.symbol,
                        mass: r.mass,
                        mass_error: gap - r.mass,
                    })
                    .collect();
                if matched_residues.is_empty() {
                    continue;
                }
                matched_residues.sort_by(|a, b| a.mass_error.abs().total_cmp(&b.mass_error.abs()));

                has_incoming[target.index] = true;
                edges.push(MassGapEdge {
                    source: source.index,
                    target: target.index,
                    mass_gap: gap,
                    nominal_mass: nominal_mass(gap),
                    matched_residues,
                });
            }
        }
        offsets.push(edges.len());

        debug!(
            "Built mass gap graph with {} vertices and {} edges",
            num_peaks,
            edges.len()
        );

        Self {
            edges,
            offsets,
            has_incoming,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.has_incoming.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[MassGapEdge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &MassGapEdge {
        &self.edges[id.0]
    }

    /// Outgoing edges of `vertex`, in ascending target order.
    pub fn outgoing(&self, vertex: usize) -> &[MassGapEdge] {
        &self.edges[self.outgoing_ids(vertex)]
    }

    /// Arena positions of the outgoing edges of `vertex`.
    pub fn outgoing_ids(&self, vertex: usize) -> std::ops::Range<usize> {
        if vertex >= self.num_vertices() {
            return 0..0;
        }
        self.offsets[vertex]..self.offsets[vertex + 1]
    }

    pub fn has_incoming(&self, vertex: usize) -> bool {
        self.has_incoming.get(vertex).copied().unwrap_or(false)
    }

    /// Vertices without incoming edges that start at least one edge.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.num_vertices())
            .filter(|&v| !self.has_incoming[v] && !self.outgoing_ids(v).is_empty())
            .collect()
    }

    /// Whether a vertex takes part in no edge at all.
    pub fn is_isolated(&self, vertex: usize) -> bool {
        !self.has_incoming(vertex) && self.outgoing_ids(vertex).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_graph() -> (PeakList, MassGapGraph) {
        let peaks =
            PeakList::try_new(vec![(100.0, 10.0), (171.037, 20.0), (228.058, 30.0)]).unwrap();
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Absolute(0.01),
        );
        (peaks, graph)
    }

    #[test]
    fn test_scenario_edges() {
        let (_peaks, graph) = scenario_graph();

        let from_zero = graph.outgoing(0);
        assert_eq!(from_zero[0].target, 1);
        assert_eq!(from_zero[0].matched_residues.len(), 1);
        assert_eq!(from_zero[0].matched_residues[0].symbol, 'A');
        assert_eq!(from_zero[0].nominal_mass, 71);

        let from_one = graph.outgoing(1);
        assert_eq!(from_one.len(), 1);
        assert_eq!(from_one[0].target, 2);
        assert_eq!(from_one[0].matched_residues[0].symbol, 'G');
        assert_eq!(from_one[0].nominal_mass, 57);

        // 0 -> 2 spans A + G, which is also the mass of a single glutamine.
        assert!(from_zero
            .iter()
            .any(|e| e.target == 2 && e.matched_residues[0].symbol == 'Q'));

        assert!(graph.outgoing(2).is_empty());
        assert_eq!(graph.roots(), vec![0]);
    }

    #[test]
    fn test_dag_property() {
        let table = ResidueTable::standard();
        let mut pairs: Vec<(f64, f64)> = (0..200)
            .map(|i| (100.0 + (i as f64) * 13.7 + ((i * 7919) % 97) as f64 * 0.31, 1.0))
            .collect();
        for start in [150.0, 433.3, 1021.7] {
            let mut mass = start;
            pairs.push((mass, 5.0));
            for symbol in "PEPTIDEK".chars() {
                mass += table.get(symbol).unwrap().mass;
                pairs.push((mass, 5.0));
            }
        }
        let peaks = PeakList::from_unsorted(pairs);
        let graph = MassGapGraph::build(&peaks, &table, &MassTolerance::Ppm(20.0));
        assert!(graph.num_edges() >= 24);
        for edge in graph.edges() {
            assert!(edge.source < edge.target);
            assert!(!edge.matched_residues.is_empty());
        }
    }

    #[test]
    fn test_every_matching_pair_has_an_edge() {
        let table = ResidueTable::standard();
        let tolerance = MassTolerance::Absolute(0.02);
        let pairs: Vec<(f64, f64)> = (0..120)
            .map(|i| (300.0 + (i as f64) * 7.3 + ((i * 31) % 11) as f64 * 0.137, 1.0))
            .collect();
        let peaks = PeakList::from_unsorted(pairs);
        let graph = MassGapGraph::build(&peaks, &table, &tolerance);

        for i in 0..peaks.len() {
            for j in (i + 1)..peaks.len() {
                let gap = peaks[j].mass - peaks[i].mass;
                let tol = tolerance.tolerance_at(peaks[i].mass);
                let expected: Vec<char> = table
                    .iter()
                    .filter(|r| (r.mass - gap).abs() <= tol)
                    .map(|r| r.symbol)
                    .collect();
                let edge = graph.outgoing(i).iter().find(|e| e.target == j);
                match edge {
                    Some(edge) => {
                        for symbol in &expected {
                            assert!(edge.matched_residues.iter().any(|m| m.symbol == *symbol));
                        }
                        assert_eq!(edge.matched_residues.len(), expected.len());
                    }
                    None => assert!(expected.is_empty(), "Missing edge {} -> {}", i, j),
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_gaps_produce_no_edge() {
        // 40 Da is below glycine and 200 Da above tryptophan.
        let peaks = PeakList::try_new(vec![(100.0, 1.0), (140.0, 1.0), (340.0, 1.0)]).unwrap();
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Absolute(0.01),
        );
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn test_isolated_peak() {
        let peaks = PeakList::try_new(vec![
            (100.0, 1.0),
            (171.037, 1.0),
            (228.058, 1.0),
            (1000.0, 50.0),
        ])
        .unwrap();
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Absolute(0.01),
        );
        assert!(graph.is_isolated(3));
        assert!(graph
            .edges()
            .iter()
            .all(|e| e.source != 3 && e.target != 3));
    }

    #[test]
    fn test_empty_graph() {
        let graph = MassGapGraph::build(
            &PeakList::default(),
            &ResidueTable::standard(),
            &MassTolerance::default(),
        );
        assert_eq!(graph.num_vertices(), 0);
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.outgoing(0).is_empty());
        assert!(graph.roots().is_empty());
    }
}
