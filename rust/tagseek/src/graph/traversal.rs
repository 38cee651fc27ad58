//! Depth-bounded enumeration of maximal paths through the mass-gap graph.
//!
//! The walk uses an explicit work stack instead of recursion. Each stack
//! frame points into an arena of `(edge, parent)` nodes, so paths share
//! their prefixes and the current path is rebuilt only when it is emitted.
//!
//! Dense spectra (many near-isobaric peaks) can have a number of paths that
//! grows exponentially with the tag length. `max_tag_length` is the main
//! bound on that growth; callers that need a hard stop can raise the abort
//! flag, which is checked every time a frame is popped.

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use super::builder::{
    EdgeId,
    MassGapGraph,
};

#[derive(Debug, Clone, Copy)]
struct PathNode {
    edge: EdgeId,
    parent: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    vertex: usize,
    node: Option<usize>,
    depth: usize,
}

/// Summary of a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    pub emitted: usize,
    pub aborted: bool,
}

impl std::ops::AddAssign for WalkOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.emitted += rhs.emitted;
        self.aborted |= rhs.aborted;
    }
}

/// Reusable scratch space for walking paths from root vertices.
///
/// A walker borrows the graph immutably, so one walker per thread can walk
/// different roots of the same graph concurrently.
///
/// Example:
/// ```
/// use std::sync::atomic::AtomicBool;
/// use tagseek::{MassGapGraph, MassTolerance, PathWalker, PeakList, ResidueTable};
///
/// let peaks = PeakList::try_new(vec![(100.0, 1.0), (171.037, 1.0), (228.058, 1.0)]).unwrap();
/// let graph = MassGapGraph::build(&peaks, &ResidueTable::standard(), &MassTolerance::Absolute(0.01));
///
/// let mut walker = PathWalker::new(&graph, 2);
/// let mut lengths = Vec::new();
/// let abort = AtomicBool::new(false);
/// walker.walk_all(&abort, &mut |path: &[_]| lengths.push(path.len()));
/// lengths.sort();
/// // 0 -> 1 -> 2 (A, G) and the single glutamine gap 0 -> 2
/// assert_eq!(lengths, vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct PathWalker<'g> {
    graph: &'g MassGapGraph,
    max_tag_length: usize,
    arena: Vec<PathNode>,
    stack: Vec<Frame>,
    path_buffer: Vec<EdgeId>,
}

impl<'g> PathWalker<'g> {
    pub fn new(graph: &'g MassGapGraph, max_tag_length: usize) -> Self {
        Self {
            graph,
            max_tag_length,
            arena: Vec::new(),
            stack: Vec::new(),
            path_buffer: Vec::with_capacity(max_tag_length),
        }
    }

    pub fn max_tag_length(&self) -> usize {
        self.max_tag_length
    }

    /// Walks every root of the graph, in ascending vertex order.
    pub fn walk_all<F>(&mut self, abort: &AtomicBool, emit: &mut F) -> WalkOutcome
    where
        F: FnMut(&[EdgeId]),
    {
        let mut outcome = WalkOutcome::default();
        for root in self.graph.roots() {
            outcome += self.walk_from(root, abort, emit);
            if outcome.aborted {
                break;
            }
        }
        outcome
    }

    /// Emits every maximal path starting at `root`.
    ///
    /// A path is maximal when its last vertex has no outgoing edge or when
    /// it holds `max_tag_length` edges. Emitting at the length bound does
    /// not stop the walk; sibling branches are still explored.
    pub fn walk_from<F>(&mut self, root: usize, abort: &AtomicBool, emit: &mut F) -> WalkOutcome
    where
        F: FnMut(&[EdgeId]),
    {
        let mut outcome = WalkOutcome::default();
        self.arena.clear();
        self.stack.clear();
        self.stack.push(Frame {
            vertex: root,
            node: None,
            depth: 0,
        });

        while let Some(frame) = self.stack.pop() {
            if abort.load(Ordering::Relaxed) {
                outcome.aborted = true;
                break;
            }

            // Every arena node created after this frame's node belongs to a
            // subtree that has already been fully explored.
            self.arena.truncate(frame.node.map_or(0, |n| n + 1));

            let outgoing = self.graph.outgoing_ids(frame.vertex);
            if frame.depth >= self.max_tag_length || outgoing.is_empty() {
                if let Some(node) = frame.node {
                    self.fill_path_buffer(node);
                    emit(&self.path_buffer);
                    outcome.emitted += 1;
                }
                continue;
            }

            // Reverse order keeps the lowest target on top of the stack.
            for id in outgoing.rev() {
                let edge_id = EdgeId(id);
                let target = self.graph.edge(edge_id).target;
                debug_assert!(target > frame.vertex, "Edges must increase the vertex index");
                self.arena.push(PathNode {
                    edge: edge_id,
                    parent: frame.node,
                });
                self.stack.push(Frame {
                    vertex: target,
                    node: Some(self.arena.len() - 1),
                    depth: frame.depth + 1,
                });
            }
        }

        outcome
    }

    fn fill_path_buffer(&mut self, node: usize) {
        self.path_buffer.clear();
        let mut current = Some(node);
        while let Some(idx) = current {
            let path_node = self.arena[idx];
            self.path_buffer.push(path_node.edge);
            current = path_node.parent;
        }
        self.path_buffer.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TagPath;
    use crate::models::{
        MassTolerance,
        PeakList,
        ResidueTable,
    };
    use std::collections::HashSet;

    fn ladder_peaks(sequence: &str, start: f64) -> Vec<(f64, f64)> {
        let table = ResidueTable::standard();
        let mut mass = start;
        let mut out = vec![(mass, 10.0)];
        for c in sequence.chars() {
            mass += table.get(c).unwrap().mass;
            out.push((mass, 10.0));
        }
        out
    }

    fn collect_paths(graph: &MassGapGraph, max_len: usize) -> (Vec<TagPath>, WalkOutcome) {
        let mut walker = PathWalker::new(graph, max_len);
        let mut paths = Vec::new();
        let abort = AtomicBool::new(false);
        let outcome = walker.walk_all(&abort, &mut |p: &[EdgeId]| paths.push(TagPath::from_slice(p)));
        (paths, outcome)
    }

    #[test]
    fn test_scenario_two_maximal_paths() {
        let peaks =
            PeakList::try_new(vec![(100.0, 10.0), (171.037, 20.0), (228.058, 30.0)]).unwrap();
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Absolute(0.01),
        );
        let (paths, outcome) = collect_paths(&graph, 2);
        assert_eq!(outcome.emitted, paths.len());
        // A then G, and the single Q edge spanning both.
        assert_eq!(paths.len(), 2);
        let short: Vec<&TagPath> = paths.iter().filter(|p| p.len() == 1).collect();
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].peak_indices(&graph), vec![0, 2]);
        let long: Vec<&TagPath> = paths.iter().filter(|p| p.len() == 2).collect();
        assert_eq!(long.len(), 1);
        assert_eq!(long[0].peak_indices(&graph), vec![0, 1, 2]);
    }

    #[test]
    fn test_length_bound_and_siblings() {
        // A straight ladder of 6 residues walked with max length 3 only
        // yields paths from the root, but a branch at the first vertex must
        // still be explored after the first bounded path is emitted.
        let mut pairs = ladder_peaks("GASPVT", 500.0);
        pairs.push((500.0 + 186.079313, 1.0));
        let peaks = PeakList::from_unsorted(pairs);
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Absolute(0.005),
        );
        let (paths, _) = collect_paths(&graph, 3);
        assert!(paths.iter().all(|p| p.len() <= 3 && !p.is_empty()));
        assert!(paths.iter().any(|p| p.len() == 3));
        let w_branch = paths
            .iter()
            .any(|p| p.edges(&graph).next().unwrap().nominal_mass == 186);
        assert!(w_branch, "Sibling branch was not explored: {:?}", paths);
    }

    #[test]
    fn test_no_vertex_repeats() {
        let mut pairs = ladder_peaks("PEPTIDE", 300.0);
        pairs.extend(ladder_peaks("GGAGG", 300.0));
        let peaks = PeakList::from_unsorted(pairs);
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Ppm(10.0),
        );
        let (paths, _) = collect_paths(&graph, 8);
        assert!(!paths.is_empty());
        for path in &paths {
            let indices = path.peak_indices(&graph);
            let unique: HashSet<usize> = indices.iter().copied().collect();
            assert_eq!(unique.len(), indices.len());
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_paths_are_maximal() {
        let peaks = PeakList::from_unsorted(ladder_peaks("PEPTIDEK", 200.0));
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Ppm(10.0),
        );
        let max_len = 4;
        let (paths, _) = collect_paths(&graph, max_len);
        for path in &paths {
            let last = path.last_peak(&graph).unwrap();
            assert!(path.len() == max_len || graph.outgoing(last).is_empty());
        }
    }

    #[test]
    fn test_abort_flag_stops_walk() {
        let peaks = PeakList::from_unsorted(ladder_peaks("PEPTIDEK", 200.0));
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Ppm(10.0),
        );
        let abort = AtomicBool::new(true);
        let mut walker = PathWalker::new(&graph, 8);
        let mut count = 0;
        let outcome = walker.walk_all(&abort, &mut |_: &[EdgeId]| count += 1);
        assert!(outcome.aborted);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_abort_mid_walk() {
        let mut pairs = Vec::new();
        for offset in [0.0, 0.001, 0.002] {
            pairs.extend(ladder_peaks("GGGGGGGG", 300.0 + offset));
        }
        let peaks = PeakList::from_unsorted(pairs);
        let graph = MassGapGraph::build(
            &peaks,
            &ResidueTable::standard(),
            &MassTolerance::Absolute(0.01),
        );
        let abort = AtomicBool::new(false);
        let mut walker = PathWalker::new(&graph, 8);
        let mut count = 0;
        let outcome = walker.walk_all(&abort, &mut |_: &[EdgeId]| {
            count += 1;
            if count == 5 {
                abort.store(true, Ordering::Relaxed);
            }
        });
        assert!(outcome.aborted);
        assert_eq!(count, 5);
    }
}
