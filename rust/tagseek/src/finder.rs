//! Per-spectrum tag search.
//!
//! # Stages
//!
//! 1. **Graph build**: connect every pair of peaks whose mass difference is a
//!    residue mass.
//! 2. **Traversal**: walk every maximal path from the graph roots, scoring
//!    each one as soon as it is emitted and keeping the best copy of every
//!    signature.
//! 3. **Finalization**: turn the raw scores into combined scores and keep
//!    the top `max_candidates`.
//! 4. **Sequence expansion**: spell out the residue strings of the kept tags.
//!
//! # Buffer reuse
//!
//! Traversal is the hot path. Each root is independent, so roots are walked
//! on the rayon pool with `map_init()`: every worker owns one `PathWalker`
//! (path arena and work stack) and one `TagScorer` (ranking cache) and
//! reuses them for all the roots it is handed. The ranking cache is cleared
//! between roots so scores do not depend on scheduling. Per-root candidate
//! sets are merged by the traversal accumulator with no shared mutable
//! state apart from the abort flag and the path counter.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{
    AtomicBool,
    AtomicUsize,
    Ordering,
};
use std::time::Instant;
use tracing::{
    debug,
    info,
};

use crate::config::TagFinderConfig;
use crate::errors::Result;
use crate::graph::{
    EdgeId,
    MassGapGraph,
    PathWalker,
    TagPath,
};
use crate::models::{
    PeakList,
    ResidueTable,
    SequenceTag,
};
use crate::scoring::{
    CandidateManager,
    RootSearch,
    TagCandidate,
    TagScorer,
    TagSearchTimings,
    TraversalAccumulator,
};

/// Counters describing one spectrum search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagSearchStats {
    pub num_peaks: usize,
    pub num_edges: usize,
    pub num_roots: usize,
    /// Maximal paths emitted by the walk, before the length filter.
    pub num_paths: usize,
    /// Distinct signatures seen before the top-K cut.
    pub num_unique_signatures: usize,
    /// Whether the walk stopped early (abort flag or path budget).
    pub aborted: bool,
}

/// Ranked tags of one spectrum.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagSearchResult {
    pub tags: Vec<SequenceTag>,
    pub timings: TagSearchTimings,
    pub stats: TagSearchStats,
}

/// Finds sequence tags in deconvoluted spectra.
///
/// Example:
/// ```
/// use tagseek::{MassTolerance, PeakList, TagFinder, TagFinderConfig};
///
/// let config = TagFinderConfig {
///     tolerance: MassTolerance::Absolute(0.01),
///     max_tag_length: 2,
///     min_tag_length: 2,
///     ..Default::default()
/// };
/// let finder = TagFinder::new(config).unwrap();
///
/// let peaks = PeakList::try_new(vec![(100.0, 10.0), (171.037, 20.0), (228.058, 30.0)]).unwrap();
/// let result = finder.find_tags(&peaks);
/// assert_eq!(result.tags.len(), 1);
/// assert_eq!(result.tags[0].sequences, vec!["AG".to_string()]);
/// assert_eq!(result.tags[0].signature, vec![71, 57]);
/// ```
#[derive(Debug, Clone)]
pub struct TagFinder {
    config: TagFinderConfig,
    residues: ResidueTable,
}

impl TagFinder {
    /// Validates the configuration and builds the residue table.
    pub fn new(config: TagFinderConfig) -> Result<Self> {
        config.validate()?;
        let residues = config.residue_table()?;
        Ok(Self { config, residues })
    }

    pub fn config(&self) -> &TagFinderConfig {
        &self.config
    }

    pub fn residues(&self) -> &ResidueTable {
        &self.residues
    }

    pub fn find_tags(&self, peaks: &PeakList) -> TagSearchResult {
        let abort = AtomicBool::new(false);
        self.find_tags_with_abort(peaks, &abort)
    }

    /// Same as [`TagFinder::find_tags`], stopping the walk as soon as
    /// `abort` is raised. Tags found up to that point are still ranked and
    /// reported.
    ///
    /// When `max_paths_per_spectrum` is set, running out of budget raises
    /// `abort` as well.
    pub fn find_tags_with_abort(&self, peaks: &PeakList, abort: &AtomicBool) -> TagSearchResult {
        let span = tracing::span!(tracing::Level::DEBUG, "find_tags", num_peaks = peaks.len());
        let _entered = span.enter();
        let mut timings = TagSearchTimings::default();

        let start = Instant::now();
        let graph = MassGapGraph::build(peaks, &self.residues, &self.config.tolerance);
        let roots = graph.roots();
        timings.graph_build = start.elapsed();

        let start = Instant::now();
        let traversal = self.walk_roots(&graph, peaks, &roots, abort);
        timings.traversal = start.elapsed();

        let start = Instant::now();
        let num_paths = traversal.num_paths;
        let aborted = traversal.aborted || abort.load(Ordering::Relaxed);
        let manager = traversal.into_manager(self.empty_manager());
        let num_unique_signatures = manager.len();
        let pool = manager.finalize();
        timings.finalization = start.elapsed();

        let start = Instant::now();
        let tags: Vec<SequenceTag> = pool
            .iter()
            .filter_map(|ranked| {
                SequenceTag::from_ranked(&graph, peaks, &self.config.tolerance, ranked)
            })
            .collect();
        timings.sequence_expansion = start.elapsed();

        let stats = TagSearchStats {
            num_peaks: peaks.len(),
            num_edges: graph.num_edges(),
            num_roots: roots.len(),
            num_paths,
            num_unique_signatures,
            aborted,
        };
        debug!("Tag search stats: {:?}", stats);
        debug!("{:?}", timings);

        TagSearchResult {
            tags,
            timings,
            stats,
        }
    }

    /// Searches many spectra in parallel. Results keep the input order.
    pub fn find_tags_batch(&self, spectra: &[PeakList]) -> Vec<TagSearchResult> {
        let start = Instant::now();

        #[cfg(not(feature = "serial_scoring"))]
        let results: Vec<TagSearchResult> =
            spectra.par_iter().map(|peaks| self.find_tags(peaks)).collect();

        #[cfg(feature = "serial_scoring")]
        let results: Vec<TagSearchResult> =
            spectra.iter().map(|peaks| self.find_tags(peaks)).collect();

        let elapsed = start.elapsed();
        let num_tags: usize = results.iter().map(|r| r.tags.len()).sum();
        let throughput = spectra.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        info!(
            "Searched {} spectra in {:?} ({:#.1} spectra/s), reporting {} tags",
            spectra.len(),
            elapsed,
            throughput,
            num_tags
        );

        results
    }

    fn empty_manager(&self) -> CandidateManager {
        CandidateManager::new(self.config.max_candidates, self.config.weights())
    }

    fn walk_roots(
        &self,
        graph: &MassGapGraph,
        peaks: &PeakList,
        roots: &[usize],
        abort: &AtomicBool,
    ) -> TraversalAccumulator {
        let emitted = AtomicUsize::new(0);
        let init_fn = || {
            (
                PathWalker::new(graph, self.config.max_tag_length),
                TagScorer::new(graph, peaks, self.config.cell_width),
            )
        };

        #[cfg(not(feature = "serial_scoring"))]
        if self.config.parallel {
            return roots
                .par_iter()
                .map_init(init_fn, |(walker, scorer), &root| {
                    self.walk_root(graph, walker, scorer, root, abort, &emitted)
                })
                .collect();
        }

        let (mut walker, mut scorer) = init_fn();
        roots
            .iter()
            .map(|&root| self.walk_root(graph, &mut walker, &mut scorer, root, abort, &emitted))
            .collect()
    }

    fn walk_root(
        &self,
        graph: &MassGapGraph,
        walker: &mut PathWalker<'_>,
        scorer: &mut TagScorer<'_>,
        root: usize,
        abort: &AtomicBool,
        emitted: &AtomicUsize,
    ) -> RootSearch {
        scorer.reset_cache();
        let mut candidates = self.empty_manager();
        let mut num_paths = 0;
        let budget = self.config.max_paths_per_spectrum;
        let min_tag_length = self.config.min_tag_length;

        let outcome = walker.walk_from(root, abort, &mut |edges: &[EdgeId]| {
            if let Some(budget) = budget {
                if emitted.fetch_add(1, Ordering::Relaxed) >= budget {
                    abort.store(true, Ordering::Relaxed);
                    return;
                }
            }
            num_paths += 1;
            if edges.len() < min_tag_length {
                return;
            }

            let scores = scorer.score(edges);
            let path = TagPath::from_slice(edges);
            let signature = path.signature(graph);
            candidates.add(TagCandidate::new(path, signature, scores));
        });

        RootSearch {
            candidates,
            num_paths,
            aborted: outcome.aborted,
        }
    }
}
