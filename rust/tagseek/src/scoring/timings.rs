//! Timing instrumentation for the tag search.
//!
//! Per-stage wall time of a single spectrum search. Batches add the
//! timings of every spectrum together.

use serde::Serialize;
use std::time::Duration;

/// Accumulated timing measurements for the four search stages.
///
/// # Example
///
/// ```ignore
/// let result = finder.find_tags(&peaks);
/// println!("Traversal: {}ms", result.timings.traversal.as_millis());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TagSearchTimings {
    /// Building the mass-gap graph.
    pub graph_build: Duration,

    /// Walking and scoring every path. Usually dominates.
    pub traversal: Duration,

    /// Combined scores and top-K selection.
    pub finalization: Duration,

    /// Expanding the kept tags into residue strings.
    pub sequence_expansion: Duration,
}

impl TagSearchTimings {
    pub fn total(&self) -> Duration {
        self.graph_build + self.traversal + self.finalization + self.sequence_expansion
    }
}

impl Serialize for TagSearchTimings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("TagSearchTimings", 4)?;
        state.serialize_field("graph_build_ms", &self.graph_build.as_millis())?;
        state.serialize_field("traversal_ms", &self.traversal.as_millis())?;
        state.serialize_field("finalization_ms", &self.finalization.as_millis())?;
        state.serialize_field(
            "sequence_expansion_ms",
            &self.sequence_expansion.as_millis(),
        )?;
        state.end()
    }
}

impl std::ops::AddAssign for TagSearchTimings {
    fn add_assign(&mut self, rhs: Self) {
        self.graph_build += rhs.graph_build;
        self.traversal += rhs.traversal;
        self.finalization += rhs.finalization;
        self.sequence_expansion += rhs.sequence_expansion;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_in_millis() {
        let timings = TagSearchTimings {
            graph_build: Duration::from_millis(3),
            traversal: Duration::from_micros(12_500),
            ..Default::default()
        };
        let json = serde_json::to_value(timings).unwrap();
        assert_eq!(json["graph_build_ms"], 3);
        assert_eq!(json["traversal_ms"], 12);
        assert_eq!(json["sequence_expansion_ms"], 0);
    }

    #[test]
    fn test_add_assign() {
        let mut total = TagSearchTimings::default();
        let one = TagSearchTimings {
            traversal: Duration::from_millis(5),
            ..Default::default()
        };
        total += one;
        total += one;
        assert_eq!(total.traversal, Duration::from_millis(10));
        assert_eq!(total.total(), Duration::from_millis(10));
    }
}
