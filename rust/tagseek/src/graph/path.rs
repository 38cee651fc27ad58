use serde::Serialize;

use super::builder::{
    EdgeId,
    MassGapEdge,
    MassGapGraph,
};

/// Nominal mass sequence of a tag, one byte per edge.
///
/// Two tags with the same signature are treated as the same tag, even if
/// they were read off different peaks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TagSignature(Vec<u8>);

impl TagSignature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for TagSignature {
    fn from(x: Vec<u8>) -> Self {
        Self(x)
    }
}

/// A walk through the mass-gap graph, stored as edge ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TagPath {
    edges: Vec<EdgeId>,
}

impl TagPath {
    pub fn new(edges: Vec<EdgeId>) -> Self {
        Self { edges }
    }

    pub fn from_slice(edges: &[EdgeId]) -> Self {
        Self {
            edges: edges.to_vec(),
        }
    }

    /// Number of edges (residues) in the tag.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn edges<'g>(&'g self, graph: &'g MassGapGraph) -> impl Iterator<Item = &'g MassGapEdge> + 'g {
        self.edges.iter().map(move |id| graph.edge(*id))
    }

    pub fn signature(&self, graph: &MassGapGraph) -> TagSignature {
        TagSignature(self.edges(graph).map(|e| e.nominal_mass).collect())
    }

    /// Peak indices visited by the path, in order (`len() + 1` entries).
    pub fn peak_indices(&self, graph: &MassGapGraph) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.edges.len() + 1);
        let mut edges = self.edges(graph);
        if let Some(first) = edges.next() {
            out.push(first.source);
            out.push(first.target);
        }
        out.extend(edges.map(|e| e.target));
        out
    }

    pub fn first_peak(&self, graph: &MassGapGraph) -> Option<usize> {
        self.edges.first().map(|id| graph.edge(*id).source)
    }

    pub fn last_peak(&self, graph: &MassGapGraph) -> Option<usize> {
        self.edges.last().map(|id| graph.edge(*id).target)
    }
}
