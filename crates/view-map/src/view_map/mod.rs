//! The per-shape feature-edge graph.
//!
//! A shape-building stage extracts feature curves (silhouettes, creases,
//! borders, ridges/valleys, suggestive contours) from one input mesh and
//! records them here as [`FeatureVertex`] / [`FeatureEdge`] entities owned by
//! a [`FeatureShape`]. The graph supports the structural operations the later
//! passes need: incremental edge splitting at intersection points, chain
//! maintenance, and structural cloning. Visibility and global view-map
//! assembly are external; their results are stored on the entities but never
//! computed here.

pub mod curvature;
pub mod edge;
pub mod handles;
pub mod material;
pub mod nature;
pub mod shape;
pub mod vertex;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

pub use curvature::CurvatureInfo;
pub use edge::{EdgeKind, FeatureEdge, IntersectionData, SharpData, SmoothData};
pub use handles::{
    MeshEdgeHandle, MeshFaceHandle, MeshVertexHandle, ViewEdgeHandle, ViewShapeHandle,
    ViewVertexHandle,
};
pub use material::Material;
pub use nature::EdgeNature;
pub use shape::{FeatureShape, SplitParam, SplitScope};
pub use vertex::FeatureVertex;

new_key_type! {
    /// Arena key for a vertex within its owning shape.
    pub struct VertexId;
    /// Arena key for a feature edge within its owning shape.
    pub struct EdgeId;
}

/// Two-part identifier carried by shapes and graph elements for provenance
/// and deduplication. Distinct from the arena keys, which are storage-local.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Id {
    pub first: u32,
    pub second: u32,
}

impl Id {
    pub fn new(first: u32, second: u32) -> Self {
        Self { first, second }
    }
}

/// Errors reported by the feature graph. Everything else that can go wrong is
/// either a silent no-op (idempotent cleanup calls on absent targets) or a
/// caller-contract violation left unchecked in release builds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewMapError {
    /// A single-normal query on a vertex that stores several distinct normals
    /// (a crease vertex). Check the normal count first.
    #[error("vertex stores {count} normals, a single-normal query is ambiguous")]
    AmbiguousNormal { count: usize },

    /// Structural cloning hit a chain or incidence reference whose target is
    /// not registered with the shape being cloned.
    #[error("edge {edge:?} links to an element that is not registered with the shape")]
    DanglingChainReference { edge: Id },
}
