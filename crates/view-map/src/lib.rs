//! Feature-edge graph core for stylized line rendering.
//!
//! A polygon mesh seen from a camera viewpoint yields feature curves:
//! silhouettes, creases, borders, ridges and valleys, suggestive contours.
//! This crate owns the per-shape graph those curves live in: vertices with
//! projected positions and normal sets, polymorphic feature edges chained
//! into curves, and the shape-level structural operations (edge splitting,
//! chain maintenance, structural cloning) that the surrounding view-map
//! construction and visibility passes drive.
//!
//! The crate is deliberately passive about everything it stores for others:
//! visibility results, view-map aggregation handles, and curvature payloads
//! are recorded on the graph but computed elsewhere.
//!
//! All operations are synchronous and assume exclusive access to the shape
//! being mutated. A shape is plain data plus arena keys, so handing a fully
//! built shape to a read-only consumer is an ordinary ownership transfer.

pub mod geometry;
pub mod validation;
pub mod view_map;

pub use geometry::{BBox3, BoundingVolume, Point2d, Point3d, Polygon3, Vec3};
pub use validation::{AuditConfig, ShapeAudit, audit_shape};
pub use view_map::{
    EdgeId, EdgeKind, EdgeNature, FeatureEdge, FeatureShape, FeatureVertex, Id, SplitParam,
    SplitScope, VertexId, ViewMapError,
};
