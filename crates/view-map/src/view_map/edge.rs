use serde::{Deserialize, Serialize};

use super::handles::{MeshEdgeHandle, MeshFaceHandle, ViewEdgeHandle};
use super::nature::EdgeNature;
use super::{EdgeId, Id, VertexId};
use crate::geometry::{Point3d, Polygon3, Vec3};

/// Payload of a sharp feature edge, one that coincides with an edge of the
/// source mesh (silhouette, crease or border).
///
/// "Right" and "left" are relative to walking the edge from A to B. A border
/// edge has no face on its right; its right-side normal and material index
/// stay at their defaults and callers must check the edge nature before
/// trusting them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharpData {
    pub normal_right: Vec3,
    pub normal_left: Vec3,
    pub material_right: u32,
    pub material_left: u32,
    /// The mesh edge this feature edge was extracted from.
    pub source_edge: Option<MeshEdgeHandle>,
}

/// Payload of a smooth feature edge, one that crosses a face interior
/// (interpolated silhouette, ridge/valley, suggestive contour).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothData {
    /// Interpolated surface normal along the crossing.
    pub normal: Vec3,
    pub material: u32,
    /// The mesh face the edge runs across.
    pub face: Option<MeshFaceHandle>,
}

/// Payload of an edge produced by a face-face intersection. Carries the two
/// originating faces and nothing else; normals and materials are undefined
/// for a derived curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntersectionData {
    pub face_1: Option<MeshFaceHandle>,
    pub face_2: Option<MeshFaceHandle>,
}

/// Kind-specific state of a feature edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeKind {
    Sharp(SharpData),
    Smooth(SmoothData),
    Intersection(IntersectionData),
}

/// A directed edge of the feature graph.
///
/// Carries the endpoint keys, its feature nature, the doubly linked chain
/// neighbors, and the visibility bookkeeping the external pass fills in.
/// Kind-specific geometry lives in the [`EdgeKind`] payload. Queries that
/// need endpoint *positions* (2D length, canonical direction, centers) live
/// on [`FeatureShape`](super::FeatureShape), which owns the vertex arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEdge {
    id: Id,
    vertex_a: VertexId,
    vertex_b: VertexId,
    nature: EdgeNature,
    /// Next edge in the containing chain; `None` at the chain tail.
    next_edge: Option<EdgeId>,
    /// Previous edge in the containing chain; `None` at the chain head.
    previous_edge: Option<EdgeId>,
    /// The view-edge aggregate this edge was grouped into, set by the
    /// external construction pass.
    view_edge: Option<ViewEdgeHandle>,
    is_smooth: bool,
    kind: EdgeKind,

    // Visibility bookkeeping, written by the external visibility pass.
    /// The occluded face lying on the right of a silhouette edge.
    occluded_face: Polygon3,
    occludee_intersection: Point3d,
    occludee_empty: bool,
}

impl FeatureEdge {
    fn with_kind(vertex_a: VertexId, vertex_b: VertexId, is_smooth: bool, kind: EdgeKind) -> Self {
        Self {
            id: Id::default(),
            vertex_a,
            vertex_b,
            nature: EdgeNature::NoFeature,
            next_edge: None,
            previous_edge: None,
            view_edge: None,
            is_smooth,
            kind,
            occluded_face: Polygon3::default(),
            occludee_intersection: Point3d::ORIGIN,
            occludee_empty: true,
        }
    }

    /// A sharp edge from `vertex_a` to `vertex_b`.
    pub fn sharp(vertex_a: VertexId, vertex_b: VertexId) -> Self {
        Self::with_kind(vertex_a, vertex_b, false, EdgeKind::Sharp(SharpData::default()))
    }

    /// A smooth edge from `vertex_a` to `vertex_b`.
    pub fn smooth(vertex_a: VertexId, vertex_b: VertexId) -> Self {
        Self::with_kind(vertex_a, vertex_b, true, EdgeKind::Smooth(SmoothData::default()))
    }

    /// A face-face intersection edge from `vertex_a` to `vertex_b`.
    ///
    /// Freshly built intersection edges take the smooth construction path and
    /// start with `is_smooth() == true`; see [`FeatureEdge::duplicate`] for
    /// the copy-path exception.
    pub fn intersection(vertex_a: VertexId, vertex_b: VertexId) -> Self {
        Self::with_kind(
            vertex_a,
            vertex_b,
            true,
            EdgeKind::Intersection(IntersectionData::default()),
        )
    }

    /// Copy this edge, preserving the variant.
    ///
    /// Intersection edges come out with `is_smooth() == false` even though
    /// construction sets it true: cusp detection and ray casting treat a
    /// copied intersection edge as a distinct case from ordinary smooth
    /// edges. Both paths are observable downstream, so neither may change.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        if matches!(copy.kind, EdgeKind::Intersection(_)) {
            copy.is_smooth = false;
        }
        copy
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    /// First endpoint.
    pub fn vertex_a(&self) -> VertexId {
        self.vertex_a
    }

    /// Second endpoint.
    pub fn vertex_b(&self) -> VertexId {
        self.vertex_b
    }

    pub fn set_vertex_a(&mut self, v: VertexId) {
        self.vertex_a = v;
    }

    pub fn set_vertex_b(&mut self, v: VertexId) {
        self.vertex_b = v;
    }

    pub fn nature(&self) -> EdgeNature {
        self.nature
    }

    pub fn set_nature(&mut self, nature: EdgeNature) {
        self.nature = nature;
    }

    /// Next edge in the chain, `None` at the tail.
    pub fn next_edge(&self) -> Option<EdgeId> {
        self.next_edge
    }

    pub fn set_next_edge(&mut self, edge: Option<EdgeId>) {
        self.next_edge = edge;
    }

    /// Previous edge in the chain, `None` at the head.
    pub fn previous_edge(&self) -> Option<EdgeId> {
        self.previous_edge
    }

    pub fn set_previous_edge(&mut self, edge: Option<EdgeId>) {
        self.previous_edge = edge;
    }

    pub fn view_edge(&self) -> Option<ViewEdgeHandle> {
        self.view_edge
    }

    pub fn set_view_edge(&mut self, handle: Option<ViewEdgeHandle>) {
        self.view_edge = handle;
    }

    /// Whether this edge crosses a face interior rather than following a
    /// mesh edge. For intersection edges the answer depends on how the edge
    /// was produced; see [`FeatureEdge::duplicate`].
    pub fn is_smooth(&self) -> bool {
        self.is_smooth
    }

    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    pub fn as_sharp(&self) -> Option<&SharpData> {
        match &self.kind {
            EdgeKind::Sharp(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_sharp_mut(&mut self) -> Option<&mut SharpData> {
        match &mut self.kind {
            EdgeKind::Sharp(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_smooth(&self) -> Option<&SmoothData> {
        match &self.kind {
            EdgeKind::Smooth(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_smooth_mut(&mut self) -> Option<&mut SmoothData> {
        match &mut self.kind {
            EdgeKind::Smooth(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_intersection(&self) -> Option<&IntersectionData> {
        match &self.kind {
            EdgeKind::Intersection(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_intersection_mut(&mut self) -> Option<&mut IntersectionData> {
        match &mut self.kind {
            EdgeKind::Intersection(data) => Some(data),
            _ => None,
        }
    }

    /// First originating mesh face: the crossed face for smooth edges, the
    /// first intersecting face for intersection edges. Sharp edges have no
    /// face payload of their own.
    pub fn face_1(&self) -> Option<MeshFaceHandle> {
        match &self.kind {
            EdgeKind::Sharp(_) => None,
            EdgeKind::Smooth(data) => data.face,
            EdgeKind::Intersection(data) => data.face_1,
        }
    }

    /// Second originating mesh face; only intersection edges have one.
    pub fn face_2(&self) -> Option<MeshFaceHandle> {
        match &self.kind {
            EdgeKind::Intersection(data) => data.face_2,
            _ => None,
        }
    }

    /// The two endpoints as a restartable, finite sequence.
    pub fn vertices(&self) -> impl DoubleEndedIterator<Item = VertexId> + use<> {
        [self.vertex_a, self.vertex_b].into_iter()
    }

    /// Point sampling along the edge. Currently always yields the two
    /// endpoints whatever `_sampling` asks for; intermediate points are not
    /// interpolated.
    pub fn points(&self, _sampling: f64) -> impl DoubleEndedIterator<Item = VertexId> + use<> {
        self.vertices()
    }

    /// The occluded face recorded by the visibility pass.
    pub fn occluded_face(&self) -> &Polygon3 {
        &self.occluded_face
    }

    pub fn set_occluded_face(&mut self, face: Polygon3) {
        self.occluded_face = face;
    }

    /// Where the occluding ray hit the occludee.
    pub fn occludee_intersection(&self) -> Point3d {
        self.occludee_intersection
    }

    pub fn set_occludee_intersection(&mut self, p: Point3d) {
        self.occludee_intersection = p;
    }

    /// True while no occludee has been recorded.
    pub fn occludee_empty(&self) -> bool {
        self.occludee_empty
    }

    pub fn set_occludee_empty(&mut self, empty: bool) {
        self.occludee_empty = empty;
    }
}
