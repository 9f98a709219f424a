use serde::{Deserialize, Serialize};

use super::curvature::CurvatureInfo;
use super::handles::{MeshEdgeHandle, MeshVertexHandle, ViewVertexHandle};
use super::{EdgeId, Id, ViewMapError};
use crate::geometry::{Point2d, Point3d, Vec3};

/// A vertex of the feature graph: a mesh-derived 3D point together with its
/// camera-space projection.
///
/// The projected position keeps three components: image-space x and y plus
/// the depth in z, so visibility ordering can reuse it directly.
///
/// `Clone` is a standalone copy: positions, normals, and curvature are
/// duplicated, but the incident-edge list still indexes the *original*
/// shape's arena. Only whole-shape cloning
/// ([`FeatureShape::clone_shape`](super::FeatureShape::clone_shape)) remaps
/// those references into the copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVertex {
    id: Id,
    point_3d: Point3d,
    point_2d: Point3d,
    /// Distinct surface normals at this vertex. One entry on a smooth
    /// surface; several where faces with different normals meet.
    normals: Vec<Vec3>,
    /// Incident feature edges, in registration order.
    fedges: Vec<EdgeId>,
    /// Owning shape, set when the vertex is registered.
    shape_id: Id,
    view_vertex: Option<ViewVertexHandle>,
    curvature: Option<CurvatureInfo>,
    /// For sharp features: the mesh vertex this one came from.
    source_vertex: Option<MeshVertexHandle>,
    /// For smooth features: the mesh edge this vertex lies on.
    source_edge: Option<MeshEdgeHandle>,
}

impl FeatureVertex {
    pub fn new(point_3d: Point3d, id: Id) -> Self {
        Self {
            id,
            point_3d,
            point_2d: Point3d::ORIGIN,
            normals: Vec::new(),
            fedges: Vec::new(),
            shape_id: Id::default(),
            view_vertex: None,
            curvature: None,
            source_vertex: None,
            source_edge: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub fn point_3d(&self) -> Point3d {
        self.point_3d
    }

    pub fn set_point_3d(&mut self, p: Point3d) {
        self.point_3d = p;
    }

    /// Projected position: image-space x, y and depth in z.
    pub fn point_2d(&self) -> Point3d {
        self.point_2d
    }

    pub fn set_point_2d(&mut self, p: Point3d) {
        self.point_2d = p;
    }

    /// Image-space position without the depth component.
    pub fn projected_xy(&self) -> Point2d {
        self.point_2d.xy()
    }

    /// Projected depth.
    pub fn z(&self) -> f64 {
        self.point_2d.z
    }

    /// Add a normal; inserting a normal already present is a no-op.
    pub fn add_normal(&mut self, normal: Vec3) {
        if !self.normals.contains(&normal) {
            self.normals.push(normal);
        }
    }

    /// The distinct normals stored at this vertex.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn normals_size(&self) -> usize {
        self.normals.len()
    }

    /// The vertex normal, defined only when exactly one normal is stored.
    /// At a crease several faces meet with different normals and no single
    /// one is "the" normal.
    pub fn normal(&self) -> Result<Vec3, ViewMapError> {
        match self.normals.as_slice() {
            [n] => Ok(*n),
            other => Err(ViewMapError::AmbiguousNormal { count: other.len() }),
        }
    }

    /// Incident feature edges, in registration order.
    pub fn fedges(&self) -> &[EdgeId] {
        &self.fedges
    }

    pub fn set_fedges(&mut self, fedges: Vec<EdgeId>) {
        self.fedges = fedges;
    }

    /// Register an incident edge.
    pub fn add_fedge(&mut self, edge: EdgeId) {
        self.fedges.push(edge);
    }

    /// Substitute `new` for `old` in the incident-edge list, keeping every
    /// other entry in its relative position. Silent no-op when `old` is not
    /// incident. Downstream edge-ordering queries rely on the list order, so
    /// the substitution happens in place rather than remove-then-append.
    pub fn replace_edge(&mut self, old: EdgeId, new: EdgeId) {
        if let Some(pos) = self.fedges.iter().position(|&e| e == old) {
            self.fedges[pos] = new;
        }
    }

    pub fn shape_id(&self) -> Id {
        self.shape_id
    }

    pub(super) fn set_shape_id(&mut self, id: Id) {
        self.shape_id = id;
    }

    pub fn view_vertex(&self) -> Option<ViewVertexHandle> {
        self.view_vertex
    }

    pub fn set_view_vertex(&mut self, handle: Option<ViewVertexHandle>) {
        self.view_vertex = handle;
    }

    pub fn curvature(&self) -> Option<&CurvatureInfo> {
        self.curvature.as_ref()
    }

    pub fn set_curvature(&mut self, info: Option<CurvatureInfo>) {
        self.curvature = info;
    }

    pub fn source_vertex(&self) -> Option<MeshVertexHandle> {
        self.source_vertex
    }

    pub fn set_source_vertex(&mut self, handle: Option<MeshVertexHandle>) {
        self.source_vertex = handle;
    }

    pub fn source_edge(&self) -> Option<MeshEdgeHandle> {
        self.source_edge
    }

    pub fn set_source_edge(&mut self, handle: Option<MeshEdgeHandle>) {
        self.source_edge = handle;
    }
}

/// Vertices compare by geometry: same 3D point and same projection.
impl PartialEq for FeatureVertex {
    fn eq(&self, other: &Self) -> bool {
        self.point_3d == other.point_3d && self.point_2d == other.point_2d
    }
}
