use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::edge::FeatureEdge;
use super::handles::ViewShapeHandle;
use super::material::Material;
use super::vertex::FeatureVertex;
use super::{EdgeId, Id, VertexId, ViewMapError};
use crate::geometry::{BBox3, Point3d, Vec3};

/// Fractional split position along an edge, measured from vertex A.
///
/// `t_3d` interpolates the 3D positions, `t_2d` the projected positions; the
/// two differ because projection is not affine in depth. Both must lie
/// strictly inside (0, 1); a parameter on or outside the endpoints is a
/// caller-contract violation, checked only in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitParam {
    pub t_3d: f64,
    pub t_2d: f64,
}

impl SplitParam {
    pub fn new(t_3d: f64, t_2d: f64) -> Self {
        Self { t_3d, t_2d }
    }
}

/// Per-call-scope marker tracking which edges a multi-edge split pass has
/// already processed.
///
/// Several feature edges (a silhouette and a crease, say) can lie on the same
/// geometric mesh edge and must be split at the same parameters. The caller
/// keeps one scope for the whole pass so a second request against an
/// already-split edge is a no-op, and clears it when the pass is done.
#[derive(Debug, Default)]
pub struct SplitScope {
    processed: HashSet<EdgeId>,
}

impl SplitScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processed(&self, edge: EdgeId) -> bool {
        self.processed.contains(&edge)
    }

    pub fn mark(&mut self, edge: EdgeId) {
        self.processed.insert(edge);
    }

    pub fn clear(&mut self) {
        self.processed.clear();
    }
}

/// The feature elements extracted from one input shape: the full vertex and
/// edge inventory plus the entry points of the feature chains.
///
/// Vertices and edges live in arenas owned by the shape; all cross-references
/// are arena keys. Insertion order is tracked separately so iteration is
/// stable and ordered while no mutation occurs. Destroying the shape frees
/// everything at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureShape {
    id: Id,
    vertices: SlotMap<VertexId, FeatureVertex>,
    edges: SlotMap<EdgeId, FeatureEdge>,
    vertices_order: Vec<VertexId>,
    edges_order: Vec<EdgeId>,
    /// Starting edges of the feature chains.
    chain_starts: Vec<EdgeId>,
    bbox: BBox3,
    materials: Vec<Material>,
    importance: f32,
    view_shape: Option<ViewShapeHandle>,
}

impl FeatureShape {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            vertices_order: Vec::new(),
            edges_order: Vec::new(),
            chain_starts: Vec::new(),
            bbox: BBox3::new(),
            materials: Vec::new(),
            importance: 0.0,
            view_shape: None,
        }
    }

    // ─── Registration ───────────────────────────────────────────────────────

    /// Allocate a vertex owned by this shape and return its key, usable
    /// immediately.
    pub fn create_vertex(&mut self, point_3d: Point3d, point_2d: Point3d, id: Id) -> VertexId {
        let mut vertex = FeatureVertex::new(point_3d, id);
        vertex.set_point_2d(point_2d);
        self.add_vertex(vertex)
    }

    /// Register a prebuilt vertex, stamping its owning-shape back-reference.
    pub fn add_vertex(&mut self, mut vertex: FeatureVertex) -> VertexId {
        vertex.set_shape_id(self.id);
        let key = self.vertices.insert(vertex);
        self.vertices_order.push(key);
        key
    }

    /// Register an edge. Append-only; uniqueness is caller discipline.
    pub fn add_edge(&mut self, edge: FeatureEdge) -> EdgeId {
        let key = self.edges.insert(edge);
        self.edges_order.push(key);
        key
    }

    pub fn add_sharp_edge(&mut self, vertex_a: VertexId, vertex_b: VertexId) -> EdgeId {
        self.add_edge(FeatureEdge::sharp(vertex_a, vertex_b))
    }

    pub fn add_smooth_edge(&mut self, vertex_a: VertexId, vertex_b: VertexId) -> EdgeId {
        self.add_edge(FeatureEdge::smooth(vertex_a, vertex_b))
    }

    pub fn add_intersection_edge(&mut self, vertex_a: VertexId, vertex_b: VertexId) -> EdgeId {
        self.add_edge(FeatureEdge::intersection(vertex_a, vertex_b))
    }

    /// Record an edge as the starting point of a feature chain.
    pub fn add_chain_start(&mut self, edge: EdgeId) {
        self.chain_starts.push(edge);
    }

    // ─── Access ─────────────────────────────────────────────────────────────

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub fn vertex(&self, key: VertexId) -> Option<&FeatureVertex> {
        self.vertices.get(key)
    }

    pub fn vertex_mut(&mut self, key: VertexId) -> Option<&mut FeatureVertex> {
        self.vertices.get_mut(key)
    }

    pub fn edge(&self, key: EdgeId) -> Option<&FeatureEdge> {
        self.edges.get(key)
    }

    pub fn edge_mut(&mut self, key: EdgeId) -> Option<&mut FeatureEdge> {
        self.edges.get_mut(key)
    }

    /// Vertices in registration order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &FeatureVertex)> {
        self.vertices_order.iter().map(|&k| (k, &self.vertices[k]))
    }

    /// Edges in registration order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &FeatureEdge)> {
        self.edges_order.iter().map(|&k| (k, &self.edges[k]))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges_order.len()
    }

    /// Chain starting edges, in registration order.
    pub fn chain_starts(&self) -> &[EdgeId] {
        &self.chain_starts
    }

    pub fn bbox(&self) -> &BBox3 {
        &self.bbox
    }

    pub fn set_bbox(&mut self, bbox: BBox3) {
        self.bbox = bbox;
    }

    pub fn material(&self, index: u32) -> Option<&Material> {
        self.materials.get(index as usize)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn set_materials(&mut self, materials: Vec<Material>) {
        self.materials = materials;
    }

    pub fn importance(&self) -> f32 {
        self.importance
    }

    pub fn set_importance(&mut self, importance: f32) {
        self.importance = importance;
    }

    pub fn view_shape(&self) -> Option<ViewShapeHandle> {
        self.view_shape
    }

    pub fn set_view_shape(&mut self, handle: Option<ViewShapeHandle>) {
        self.view_shape = handle;
    }

    // ─── Edge geometry ──────────────────────────────────────────────────────

    /// Image-space length of an edge. Zero when either endpoint reference is
    /// stale; a well-formed graph never produces that.
    pub fn edge_length_2d(&self, edge: EdgeId) -> f64 {
        let Some(e) = self.edges.get(edge) else {
            return 0.0;
        };
        match (self.vertices.get(e.vertex_a()), self.vertices.get(e.vertex_b())) {
            (Some(a), Some(b)) => a.projected_xy().distance_to(&b.projected_xy()),
            _ => 0.0,
        }
    }

    /// The endpoint shared by two edges, `None` when they do not touch or
    /// either edge is absent. Checks A/A, A/B then B/A, B/B, so when both
    /// endpoints coincide the A side wins.
    pub fn common_vertex(&self, e1: EdgeId, e2: EdgeId) -> Option<VertexId> {
        let first = self.edges.get(e1)?;
        let second = self.edges.get(e2)?;
        let (a1, b1) = (first.vertex_a(), first.vertex_b());
        let (a2, b2) = (second.vertex_a(), second.vertex_b());

        if a1 == a2 || a1 == b2 {
            Some(a1)
        } else if b1 == a2 || b1 == b2 {
            Some(b1)
        } else {
            None
        }
    }

    /// The endpoint that comes first in the lexicographic order on projected
    /// positions (x, y, then depth). Canonicalizes edge direction for
    /// deduplication.
    pub fn edge_min_2d(&self, edge: EdgeId) -> Option<VertexId> {
        let e = self.edges.get(edge)?;
        let a = self.vertices.get(e.vertex_a())?;
        let b = self.vertices.get(e.vertex_b())?;
        if a.point_2d().lex_cmp(&b.point_2d()).is_lt() {
            Some(e.vertex_a())
        } else {
            Some(e.vertex_b())
        }
    }

    /// The endpoint that comes last in the lexicographic order on projected
    /// positions.
    pub fn edge_max_2d(&self, edge: EdgeId) -> Option<VertexId> {
        let e = self.edges.get(edge)?;
        let a = self.vertices.get(e.vertex_a())?;
        let b = self.vertices.get(e.vertex_b())?;
        if a.point_2d().lex_cmp(&b.point_2d()).is_lt() {
            Some(e.vertex_b())
        } else {
            Some(e.vertex_a())
        }
    }

    /// Midpoint of an edge in 3D.
    pub fn edge_center_3d(&self, edge: EdgeId) -> Option<Point3d> {
        let e = self.edges.get(edge)?;
        let a = self.vertices.get(e.vertex_a())?;
        let b = self.vertices.get(e.vertex_b())?;
        Some(a.point_3d().midpoint(&b.point_3d()))
    }

    /// Midpoint of an edge in projected space.
    pub fn edge_center_2d(&self, edge: EdgeId) -> Option<Point3d> {
        let e = self.edges.get(edge)?;
        let a = self.vertices.get(e.vertex_a())?;
        let b = self.vertices.get(e.vertex_b())?;
        Some(a.point_2d().midpoint(&b.point_2d()))
    }

    /// Direction B−A in 3D.
    pub fn edge_orientation_3d(&self, edge: EdgeId) -> Option<Vec3> {
        let e = self.edges.get(edge)?;
        let a = self.vertices.get(e.vertex_a())?;
        let b = self.vertices.get(e.vertex_b())?;
        Some(b.point_3d() - a.point_3d())
    }

    /// Direction B−A in projected space.
    pub fn edge_orientation_2d(&self, edge: EdgeId) -> Option<Vec3> {
        let e = self.edges.get(edge)?;
        let a = self.vertices.get(e.vertex_a())?;
        let b = self.vertices.get(e.vertex_b())?;
        Some(b.point_2d() - a.point_2d())
    }

    /// The edge joining two vertices, if one is registered on `a`.
    pub fn fedge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let vertex = self.vertices.get(a)?;
        vertex.fedges().iter().copied().find(|&eid| {
            self.edges
                .get(eid)
                .is_some_and(|e| e.vertex_a() == b || e.vertex_b() == b)
        })
    }

    // ─── Splitting ──────────────────────────────────────────────────────────

    /// Split `edge` in two at `new_vertex`, which must already be registered
    /// with this shape and lie on the edge.
    ///
    /// `edge` keeps the A side (A → new_vertex); a new edge of the same
    /// variant takes over the B side (new_vertex → B) together with the old
    /// successor link, so the chain now runs through both halves in order.
    /// The new edge is registered with the shape and as a chain entry.
    /// Returns the new edge.
    #[instrument(skip(self), fields(shape = ?self.id))]
    pub fn split_edge_in2(&mut self, edge: EdgeId, new_vertex: VertexId) -> EdgeId {
        let (old_b, old_next, mut second_half) = {
            let e = &self.edges[edge];
            (e.vertex_b(), e.next_edge(), e.duplicate())
        };

        second_half.set_vertex_a(new_vertex);
        second_half.set_vertex_b(old_b);
        second_half.set_previous_edge(Some(edge));
        second_half.set_next_edge(old_next);
        let new_edge = self.add_edge(second_half);

        if let Some(next) = old_next {
            self.edges[next].set_previous_edge(Some(new_edge));
        }
        {
            let e = &mut self.edges[edge];
            e.set_vertex_b(new_vertex);
            e.set_next_edge(Some(new_edge));
        }

        // B is no longer an endpoint of the first half; keep its incidence
        // list order intact while swapping in the second half.
        self.vertices[old_b].replace_edge(edge, new_edge);
        let middle = &mut self.vertices[new_vertex];
        middle.add_fedge(edge);
        middle.add_fedge(new_edge);

        self.add_chain_start(new_edge);

        debug!(?edge, ?new_edge, "split edge in two");
        new_edge
    }

    /// Split `edge` at several parameters in one pass.
    ///
    /// `parameters` are fractional positions measured from vertex A, sorted
    /// from the B endpoint toward A (descending), each strictly inside
    /// (0, 1). One vertex and one edge are created per parameter; new edges
    /// are appended to `new_edges`. New vertices inherit vertex A's `Id`.
    ///
    /// `scope` is the per-pass processed marker: an edge already marked is
    /// skipped entirely, which keeps repeated requests for the same geometric
    /// edge idempotent across the feature kinds sharing it. The caller clears
    /// the scope when the whole pass is done.
    #[instrument(skip(self, parameters, scope, new_edges), fields(shape = ?self.id))]
    pub fn split_edge(
        &mut self,
        edge: EdgeId,
        parameters: &[SplitParam],
        scope: &mut SplitScope,
        new_edges: &mut Vec<EdgeId>,
    ) {
        if scope.is_processed(edge) {
            debug!(?edge, "edge already split in this pass");
            return;
        }
        scope.mark(edge);

        let (a3, a2, vertex_id) = {
            let a = &self.vertices[self.edges[edge].vertex_a()];
            (a.point_3d(), a.point_2d(), a.id())
        };
        let (b3, b2) = {
            let b = &self.vertices[self.edges[edge].vertex_b()];
            (b.point_3d(), b.point_2d())
        };

        // Parameters run from B toward A, so each split peels the B-most
        // piece off `edge`, which always retains the A side.
        let mut previous_t = f64::INFINITY;
        for param in parameters {
            debug_assert!(param.t_3d > 0.0 && param.t_3d < 1.0);
            debug_assert!(param.t_2d > 0.0 && param.t_2d < 1.0);
            debug_assert!(param.t_3d < previous_t);
            previous_t = param.t_3d;

            let point_3d = a3.lerp(&b3, param.t_3d);
            let point_2d = a2.lerp(&b2, param.t_2d);
            let middle = self.create_vertex(point_3d, point_2d, vertex_id);
            let second_half = self.split_edge_in2(edge, middle);
            scope.mark(second_half);
            new_edges.push(second_half);
        }

        debug!(?edge, count = parameters.len(), "split edge at parameters");
    }

    // ─── Removal ────────────────────────────────────────────────────────────

    /// Remove a vertex by identity. Silent no-op when absent. Incident edges
    /// are left untouched; the caller repairs or removes them.
    pub fn remove_vertex(&mut self, vertex: VertexId) {
        if let Some(pos) = self.vertices_order.iter().position(|&v| v == vertex) {
            self.vertices_order.remove(pos);
            self.vertices.remove(vertex);
        }
    }

    /// Remove an edge by identity. Silent no-op when absent. Neighboring
    /// chain links are not repaired here: call sites must fix the neighbors'
    /// `next`/`previous` (and the chain-start list) or the chain dangles.
    pub fn remove_edge(&mut self, edge: EdgeId) {
        if let Some(pos) = self.edges_order.iter().position(|&e| e == edge) {
            self.edges_order.remove(pos);
            self.edges.remove(edge);
        }
    }

    /// Unregister an edge from the chain-start list. Silent no-op when the
    /// edge is not a chain start.
    pub fn remove_edge_from_chain(&mut self, edge: EdgeId) {
        if let Some(pos) = self.chain_starts.iter().position(|&e| e == edge) {
            self.chain_starts.remove(pos);
        }
    }

    // ─── Bounding box ───────────────────────────────────────────────────────

    /// Recompute the bounding box over all vertices from scratch. No-op on an
    /// empty vertex list: the previous box is left in place, so callers that
    /// emptied the shape and need an empty box must `clear` it themselves.
    pub fn compute_bbox(&mut self) {
        if self.vertices_order.is_empty() {
            return;
        }
        let mut bbox = BBox3::new();
        for &key in &self.vertices_order {
            bbox.expand_to_include(self.vertices[key].point_3d());
        }
        self.bbox = bbox;
    }

    // ─── Structural clone ───────────────────────────────────────────────────

    /// Deep-copy the whole shape, remapping every cross-reference (vertex
    /// incidence lists, edge endpoints, chain links, chain starts) into the
    /// copy.
    ///
    /// The copy runs in two passes: first every vertex and edge is cloned in
    /// registration order while a transient original→clone key map is built,
    /// then all references are translated through the map. Edges and vertices
    /// reference each other in both directions, so no single pass can resolve
    /// the links. A reference whose target was never registered with this
    /// shape (a stale chain link or incidence entry) fails the clone with
    /// [`ViewMapError::DanglingChainReference`] instead of producing a
    /// half-wired graph.
    #[instrument(skip(self), fields(shape = ?self.id))]
    pub fn clone_shape(&self) -> Result<FeatureShape, ViewMapError> {
        let mut clone = FeatureShape::new(self.id);
        clone.bbox = self.bbox;
        clone.materials = self.materials.clone();
        clone.importance = self.importance;
        clone.view_shape = self.view_shape;

        // Pass 1: copy entities, recording original→clone keys.
        let mut vertex_map: SecondaryMap<VertexId, VertexId> = SecondaryMap::new();
        for &key in &self.vertices_order {
            let copy = self.vertices[key].clone();
            let new_key = clone.vertices.insert(copy);
            clone.vertices_order.push(new_key);
            vertex_map.insert(key, new_key);
        }

        let mut edge_map: SecondaryMap<EdgeId, EdgeId> = SecondaryMap::new();
        for &key in &self.edges_order {
            let copy = self.edges[key].duplicate();
            let new_key = clone.edges.insert(copy);
            clone.edges_order.push(new_key);
            edge_map.insert(key, new_key);
        }

        // Pass 2: translate references through the maps.
        for &key in &self.vertices_order {
            let original = &self.vertices[key];
            let mapped = original
                .fedges()
                .iter()
                .map(|&e| {
                    edge_map
                        .get(e)
                        .copied()
                        .ok_or(ViewMapError::DanglingChainReference { edge: original.id() })
                })
                .collect::<Result<Vec<_>, _>>()?;
            clone.vertices[vertex_map[key]].set_fedges(mapped);
        }

        for &key in &self.edges_order {
            let original = &self.edges[key];
            let dangling = || ViewMapError::DanglingChainReference {
                edge: original.id(),
            };

            let a = vertex_map.get(original.vertex_a()).copied().ok_or_else(dangling)?;
            let b = vertex_map.get(original.vertex_b()).copied().ok_or_else(dangling)?;
            let next = original
                .next_edge()
                .map(|n| edge_map.get(n).copied().ok_or_else(dangling))
                .transpose()?;
            let previous = original
                .previous_edge()
                .map(|p| edge_map.get(p).copied().ok_or_else(dangling))
                .transpose()?;

            let copy = &mut clone.edges[edge_map[key]];
            copy.set_vertex_a(a);
            copy.set_vertex_b(b);
            copy.set_next_edge(next);
            copy.set_previous_edge(previous);
        }

        for &start in &self.chain_starts {
            let mapped = edge_map.get(start).copied().ok_or_else(|| {
                ViewMapError::DanglingChainReference {
                    edge: self.edges.get(start).map(FeatureEdge::id).unwrap_or_default(),
                }
            })?;
            clone.chain_starts.push(mapped);
        }

        debug!(
            vertices = clone.vertices_order.len(),
            edges = clone.edges_order.len(),
            chains = clone.chain_starts.len(),
            "cloned shape"
        );
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_map::EdgeNature;

    fn shape_with_chain(n: usize) -> (FeatureShape, Vec<VertexId>, Vec<EdgeId>) {
        // A polyline of n edges along the x axis, projected 1:1.
        let mut shape = FeatureShape::new(Id::new(1, 0));
        let vertices: Vec<_> = (0..=n)
            .map(|i| {
                let p = Point3d::new(i as f64, 0.0, 0.0);
                shape.create_vertex(p, p, Id::new(1, i as u32))
            })
            .collect();

        let mut edges = Vec::new();
        for w in vertices.windows(2) {
            let e = shape.add_sharp_edge(w[0], w[1]);
            shape.edge_mut(e).unwrap().set_nature(EdgeNature::Silhouette);
            shape.vertex_mut(w[0]).unwrap().add_fedge(e);
            shape.vertex_mut(w[1]).unwrap().add_fedge(e);
            edges.push(e);
        }
        for w in edges.windows(2) {
            shape.edge_mut(w[0]).unwrap().set_next_edge(Some(w[1]));
            shape.edge_mut(w[1]).unwrap().set_previous_edge(Some(w[0]));
        }
        shape.add_chain_start(edges[0]);
        (shape, vertices, edges)
    }

    fn chain_length(shape: &FeatureShape, start: EdgeId) -> usize {
        let mut count = 0;
        let mut current = Some(start);
        while let Some(e) = current {
            count += 1;
            current = shape.edge(e).unwrap().next_edge();
        }
        count
    }

    #[test]
    fn test_create_vertex_sets_owner() {
        let mut shape = FeatureShape::new(Id::new(9, 0));
        let v = shape.create_vertex(Point3d::ORIGIN, Point3d::ORIGIN, Id::new(9, 1));
        assert_eq!(shape.vertex(v).unwrap().shape_id(), Id::new(9, 0));
        assert_eq!(shape.vertex_count(), 1);
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let (shape, vertices, edges) = shape_with_chain(3);
        let listed: Vec<_> = shape.vertices().map(|(k, _)| k).collect();
        assert_eq!(listed, vertices);
        let listed: Vec<_> = shape.edges().map(|(k, _)| k).collect();
        assert_eq!(listed, edges);
    }

    #[test]
    fn test_edge_length_2d() {
        let mut shape = FeatureShape::new(Id::new(1, 0));
        let a = shape.create_vertex(
            Point3d::ORIGIN,
            Point3d::new(0.0, 0.0, 5.0),
            Id::new(1, 0),
        );
        let b = shape.create_vertex(
            Point3d::new(9.0, 9.0, 9.0),
            Point3d::new(3.0, 4.0, -2.0),
            Id::new(1, 1),
        );
        let e = shape.add_sharp_edge(a, b);
        // Depth is excluded from the image-space length.
        assert!((shape.edge_length_2d(e) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_common_vertex_tie_break() {
        let (mut shape, vertices, edges) = shape_with_chain(3);
        assert_eq!(shape.common_vertex(edges[0], edges[1]), Some(vertices[1]));
        assert_eq!(shape.common_vertex(edges[1], edges[0]), Some(vertices[1]));

        // Disjoint edges share nothing.
        assert_eq!(shape.common_vertex(edges[0], edges[2]), None);

        // A removed edge cannot report a shared endpoint.
        shape.remove_edge(edges[1]);
        assert_eq!(shape.common_vertex(edges[0], edges[1]), None);
    }

    #[test]
    fn test_min_max_2d_canonical_order() {
        let mut shape = FeatureShape::new(Id::new(1, 0));
        let hi = shape.create_vertex(Point3d::ORIGIN, Point3d::new(2.0, 0.0, 0.0), Id::new(1, 0));
        let lo = shape.create_vertex(Point3d::ORIGIN, Point3d::new(1.0, 5.0, 0.0), Id::new(1, 1));
        let e = shape.add_sharp_edge(hi, lo);
        assert_eq!(shape.edge_min_2d(e), Some(lo));
        assert_eq!(shape.edge_max_2d(e), Some(hi));
    }

    #[test]
    fn test_split_edge_in2_relinks_chain() {
        let (mut shape, vertices, edges) = shape_with_chain(1);
        let m = shape.create_vertex(
            Point3d::new(0.5, 0.0, 0.0),
            Point3d::new(0.5, 0.0, 0.0),
            Id::new(1, 9),
        );
        let second = shape.split_edge_in2(edges[0], m);

        let first_half = shape.edge(edges[0]).unwrap();
        assert_eq!(first_half.vertex_a(), vertices[0]);
        assert_eq!(first_half.vertex_b(), m);
        assert_eq!(first_half.next_edge(), Some(second));

        let second_half = shape.edge(second).unwrap();
        assert_eq!(second_half.vertex_a(), m);
        assert_eq!(second_half.vertex_b(), vertices[1]);
        assert_eq!(second_half.previous_edge(), Some(edges[0]));
        assert_eq!(second_half.next_edge(), None);

        // The original chain start still references the first half.
        assert!(shape.chain_starts().contains(&edges[0]));
        // B's incidence list swapped the old edge for the second half.
        assert_eq!(shape.vertex(vertices[1]).unwrap().fedges(), &[second]);
        assert_eq!(shape.vertex(m).unwrap().fedges(), &[edges[0], second]);
    }

    #[test]
    fn test_split_edge_in2_preserves_2d_length() {
        let (mut shape, _, edges) = shape_with_chain(1);
        let before = shape.edge_length_2d(edges[0]);
        let m = shape.create_vertex(
            Point3d::new(0.25, 0.0, 0.0),
            Point3d::new(0.25, 0.0, 0.0),
            Id::new(1, 9),
        );
        let second = shape.split_edge_in2(edges[0], m);
        let after = shape.edge_length_2d(edges[0]) + shape.edge_length_2d(second);
        assert!((before - after).abs() < 1e-12);
    }

    #[test]
    fn test_split_edge_in2_preserves_variant() {
        let mut shape = FeatureShape::new(Id::new(1, 0));
        let a = shape.create_vertex(Point3d::ORIGIN, Point3d::ORIGIN, Id::new(1, 0));
        let b = shape.create_vertex(
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Id::new(1, 1),
        );
        let e = shape.add_smooth_edge(a, b);
        shape.vertex_mut(a).unwrap().add_fedge(e);
        shape.vertex_mut(b).unwrap().add_fedge(e);

        let m = shape.create_vertex(
            Point3d::new(0.5, 0.0, 0.0),
            Point3d::new(0.5, 0.0, 0.0),
            Id::new(1, 2),
        );
        let second = shape.split_edge_in2(e, m);
        assert!(shape.edge(second).unwrap().as_smooth().is_some());
    }

    #[test]
    fn test_split_edge_multi_parameters() {
        let (mut shape, vertices, edges) = shape_with_chain(1);
        let mut scope = SplitScope::new();
        let mut new_edges = Vec::new();

        // Sorted from B toward A.
        let params = [SplitParam::new(0.75, 0.75), SplitParam::new(0.25, 0.25)];
        shape.split_edge(edges[0], &params, &mut scope, &mut new_edges);

        assert_eq!(new_edges.len(), 2);
        assert_eq!(shape.vertex_count(), 4);
        assert_eq!(shape.edge_count(), 3);

        // Chain runs A → 0.25 → 0.75 → B.
        let mut xs = Vec::new();
        let mut current = Some(edges[0]);
        while let Some(eid) = current {
            let e = shape.edge(eid).unwrap();
            xs.push(shape.vertex(e.vertex_a()).unwrap().point_3d().x);
            current = e.next_edge();
        }
        assert_eq!(xs, vec![0.0, 0.25, 0.75]);

        // New vertices inherit A's id.
        let a_id = shape.vertex(vertices[0]).unwrap().id();
        for &e in &new_edges {
            let v = shape.edge(e).unwrap().vertex_a();
            assert_eq!(shape.vertex(v).unwrap().id(), a_id);
        }
    }

    #[test]
    fn test_split_edge_is_idempotent_within_scope() {
        let (mut shape, _, edges) = shape_with_chain(1);
        let mut scope = SplitScope::new();
        let mut new_edges = Vec::new();
        let params = [SplitParam::new(0.5, 0.5)];

        shape.split_edge(edges[0], &params, &mut scope, &mut new_edges);
        shape.split_edge(edges[0], &params, &mut scope, &mut new_edges);
        // The half produced by the first split is marked too.
        shape.split_edge(new_edges[0], &params, &mut scope, &mut new_edges);
        assert_eq!(new_edges.len(), 1);
        assert_eq!(shape.edge_count(), 2);

        // A fresh scope splits again.
        scope.clear();
        shape.split_edge(edges[0], &params, &mut scope, &mut new_edges);
        assert_eq!(shape.edge_count(), 3);
    }

    #[test]
    fn test_remove_edge_is_silent_on_absent() {
        let (mut shape, _, edges) = shape_with_chain(1);
        shape.remove_edge(edges[0]);
        assert_eq!(shape.edge_count(), 0);
        shape.remove_edge(edges[0]);
        assert_eq!(shape.edge_count(), 0);
    }

    #[test]
    fn test_remove_edge_leaves_chain_repair_to_caller() {
        let (mut shape, _, edges) = shape_with_chain(3);
        shape.remove_edge(edges[1]);
        // The neighbors still point at the removed edge until the caller
        // repairs them.
        assert_eq!(shape.edge(edges[0]).unwrap().next_edge(), Some(edges[1]));
        assert!(shape.edge(edges[1]).is_none());
    }

    #[test]
    fn test_compute_bbox() {
        let (mut shape, _, _) = shape_with_chain(4);
        shape.compute_bbox();
        let bbox = shape.bbox();
        assert_eq!(*bbox.min().unwrap(), Point3d::ORIGIN);
        assert_eq!(*bbox.max().unwrap(), Point3d::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_compute_bbox_empty_shape_is_noop() {
        let mut shape = FeatureShape::new(Id::new(1, 0));
        shape.set_bbox(BBox3::from_corners(
            Point3d::ORIGIN,
            Point3d::new(1.0, 1.0, 1.0),
        ));
        shape.compute_bbox();
        assert!(!shape.bbox().is_empty());
    }

    #[test]
    fn test_clone_shape_is_isomorphic() {
        let (mut shape, _, edges) = shape_with_chain(3);
        shape.set_importance(2.5);
        shape.set_materials(vec![Material::default()]);
        shape.compute_bbox();

        let clone = shape.clone_shape().unwrap();
        assert_eq!(clone.vertex_count(), shape.vertex_count());
        assert_eq!(clone.edge_count(), shape.edge_count());
        assert_eq!(clone.chain_starts().len(), 1);
        assert_eq!(clone.importance(), 2.5);

        // Same chain length, walked entirely inside the clone.
        assert_eq!(
            chain_length(&clone, clone.chain_starts()[0]),
            chain_length(&shape, edges[0]),
        );

        // Matching degree sequence.
        let degrees = |s: &FeatureShape| -> Vec<usize> {
            s.vertices().map(|(_, v)| v.fedges().len()).collect()
        };
        assert_eq!(degrees(&clone), degrees(&shape));

        // No cloned reference resolves in the original arena's key space:
        // every cloned edge is reachable through the clone itself.
        for (_, v) in clone.vertices() {
            for &e in v.fedges() {
                assert!(clone.edge(e).is_some());
            }
        }
    }

    #[test]
    fn test_clone_shape_fails_on_dangling_chain() {
        let (mut shape, _, edges) = shape_with_chain(2);
        // Drop the middle edge without repairing its neighbors.
        shape.remove_edge(edges[1]);
        let err = shape.clone_shape().unwrap_err();
        assert!(matches!(err, ViewMapError::DanglingChainReference { .. }));
    }

    #[test]
    fn test_clone_preserves_intersection_smoothness_flip() {
        let mut shape = FeatureShape::new(Id::new(1, 0));
        let a = shape.create_vertex(Point3d::ORIGIN, Point3d::ORIGIN, Id::new(1, 0));
        let b = shape.create_vertex(
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Id::new(1, 1),
        );
        let e = shape.add_intersection_edge(a, b);
        shape.vertex_mut(a).unwrap().add_fedge(e);
        shape.vertex_mut(b).unwrap().add_fedge(e);
        assert!(shape.edge(e).unwrap().is_smooth());

        let clone = shape.clone_shape().unwrap();
        let cloned = clone.edges().next().unwrap().1;
        assert!(!cloned.is_smooth());
        assert!(cloned.as_intersection().is_some());
    }
}
