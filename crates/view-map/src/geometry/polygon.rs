use serde::{Deserialize, Serialize};

use super::bbox::BBox3;
use super::point::Point3d;
use super::vector::Vec3;

/// A planar polygon in 3D, stored with its bounding box.
///
/// In the view map this is the occluded-face polygon recorded on feature
/// edges: the visibility pass computes it, the graph only stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon3 {
    vertices: Vec<Point3d>,
    bbox: BBox3,
}

impl Polygon3 {
    pub fn new(vertices: Vec<Point3d>) -> Self {
        let mut bbox = BBox3::new();
        for v in &vertices {
            bbox.expand_to_include(*v);
        }
        Self { vertices, bbox }
    }

    pub fn vertices(&self) -> &[Point3d] {
        &self.vertices
    }

    pub fn bbox(&self) -> &BBox3 {
        &self.bbox
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Polygon normal by Newell's method. `None` for degenerate polygons.
    pub fn normal(&self) -> Option<Vec3> {
        if self.vertices.len() < 3 {
            return None;
        }
        let mut n = Vec3::ZERO;
        for (i, a) in self.vertices.iter().enumerate() {
            let b = &self.vertices[(i + 1) % self.vertices.len()];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        n.normalized()
    }

    pub fn center(&self) -> Option<Point3d> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let mut c = Point3d::ORIGIN;
        for v in &self.vertices {
            c.x += v.x;
            c.y += v.y;
            c.z += v.z;
        }
        c.x /= n;
        c.y /= n;
        c.z /= n;
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_square() -> Polygon3 {
        Polygon3::new(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_normal_of_ccw_square_points_up() {
        let n = unit_square().normal().unwrap();
        assert_abs_diff_eq!(n.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bbox_tracks_vertices() {
        let p = unit_square();
        assert!(p.bbox().contains_point(Point3d::new(0.5, 0.5, 0.0)));
        assert!(!p.bbox().contains_point(Point3d::new(0.5, 0.5, 0.1)));
    }

    #[test]
    fn test_degenerate_polygon_has_no_normal() {
        assert!(Polygon3::default().normal().is_none());
        let line = Polygon3::new(vec![Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0)]);
        assert!(line.normal().is_none());
    }

    #[test]
    fn test_center() {
        let c = unit_square().center().unwrap();
        assert_abs_diff_eq!(c.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 0.5, epsilon = 1e-12);
    }
}
