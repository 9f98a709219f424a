use serde::{Deserialize, Serialize};

use super::point::{Point2d, Point3d};

/// Per-axis operations a point type needs to participate in an axis-aligned
/// bounding volume.
pub trait AxisPoint: Copy {
    /// Component-wise minimum.
    fn component_min(self, other: Self) -> Self;
    /// Component-wise maximum.
    fn component_max(self, other: Self) -> Self;
    /// True when every component of `self` is `<=` the matching component of
    /// `other`.
    fn all_le(self, other: Self) -> bool;
}

impl AxisPoint for Point3d {
    fn component_min(self, other: Self) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
            z: self.z.min(other.z),
        }
    }

    fn component_max(self, other: Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }

    fn all_le(self, other: Self) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }
}

impl AxisPoint for Point2d {
    fn component_min(self, other: Self) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }

    fn component_max(self, other: Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    fn all_le(self, other: Self) -> bool {
        self.x <= other.x && self.y <= other.y
    }
}

/// An axis-aligned bounding volume that distinguishes "never grown" from any
/// degenerate extent.
///
/// The `empty` flag is authoritative: a freshly created volume contains
/// nothing, and `merge` treats an empty operand as the identity. Folding an
/// empty volume into a union through naive per-axis min/max would manufacture
/// a phantom region out of its stale corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume<P> {
    min: P,
    max: P,
    empty: bool,
}

/// Bounding volume over 3D points, the shape-level box type.
pub type BBox3 = BoundingVolume<Point3d>;

impl<P: AxisPoint + Default> BoundingVolume<P> {
    /// A volume containing nothing.
    pub fn new() -> Self {
        Self {
            min: P::default(),
            max: P::default(),
            empty: true,
        }
    }

    /// A volume spanning the given corners. `min` must be per-axis `<=` `max`.
    pub fn from_corners(min: P, max: P) -> Self {
        debug_assert!(min.all_le(max));
        Self {
            min,
            max,
            empty: false,
        }
    }
}

impl<P: AxisPoint> BoundingVolume<P> {
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Lower corner, if any point has been absorbed.
    pub fn min(&self) -> Option<&P> {
        (!self.empty).then_some(&self.min)
    }

    /// Upper corner, if any point has been absorbed.
    pub fn max(&self) -> Option<&P> {
        (!self.empty).then_some(&self.max)
    }

    /// Grow the volume to cover `p`.
    pub fn expand_to_include(&mut self, p: P) {
        if self.empty {
            self.min = p;
            self.max = p;
            self.empty = false;
            return;
        }
        self.min = self.min.component_min(p);
        self.max = self.max.component_max(p);
    }

    /// Union `other` into this volume. An empty operand on either side is the
    /// identity.
    pub fn merge(&mut self, other: &Self) {
        if other.empty {
            return;
        }
        if self.empty {
            *self = *other;
            return;
        }
        self.min = self.min.component_min(other.min);
        self.max = self.max.component_max(other.max);
    }

    /// Inclusive containment test. An empty volume contains nothing.
    pub fn contains_point(&self, p: P) -> bool {
        if self.empty {
            return false;
        }
        self.min.all_le(p) && p.all_le(self.max)
    }

    /// Forget all absorbed points.
    pub fn clear(&mut self) {
        self.empty = true;
    }
}

impl<P: AxisPoint + Default> Default for BoundingVolume<P> {
    fn default() -> Self {
        Self::new()
    }
}
