use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// Surface curvature annotation attached to a feature vertex.
///
/// Produced by the external curvature-estimation service; the graph treats it
/// as an opaque payload that travels with the vertex through splitting and
/// cloning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurvatureInfo {
    /// Largest principal curvature.
    pub k1: f64,
    /// Smallest principal curvature.
    pub k2: f64,
    /// Direction of `k1`.
    pub e1: Vec3,
    /// Direction of `k2`.
    pub e2: Vec3,
    /// Radial curvature (in the view direction).
    pub kr: f64,
    /// Derivative of the radial curvature along the radial direction.
    pub dkr_ds: f64,
}
