use serde::{Deserialize, Serialize};

/// The feature kind of an edge. An edge has exactly one kind; a mesh edge
/// that qualifies as several features is represented by several feature
/// edges.
///
/// Orientation conventions: a silhouette edge is oriented so the visible
/// face lies to the left of A→B; a border edge so the mesh surface lies to
/// the left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeNature {
    #[default]
    NoFeature,
    Silhouette,
    Crease,
    Border,
    RidgeValley,
    SuggestiveContour,
}

impl EdgeNature {
    /// Sharp features coincide with mesh edges; the rest cross face
    /// interiors.
    pub fn is_sharp_feature(&self) -> bool {
        matches!(self, Self::Silhouette | Self::Crease | Self::Border)
    }
}
