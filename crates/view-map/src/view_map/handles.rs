//! Opaque references to collaborators outside the feature graph.
//!
//! The graph stores these but never dereferences them: the winged-edge mesh
//! handles record where an element came from, the view-map handles record
//! which aggregate an element was grouped into by the later construction
//! pass. Both sides of each pairing manage their own storage.

use serde::{Deserialize, Serialize};

macro_rules! opaque_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);
    };
}

opaque_handle! {
    /// A vertex of the source winged-edge mesh.
    MeshVertexHandle
}

opaque_handle! {
    /// An edge of the source winged-edge mesh.
    MeshEdgeHandle
}

opaque_handle! {
    /// A face of the source winged-edge mesh.
    MeshFaceHandle
}

opaque_handle! {
    /// The view-shape aggregate a feature shape was grouped into.
    ViewShapeHandle
}

opaque_handle! {
    /// The view-edge aggregate a feature edge was grouped into.
    ViewEdgeHandle
}

opaque_handle! {
    /// The view-vertex aggregate a feature vertex was grouped into.
    ViewVertexHandle
}
