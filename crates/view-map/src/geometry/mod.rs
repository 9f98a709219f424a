pub mod bbox;
pub mod point;
pub mod polygon;
pub mod vector;

pub use bbox::{AxisPoint, BBox3, BoundingVolume};
pub use point::{Point2d, Point3d};
pub use polygon::Polygon3;
pub use vector::Vec3;
