//! Core-Domänentypen: Splines, Fahrbahn-Geometrie, Snap-Modell, Arena.

pub mod bezier;
pub mod intersection;
pub mod network;
pub mod road;
pub mod snap;
pub mod spatial;
pub mod spline;
pub mod surface;

pub use intersection::{Intersection, IntersectionKind, StartPoint};
pub use network::{CourseMeta, NetworkStats, RoadNetwork, SnapMatch};
pub use road::{Road, RoadGeometry};
pub use snap::{RoadEnd, SnapOwner, SnapPoint, SnapPolarity};
pub use spatial::{SnapIndex, SnapIndexMatch};
pub use spline::{ContinuityMode, SplineCurve};
pub use surface::{CrossSection, LaneSide, SurfaceParams};
