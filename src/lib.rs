//! Trassen-Engine Library.
//! Geometrie- und Graph-Kern als Library exportiert für Tests und Hosts.

pub mod core;
pub mod graph;
pub mod shared;
pub mod xml;

pub use core::{
    ContinuityMode, CourseMeta, CrossSection, Intersection, IntersectionKind, LaneSide,
    NetworkStats, Road, RoadEnd, RoadGeometry, RoadNetwork, SnapIndex, SnapMatch, SnapOwner,
    SnapPoint, SnapPolarity, SplineCurve, StartPoint, SurfaceParams,
};
pub use graph::{Route, TravelGraph, TravelNode, TravelNodeKind};
pub use shared::AuthoringOptions;
pub use xml::{parse_road_course, write_road_course};
