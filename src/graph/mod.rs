//! Befahrbarkeits-Graph: Knoten, Routen, Breitensuche und Welt-Pfade.

pub mod node;
pub mod search;
pub mod world_path;

pub use node::{Route, TravelNode, TravelNodeKind};
pub use search::TravelGraph;
