//! XML Import/Export für Straßenkurse.
//!
//! Dieses Modul implementiert das Parsen und Schreiben des
//! `RoadCourse`-Formats. Die Handle-Punkte jeder Straße stehen in
//! Vertragsreihenfolge in der Datei: erst alle Knotenpunkte
//! (Indizes 0, 3, 6, …), dann die inneren Handle-Paare — der Loader
//! spielt sie in genau dieser Reihenfolge wieder ein, wodurch jede
//! Position bit-genau wiederhergestellt wird.

pub mod parser;
pub mod writer;

pub use parser::parse_road_course;
pub use writer::write_road_course;
