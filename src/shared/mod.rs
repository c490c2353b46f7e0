//! Geteilte Konfiguration und Konstanten der Engine.

pub mod options;

pub use options::AuthoringOptions;
