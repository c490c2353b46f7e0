//! Graph-Knoten und Routen des Befahrbarkeits-Netzwerks.

use crate::core::surface::LaneSide;

/// Art eines Graph-Knotens; die Aktivitätsprüfung ist als getaggte
/// Variante modelliert statt als polymorpher Aufruf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelNodeKind {
    /// Gewöhnliche Kreuzung, immer aktiv
    #[default]
    Junction,
    /// Schaltbarer Knoten (z.B. Schranke); nur bei `open` befahrbar
    Gate { open: bool },
}

/// Eine gerichtete Graph-Kante: physischer Pfad aus Straßen mit
/// Spurwahl, von einem Start-Marker zu einem Zielknoten.
///
/// Die Straßenfolge muss zusammenhängend sein (jedes Straßenende am
/// Anfang der Folgestraße); gebrochener Zusammenhang ist ein
/// Autorenfehler, den `TravelGraph::validate_routes` meldet.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Start-Marker (ID eines Kreuzungs-`StartPoint`)
    pub start_marker: u64,
    /// Straßen-IDs des physischen Pfads, in Fahrreihenfolge
    pub roads: Vec<u64>,
    /// Zielknoten-ID
    pub destination: u64,
    /// Befahrene Spurseite
    pub lane: LaneSide,
}

/// Ein Knoten des Befahrbarkeits-Graphen (typischerweise eine Kreuzung).
#[derive(Debug, Clone, PartialEq)]
pub struct TravelNode {
    /// Netzwerkweit eindeutige Knoten-ID
    pub id: u64,
    /// Anzeigename (taucht in Warnungen auf)
    pub label: String,
    /// Knotenart mit Aktivitätszustand
    pub kind: TravelNodeKind,
    /// Ausgehende Routen
    pub routes: Vec<Route>,
}

impl TravelNode {
    /// Erstellt einen gewöhnlichen Kreuzungsknoten ohne Routen.
    pub fn junction(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            kind: TravelNodeKind::Junction,
            routes: Vec::new(),
        }
    }

    /// Ist der Knoten aktuell befahrbar?
    pub fn is_active(&self) -> bool {
        match self.kind {
            TravelNodeKind::Junction => true,
            TravelNodeKind::Gate { open } => open,
        }
    }
}
