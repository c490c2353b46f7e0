//! Breitensuche über den Befahrbarkeits-Graphen mit Pfadrekonstruktion
//! und Routen-Validierung.
//!
//! Der Graph wird vor jeder Abfrage-Serie komplett neu aufgebaut
//! (`rebuild`), nicht inkrementell gepflegt. Fehlerhafte Routen (Ziel
//! unbekannt, Straße fehlt) brechen keine Suche ab: sie werden mit
//! Warnung übersprungen.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::core::network::RoadNetwork;
use crate::shared::options::ROUTE_CONTIGUITY_TOLERANCE;

use super::node::TravelNode;

/// Der Befahrbarkeits-Graph: die Menge aller bekannten Knoten zum
/// Abfragezeitpunkt, in Einfüge-Reihenfolge.
#[derive(Debug, Clone, Default)]
pub struct TravelGraph {
    nodes: IndexMap<u64, TravelNode>,
}

impl TravelGraph {
    /// Erstellt einen leeren Graphen.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }

    /// Ersetzt die Knotenmenge komplett (kein inkrementelles Diffing).
    pub fn rebuild(&mut self, nodes: Vec<TravelNode>) {
        self.nodes = nodes.into_iter().map(|node| (node.id, node)).collect();
    }

    /// Zugriff auf einen Knoten.
    pub fn node(&self, id: u64) -> Option<&TravelNode> {
        self.nodes.get(&id)
    }

    /// Anzahl der Knoten.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ungewichtete Breitensuche von `from` nach `to`.
    ///
    /// Ein Ziel wird nur betreten, wenn sein Knoten existiert und aktiv
    /// ist; Routen auf unbekannte Knoten erzeugen je eine Warnung und
    /// werden übersprungen. Rückgabe ist die Knotenfolge von `from` nach
    /// `to`, oder `None` wenn `to` unerreichbar ist.
    ///
    /// `find_route(x, x)` gibt `None` zurück: der Startknoten bekommt nie
    /// einen Vorgänger-Eintrag, also gibt es keine Rekonstruktionskette.
    /// Dieses Verhalten ist so definiert, auch wenn es überraschen mag.
    pub fn find_route(&self, from: u64, to: u64) -> Option<Vec<u64>> {
        if !self.nodes.contains_key(&from) {
            log::warn!("Startknoten {} ist im Graphen unbekannt", from);
            return None;
        }

        let mut visited: HashSet<u64> = HashSet::new();
        let mut predecessor: HashMap<u64, u64> = HashMap::new();
        let mut queue: VecDeque<u64> = VecDeque::new();

        visited.insert(from);
        queue.push_back(from);

        'search: while let Some(current) = queue.pop_front() {
            let node = &self.nodes[&current];
            for route in &node.routes {
                let Some(destination) = self.nodes.get(&route.destination) else {
                    log::warn!(
                        "Route von '{}' zeigt auf unbekannten Knoten {}",
                        node.label,
                        route.destination
                    );
                    continue;
                };
                if visited.contains(&destination.id) || !destination.is_active() {
                    continue;
                }

                visited.insert(destination.id);
                predecessor.insert(destination.id, current);
                if destination.id == to {
                    break 'search;
                }
                queue.push_back(destination.id);
            }
        }

        // Rekonstruktion rückwärts über die Vorgänger; deckt auch
        // from == to ab (kein Vorgänger-Eintrag → None)
        if !predecessor.contains_key(&to) {
            return None;
        }
        let mut path = vec![to];
        let mut current = to;
        while let Some(&prev) = predecessor.get(&current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    /// Sind alle Knoten der Folge aktiv? Unbekannte Knoten zählen als
    /// inaktiv.
    pub fn is_route_active(&self, node_path: &[u64]) -> bool {
        node_path
            .iter()
            .all(|id| self.nodes.get(id).is_some_and(TravelNode::is_active))
    }

    /// Prüft alle Routen des Graphen gegen das Netzwerk und gibt
    /// menschenlesbare Befunde zurück (leer = alles in Ordnung).
    ///
    /// Geprüft werden: Zielknoten existiert, Start-Marker auflösbar, alle
    /// Straßen-IDs auflösbar, und die Straßenfolge ist zusammenhängend
    /// (Ende von Straße i liegt innerhalb der Toleranz am Anfang von
    /// Straße i+1). Jeder Befund wird zusätzlich als Warnung geloggt.
    pub fn validate_routes(&self, network: &RoadNetwork) -> Vec<String> {
        let mut findings = Vec::new();
        let mut report = |finding: String| {
            log::warn!("{}", finding);
            findings.push(finding);
        };

        for node in self.nodes.values() {
            for (route_index, route) in node.routes.iter().enumerate() {
                let context = format!("Knoten '{}', Route {}", node.label, route_index);

                if !self.nodes.contains_key(&route.destination) {
                    report(format!(
                        "{}: Zielknoten {} existiert nicht",
                        context, route.destination
                    ));
                }
                if network.start_point(route.start_marker).is_none() {
                    report(format!(
                        "{}: Start-Marker {} ist nicht auflösbar",
                        context, route.start_marker
                    ));
                }

                let mut previous_end = None;
                for road_id in &route.roads {
                    let Some(road) = network.road(*road_id) else {
                        report(format!("{}: Straße {} existiert nicht", context, road_id));
                        previous_end = None;
                        continue;
                    };

                    let start = road.spline().point_at(0.0);
                    if let Some(gap_from) = previous_end {
                        let gap = start.distance(gap_from);
                        if gap > ROUTE_CONTIGUITY_TOLERANCE {
                            report(format!(
                                "{}: Straße {} schließt nicht an (Lücke {:.3})",
                                context, road_id, gap
                            ));
                        }
                    }
                    previous_end = Some(road.spline().point_at(1.0));
                }
            }
        }

        findings
    }
}
