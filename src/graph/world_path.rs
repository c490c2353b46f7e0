//! Übersetzung einer gefundenen Knotenfolge in einen Welt-Polygonzug:
//! Start-Marker plus spurselektierte Fahrbahn-Abtastungen jeder Route.

use glam::Vec3;

use crate::core::network::RoadNetwork;
use crate::core::surface;

use super::search::TravelGraph;

impl TravelGraph {
    /// Baut aus einer Knotenfolge (Ergebnis von `find_route`) den
    /// befahrbaren Welt-Polygonzug.
    ///
    /// Für jedes aufeinanderfolgende Knotenpaar wird die erste ausgehende
    /// Route mit passendem Ziel genommen; angehängt werden ihr
    /// Start-Marker und die Spur-Mittellinien aller Straßen in
    /// Fahrreihenfolge. Nicht auflösbare Referenzen (Route, Marker,
    /// Straße) ergeben eine Warnung und `None` — niemals einen still
    /// korrupten Pfad. Folgen mit weniger als zwei Knoten ergeben `None`.
    pub fn route_to_world_path(
        &self,
        node_path: &[u64],
        network: &RoadNetwork,
    ) -> Option<Vec<Vec3>> {
        if node_path.len() < 2 {
            return None;
        }

        let mut world_path = Vec::new();

        for pair in node_path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let Some(node) = self.node(from) else {
                log::warn!("Knoten {} ist im Graphen unbekannt", from);
                return None;
            };
            let Some(route) = node.routes.iter().find(|route| route.destination == to) else {
                log::warn!(
                    "Knoten '{}' hat keine Route nach Knoten {}",
                    node.label,
                    to
                );
                return None;
            };

            let Some(start) = network.start_point(route.start_marker) else {
                log::warn!(
                    "Start-Marker {} der Route '{}' → {} ist nicht auflösbar",
                    route.start_marker,
                    node.label,
                    to
                );
                return None;
            };
            world_path.push(start.position);

            for road_id in &route.roads {
                let Some(road) = network.road(*road_id) else {
                    log::warn!(
                        "Straße {} der Route '{}' → {} existiert nicht",
                        road_id,
                        node.label,
                        to
                    );
                    return None;
                };
                world_path.extend(surface::lane_path(
                    road.spline(),
                    road.params.width,
                    road.params.steps_per_curve,
                    route.lane,
                ));
            }
        }

        Some(world_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::intersection::{Intersection, IntersectionKind};
    use crate::core::road::Road;
    use crate::core::surface::{LaneSide, SurfaceParams};
    use crate::graph::node::{Route, TravelNode};

    /// Netzwerk mit einer Kreuzung (liefert Start-Marker) und einer Straße.
    fn network_with_markers() -> (RoadNetwork, u64, u64) {
        let mut network = RoadNetwork::new();
        let junction = Intersection::new(
            "Kreuzung",
            IntersectionKind::FourLane,
            Vec3::ZERO,
            SurfaceParams::default(),
        );
        let junction_id = network.add_intersection(junction);
        let marker_id = network
            .intersection(junction_id)
            .unwrap()
            .start_points()[0]
            .id;

        let mut params = SurfaceParams::default();
        params.steps_per_curve = 10;
        let road_id = network.add_road(Road::new("Strecke", params));
        (network, marker_id, road_id)
    }

    fn two_node_graph(marker_id: u64, road_id: u64) -> TravelGraph {
        let mut a = TravelNode::junction(1, "A");
        a.routes.push(Route {
            start_marker: marker_id,
            roads: vec![road_id],
            destination: 2,
            lane: LaneSide::Left,
        });
        let b = TravelNode::junction(2, "B");

        let mut graph = TravelGraph::new();
        graph.rebuild(vec![a, b]);
        graph
    }

    #[test]
    fn test_pfadlaenge_ist_marker_plus_abtastungen() {
        let (network, marker_id, road_id) = network_with_markers();
        let graph = two_node_graph(marker_id, road_id);

        let path = graph
            .route_to_world_path(&[1, 2], &network)
            .expect("Pfad erwartet");

        // 1 Marker + (steps * curve_count + 1) Spurpunkte
        assert_eq!(path.len(), 1 + 11);
        assert_eq!(path[0], network.start_point(marker_id).unwrap().position);
    }

    #[test]
    fn test_fehlender_marker_gibt_none() {
        let (network, _, road_id) = network_with_markers();
        let graph = two_node_graph(9999, road_id);

        assert!(graph.route_to_world_path(&[1, 2], &network).is_none());
    }

    #[test]
    fn test_fehlende_strasse_gibt_none() {
        let (network, marker_id, _) = network_with_markers();
        let graph = two_node_graph(marker_id, 9999);

        assert!(graph.route_to_world_path(&[1, 2], &network).is_none());
    }

    #[test]
    fn test_zu_kurze_folge_gibt_none() {
        let (network, marker_id, road_id) = network_with_markers();
        let graph = two_node_graph(marker_id, road_id);

        assert!(graph.route_to_world_path(&[], &network).is_none());
        assert!(graph.route_to_world_path(&[1], &network).is_none());
    }
}
