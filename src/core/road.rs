//! Straßen-Entität: Spline, Oberflächenparameter und gecachte Geometrie.
//!
//! Die Geometrie wird nie persistiert; sie ist eine reine Funktion der
//! aktuellen Parameter und wird per Dirty-Check einmal pro Tick neu
//! berechnet. Den Tick-Takt besitzt die Host-Schleife, den Vergleich und
//! die Neuberechnung besitzt dieses Modul.

use glam::Vec3;

use super::snap::{RoadEnd, SnapOwner, SnapPoint, SnapPolarity};
use super::spline::SplineCurve;
use super::surface::{self, CrossSection, LaneSide, SurfaceParams};

/// Gecachte Generator-Ausgabe einer Straße.
#[derive(Debug, Clone, Default)]
pub struct RoadGeometry {
    /// Fahrbahn-Kantenpaare entlang der Spline
    pub cross_sections: Vec<CrossSection>,
    /// Mittellinie der linken Fahrspur (in Spline-Richtung)
    pub left_lane: Vec<Vec3>,
    /// Mittellinie der rechten Fahrspur (gegen die Spline-Richtung)
    pub right_lane: Vec<Vec3>,
    /// Böschungs-Kantenpaare (abgesenkte Außenkanten)
    pub embankments: Vec<CrossSection>,
}

/// Parameterstand der letzten Regeneration.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RegenSnapshot {
    spline_revision: u64,
    params: SurfaceParams,
}

/// Eine Straße: benannte Spline mit Oberflächenparametern, Materialien und
/// gecachter Geometrie. Lebt in der Arena des `RoadNetwork`, referenziert
/// wird sie über ihre ID.
#[derive(Debug, Clone)]
pub struct Road {
    /// Anzeigename (taucht in Warnungen und Statistiken auf)
    pub name: String,
    /// Material-Namen für den externen Mesh-Builder
    pub materials: Vec<String>,
    /// Oberflächenparameter (Breite, Böschung, Auflösung)
    pub params: SurfaceParams,
    /// Dürfen Kontrollpunkte zur Laufzeit bewegt werden?
    pub runtime_editable: bool,
    spline: SplineCurve,
    geometry: RoadGeometry,
    snapshot: Option<RegenSnapshot>,
}

impl Road {
    /// Erstellt eine Straße mit Standard-Spline.
    pub fn new(name: impl Into<String>, params: SurfaceParams) -> Self {
        Self::with_spline(name, SplineCurve::new(), params)
    }

    /// Erstellt eine Straße um eine bestehende Spline (z.B. vom XML-Loader).
    pub fn with_spline(name: impl Into<String>, spline: SplineCurve, params: SurfaceParams) -> Self {
        Self {
            name: name.into(),
            materials: Vec::new(),
            params,
            runtime_editable: true,
            spline,
            geometry: RoadGeometry::default(),
            snapshot: None,
        }
    }

    /// Die Spline der Straße (read-only).
    pub fn spline(&self) -> &SplineCurve {
        &self.spline
    }

    /// Mutierender Spline-Zugriff; jede Spline-Mutation erhöht deren
    /// Revision und macht damit die gecachte Geometrie ungültig.
    pub fn spline_mut(&mut self) -> &mut SplineCurve {
        &mut self.spline
    }

    /// Die gecachte Geometrie vom letzten `regenerate_if_dirty`.
    pub fn geometry(&self) -> &RoadGeometry {
        &self.geometry
    }

    /// Vergleicht den aktuellen Parameterstand mit dem der letzten
    /// Regeneration und berechnet die Geometrie bei Abweichung neu.
    ///
    /// Gibt zurück, ob regeneriert wurde.
    pub fn regenerate_if_dirty(&mut self) -> bool {
        let current = RegenSnapshot {
            spline_revision: self.spline.revision(),
            params: self.params,
        };
        if self.snapshot == Some(current) {
            return false;
        }

        let p = self.params;
        self.geometry = RoadGeometry {
            cross_sections: surface::cross_sections(&self.spline, p.width, p.steps_per_curve),
            left_lane: surface::lane_path(&self.spline, p.width, p.steps_per_curve, LaneSide::Left),
            right_lane: surface::lane_path(
                &self.spline,
                p.width,
                p.steps_per_curve,
                LaneSide::Right,
            ),
            embankments: surface::embankment_sections(
                &self.spline,
                p.width,
                p.slope_width,
                p.side_depth,
                p.steps_per_curve,
            ),
        };
        self.snapshot = Some(current);
        true
    }

    /// Die beiden End-Snap-Punkte der Straße.
    ///
    /// Anfang = `Positive`, Ende = `Negative`; `forward` zeigt jeweils von
    /// der Straße weg, damit ein andockendes Segment seinen Handle entlang
    /// `forward` legen kann und der Verkehrsfluss glatt weiterläuft.
    pub fn snap_points(&self, road_id: u64) -> [SnapPoint; 2] {
        [
            SnapPoint {
                position: self.spline.point_at(0.0),
                forward: -self.spline.direction_at(0.0),
                polarity: SnapPolarity::Positive,
                road_width: self.params.width,
                owner: SnapOwner::Road {
                    id: road_id,
                    end: RoadEnd::Start,
                },
            },
            SnapPoint {
                position: self.spline.point_at(1.0),
                forward: self.spline.direction_at(1.0),
                polarity: SnapPolarity::Negative,
                road_width: self.params.width,
                owner: SnapOwner::Road {
                    id: road_id,
                    end: RoadEnd::End,
                },
            },
        ]
    }

    /// Der dem Weltpunkt nähere End-Snap-Punkt.
    ///
    /// Bei exakt gleicher Distanz gewinnt der Anfangspunkt (definierter
    /// Tie-Break, kein Fehler).
    pub fn closest_snap_point(&self, road_id: u64, world_pos: Vec3) -> SnapPoint {
        let [start, end] = self.snap_points(road_id);
        if world_pos.distance(start.position) <= world_pos.distance(end.position) {
            start
        } else {
            end
        }
    }

    /// Kontrollpunkt-Index des Endknotens für das gegebene Straßenende.
    pub fn end_knot_index(&self, end: RoadEnd) -> usize {
        match end {
            RoadEnd::Start => 0,
            RoadEnd::End => self.spline.control_point_count() - 1,
        }
    }

    /// Kontrollpunkt-Index des inneren Handles neben dem Endknoten.
    pub fn end_handle_index(&self, end: RoadEnd) -> usize {
        match end {
            RoadEnd::Start => 1,
            RoadEnd::End => self.spline.control_point_count() - 2,
        }
    }

    /// Länge der Mittellinie, als Polygonzug über die Abtastschritte.
    pub fn center_line_length(&self) -> f32 {
        let sample_count = self.params.steps_per_curve as usize * self.spline.curve_count() + 1;
        let mut length = 0.0;
        let mut previous = self.spline.point_at(0.0);
        for i in 1..sample_count {
            let t = i as f32 / (sample_count - 1) as f32;
            let point = self.spline.point_at(t);
            length += previous.distance(point);
            previous = point;
        }
        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_road() -> Road {
        Road::new("Teststraße", SurfaceParams::default())
    }

    #[test]
    fn test_regeneration_nur_bei_aenderung() {
        let mut road = test_road();

        assert!(road.regenerate_if_dirty(), "Erster Tick regeneriert immer");
        assert!(!road.regenerate_if_dirty(), "Unverändert: kein zweiter Lauf");

        road.spline_mut().set_control_point(1, Vec3::new(3.0, 1.0, 2.0));
        assert!(road.regenerate_if_dirty(), "Spline-Mutation macht dirty");

        road.params.width = 8.0;
        assert!(road.regenerate_if_dirty(), "Parameteränderung macht dirty");
        assert!(!road.regenerate_if_dirty());
    }

    #[test]
    fn test_geometrie_laengen_passen_zu_parametern() {
        let mut road = test_road();
        road.spline_mut().add_curve();
        road.params.steps_per_curve = 10;
        road.regenerate_if_dirty();

        let geo = road.geometry();
        assert_eq!(geo.cross_sections.len(), 21);
        assert_eq!(geo.left_lane.len(), 21);
        assert_eq!(geo.right_lane.len(), 21);
        assert_eq!(geo.embankments.len(), 21);
    }

    #[test]
    fn test_snap_punkte_liegen_an_den_enden() {
        let road = test_road();
        let [start, end] = road.snap_points(7);

        assert_eq!(start.position, road.spline().point_at(0.0));
        assert_eq!(end.position, road.spline().point_at(1.0));
        assert_eq!(start.polarity, SnapPolarity::Positive);
        assert_eq!(end.polarity, SnapPolarity::Negative);

        // forward zeigt jeweils von der Straße weg
        assert!(start.forward.x < 0.0);
        assert!(end.forward.x > 0.0);
    }

    #[test]
    fn test_closest_snap_point_tie_break_anfang() {
        let road = test_road();
        // Exakte Mitte der Standard-Spline (0..12 auf +X)
        let middle = Vec3::new(6.0, 0.0, 0.0);
        let chosen = road.closest_snap_point(1, middle);
        assert_eq!(
            chosen.owner,
            SnapOwner::Road {
                id: 1,
                end: RoadEnd::Start
            }
        );
    }

    #[test]
    fn test_mittellinienlaenge_gerade_strecke() {
        let road = test_road();
        // Standard-Spline: gerade Strecke von x=0 bis x=12
        assert!((road.center_line_length() - 12.0).abs() < 1e-3);
    }
}
