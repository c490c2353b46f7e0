//! Kreuzungen: feste Geometrievorlagen (3-armig / 4-armig) mit bipolaren
//! Snap-Punkten an den Kanten und Start-Markern pro Quadrant.
//!
//! `regenerate_layout` zerstört alle Kind-Marker und legt sie neu an;
//! Start-Marker erhalten dabei frische IDs. Extern gehaltene
//! Routen-Referenzen auf alte Start-Marker werden dadurch ungültig und
//! müssen manuell neu zugewiesen werden — die Graph-Schicht meldet sie
//! als fehlerhafte Routen statt abzustürzen.

use glam::{Quat, Vec3};

use super::snap::{SnapOwner, SnapPoint, SnapPolarity};
use super::surface::SurfaceParams;

/// Kreuzungstyp (Anzahl der anschließbaren Arme).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionKind {
    /// T-Kreuzung, drei Arme (+X, +Z, -X)
    ThreeLane,
    /// Vollkreuzung, vier Arme
    FourLane,
}

impl IntersectionKind {
    /// Anzahl der Snap-Kanten der Vorlage.
    pub fn edge_count(self) -> usize {
        match self {
            IntersectionKind::ThreeLane => 3,
            IntersectionKind::FourLane => 4,
        }
    }
}

/// Start-Marker: Ursprung einer Route, einer pro Kreuzungs-Quadrant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPoint {
    /// Netzwerkweit eindeutige Marker-ID
    pub id: u64,
    /// Weltposition des Markers
    pub position: Vec3,
}

/// Stand der Vorlage bei der letzten Layout-Generierung.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutSnapshot {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    kind: IntersectionKind,
    width: f32,
}

/// Eine Kreuzung in der Arena des `RoadNetwork`.
#[derive(Debug, Clone)]
pub struct Intersection {
    /// Anzeigename
    pub name: String,
    /// Weltposition des Kreuzungszentrums
    pub position: Vec3,
    /// Ausrichtung der Vorlage
    pub rotation: Quat,
    /// Skalierung der Vorlage
    pub scale: Vec3,
    /// Vorlagentyp
    pub kind: IntersectionKind,
    /// Oberflächenparameter (die Breite bestimmt die Vorlagengröße)
    pub params: SurfaceParams,
    /// Material-Namen für den externen Mesh-Builder
    pub materials: Vec<String>,
    /// Dürfen Parameter zur Laufzeit geändert werden?
    pub runtime_editable: bool,
    snap_points: Vec<SnapPoint>,
    start_points: Vec<StartPoint>,
    snapshot: Option<LayoutSnapshot>,
}

/// Lokale Kanten der Vorlage: Versatzrichtung = Auswärtsrichtung.
/// Slot-Reihenfolge ist Teil des deterministischen Layouts.
const EDGE_DIRECTIONS: [Vec3; 4] = [Vec3::X, Vec3::Z, Vec3::NEG_X, Vec3::NEG_Z];

/// Lokale Quadranten der Start-Marker (bei `±width/4`).
const QUADRANTS: [Vec3; 4] = [
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(-1.0, 0.0, 1.0),
    Vec3::new(-1.0, 0.0, -1.0),
    Vec3::new(1.0, 0.0, -1.0),
];

impl Intersection {
    /// Erstellt eine Kreuzung ohne generiertes Layout; `regenerate_if_dirty`
    /// baut die Marker beim ersten Tick.
    pub fn new(
        name: impl Into<String>,
        kind: IntersectionKind,
        position: Vec3,
        params: SurfaceParams,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            kind,
            params,
            materials: Vec::new(),
            runtime_editable: true,
            snap_points: Vec::new(),
            start_points: Vec::new(),
            snapshot: None,
        }
    }

    /// Die bipolaren Snap-Punkte der Kanten (Stand des letzten Layouts).
    pub fn snap_points(&self) -> &[SnapPoint] {
        &self.snap_points
    }

    /// Die Start-Marker der Quadranten (Stand des letzten Layouts).
    pub fn start_points(&self) -> &[StartPoint] {
        &self.start_points
    }

    /// Lokalen Punkt in Weltkoordinaten umrechnen.
    fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * local)
    }

    /// Vergleicht Vorlage und Transform mit dem Stand des letzten Layouts
    /// und generiert bei Abweichung neu. Gibt zurück, ob regeneriert wurde.
    ///
    /// `intersection_id` identifiziert die Kreuzung in den Snap-Besitzern,
    /// `next_marker_id` ist der Marker-ID-Allokator des Netzwerks.
    pub fn regenerate_if_dirty(&mut self, intersection_id: u64, next_marker_id: &mut u64) -> bool {
        let current = LayoutSnapshot {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            kind: self.kind,
            width: self.params.width,
        };
        if self.snapshot == Some(current) {
            return false;
        }

        self.regenerate_layout(intersection_id, next_marker_id);
        self.snapshot = Some(current);
        true
    }

    /// Zerstört alle Snap- und Start-Marker und legt sie aus der Vorlage
    /// neu an. Start-Marker bekommen frische IDs aus dem Allokator.
    pub fn regenerate_layout(&mut self, intersection_id: u64, next_marker_id: &mut u64) {
        let half = self.params.width / 2.0;
        let quarter = self.params.width / 4.0;

        self.snap_points = EDGE_DIRECTIONS[..self.kind.edge_count()]
            .iter()
            .enumerate()
            .map(|(slot, local_dir)| SnapPoint {
                position: self.transform_point(*local_dir * half),
                forward: (self.rotation * *local_dir).normalize_or_zero(),
                polarity: SnapPolarity::Bipolar,
                road_width: self.params.width,
                owner: SnapOwner::Intersection {
                    id: intersection_id,
                    slot: slot as u8,
                },
            })
            .collect();

        self.start_points = QUADRANTS
            .iter()
            .map(|quadrant| {
                let id = *next_marker_id;
                *next_marker_id += 1;
                StartPoint {
                    id,
                    position: self.transform_point(*quadrant * quarter),
                }
            })
            .collect();
    }

    /// Grundfläche des Kreuzungs-Pads (vier Ecken, für den Mesh-Builder).
    pub fn footprint(&self) -> [Vec3; 4] {
        let half = self.params.width / 2.0;
        [
            self.transform_point(Vec3::new(half, 0.0, half)),
            self.transform_point(Vec3::new(-half, 0.0, half)),
            self.transform_point(Vec3::new(-half, 0.0, -half)),
            self.transform_point(Vec3::new(half, 0.0, -half)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regenerated(kind: IntersectionKind) -> Intersection {
        let mut junction =
            Intersection::new("Testkreuzung", kind, Vec3::ZERO, SurfaceParams::default());
        let mut next_id = 1;
        assert!(junction.regenerate_if_dirty(1, &mut next_id));
        junction
    }

    #[test]
    fn test_vierarmige_vorlage() {
        let junction = regenerated(IntersectionKind::FourLane);

        assert_eq!(junction.snap_points().len(), 4);
        assert_eq!(junction.start_points().len(), 4);

        for snap in junction.snap_points() {
            assert_eq!(snap.polarity, SnapPolarity::Bipolar);
            // Kanten-Mittelpunkte liegen bei width/2 = 3.0 vom Zentrum
            assert!((snap.position.length() - 3.0).abs() < 1e-5);
            // forward zeigt vom Zentrum weg
            assert!(snap.forward.dot(snap.position) > 0.0);
        }
    }

    #[test]
    fn test_dreiarmige_vorlage_laesst_minus_z_aus() {
        let junction = regenerated(IntersectionKind::ThreeLane);

        assert_eq!(junction.snap_points().len(), 3);
        assert!(junction
            .snap_points()
            .iter()
            .all(|snap| snap.forward.z > -0.5));
        // Start-Marker bleiben vollzählig (einer pro Quadrant)
        assert_eq!(junction.start_points().len(), 4);
    }

    #[test]
    fn test_regeneration_vergibt_frische_marker_ids() {
        let mut junction = regenerated(IntersectionKind::FourLane);
        let old_ids: Vec<u64> = junction.start_points().iter().map(|s| s.id).collect();

        let mut next_id = 100;
        junction.position = Vec3::new(50.0, 0.0, 0.0);
        assert!(junction.regenerate_if_dirty(1, &mut next_id));

        let new_ids: Vec<u64> = junction.start_points().iter().map(|s| s.id).collect();
        assert!(old_ids.iter().all(|id| !new_ids.contains(id)));
        assert_eq!(next_id, 104);
    }

    #[test]
    fn test_dirty_check_reagiert_auf_transform() {
        let mut junction = regenerated(IntersectionKind::FourLane);
        let mut next_id = 10;

        assert!(!junction.regenerate_if_dirty(1, &mut next_id));

        junction.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(junction.regenerate_if_dirty(1, &mut next_id));

        // +X-Kante kippt durch die Drehung auf -Z
        let first = junction.snap_points()[0];
        assert!(first.forward.z < -0.99, "forward: {:?}", first.forward);
    }

    #[test]
    fn test_footprint_skaliert_mit_breite() {
        let mut junction = regenerated(IntersectionKind::FourLane);
        junction.params.width = 10.0;
        let corners = junction.footprint();
        for corner in corners {
            assert!((corner.x.abs() - 5.0).abs() < 1e-5);
            assert!((corner.z.abs() - 5.0).abs() < 1e-5);
        }
    }
}
