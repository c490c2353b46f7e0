//! Die zentrale Netzwerk-Arena: Straßen und Kreuzungen mit stabilen IDs,
//! Snap-Index und der Snapping-Logik für magnetisches Zusammenfügen.
//!
//! Rückverweise (Snap-Punkt → Besitzer) sind ID-Lookups in die Arena,
//! keine Besitz-Zeiger. Iteration läuft in Einfüge-Reihenfolge
//! (`IndexMap`), damit jeder Scan deterministisch bleibt.

use glam::Vec3;
use indexmap::IndexMap;

use super::intersection::{Intersection, StartPoint};
use super::road::Road;
use super::snap::{RoadEnd, SnapOwner, SnapPoint};
use super::spatial::SnapIndex;
use crate::shared::options::SNAP_RADIUS_DIVISOR;

/// Metadaten eines Kurses (aus der XML-Datei).
#[derive(Debug, Clone, Default)]
pub struct CourseMeta {
    /// Anzeigename des Kurses
    pub course_name: Option<String>,
    /// Autor des Kurses
    pub author: Option<String>,
}

/// Ergebnis eines erfolgreichen Snap-Vorgangs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapMatch {
    /// Der Snap-Punkt, auf den eingerastet wurde
    pub point: SnapPoint,
    /// Distanz vor dem Einrasten
    pub distance: f32,
}

/// Kennzahlen des Netzwerks für Statistik-Ausgaben.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkStats {
    /// Anzahl Straßen
    pub road_count: usize,
    /// Anzahl Kreuzungen
    pub intersection_count: usize,
    /// Anzahl Snap-Punkte (Straßenenden + Kreuzungskanten)
    pub snap_point_count: usize,
    /// Summierte Mittellinienlänge aller Straßen
    pub total_road_length: f32,
}

/// Container für das gesamte Straßennetzwerk einer Szene.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    roads: IndexMap<u64, Road>,
    intersections: IndexMap<u64, Intersection>,
    /// Kurs-Metadaten aus der XML
    pub meta: CourseMeta,
    next_road_id: u64,
    next_intersection_id: u64,
    next_marker_id: u64,
    snap_index: SnapIndex,
}

impl RoadNetwork {
    /// Erstellt ein leeres Netzwerk.
    pub fn new() -> Self {
        Self {
            roads: IndexMap::new(),
            intersections: IndexMap::new(),
            meta: CourseMeta::default(),
            next_road_id: 1,
            next_intersection_id: 1,
            next_marker_id: 1,
            snap_index: SnapIndex::empty(),
        }
    }

    // ── Arena-Zugriff ───────────────────────────────────────────────────

    /// Fügt eine Straße hinzu und gibt ihre ID zurück.
    pub fn add_road(&mut self, road: Road) -> u64 {
        let id = self.next_road_id;
        self.next_road_id += 1;
        self.roads.insert(id, road);
        self.rebuild_snap_index();
        id
    }

    /// Entfernt eine Straße.
    pub fn remove_road(&mut self, road_id: u64) -> Option<Road> {
        let removed = self.roads.shift_remove(&road_id);
        if removed.is_some() {
            self.rebuild_snap_index();
        }
        removed
    }

    /// Fügt eine Kreuzung hinzu, generiert ihr Layout und gibt die ID zurück.
    pub fn add_intersection(&mut self, mut intersection: Intersection) -> u64 {
        let id = self.next_intersection_id;
        self.next_intersection_id += 1;
        intersection.regenerate_if_dirty(id, &mut self.next_marker_id);
        self.intersections.insert(id, intersection);
        self.rebuild_snap_index();
        id
    }

    /// Entfernt eine Kreuzung.
    pub fn remove_intersection(&mut self, intersection_id: u64) -> Option<Intersection> {
        let removed = self.intersections.shift_remove(&intersection_id);
        if removed.is_some() {
            self.rebuild_snap_index();
        }
        removed
    }

    /// Read-only Zugriff auf eine Straße.
    pub fn road(&self, road_id: u64) -> Option<&Road> {
        self.roads.get(&road_id)
    }

    /// Mutierender Zugriff auf eine Straße.
    ///
    /// Wer darüber Endpunkte bewegt, muss anschließend
    /// `rebuild_snap_index` aufrufen; die Mutations-Entry-Points dieses
    /// Moduls tun das selbst.
    pub fn road_mut(&mut self, road_id: u64) -> Option<&mut Road> {
        self.roads.get_mut(&road_id)
    }

    /// Read-only Zugriff auf eine Kreuzung.
    pub fn intersection(&self, intersection_id: u64) -> Option<&Intersection> {
        self.intersections.get(&intersection_id)
    }

    /// Iterator über alle Straßen in Einfüge-Reihenfolge.
    pub fn roads(&self) -> impl Iterator<Item = (u64, &Road)> {
        self.roads.iter().map(|(id, road)| (*id, road))
    }

    /// Iterator über alle Kreuzungen in Einfüge-Reihenfolge.
    pub fn intersections(&self) -> impl Iterator<Item = (u64, &Intersection)> {
        self.intersections.iter().map(|(id, junction)| (*id, junction))
    }

    /// Anzahl der Straßen.
    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// Anzahl der Kreuzungen.
    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    /// Sucht einen Start-Marker über alle Kreuzungen.
    pub fn start_point(&self, marker_id: u64) -> Option<StartPoint> {
        self.intersections
            .values()
            .flat_map(|junction| junction.start_points())
            .find(|start| start.id == marker_id)
            .copied()
    }

    // ── Regeneration ────────────────────────────────────────────────────

    /// Ein Tick des Dirty-Checks über alle Straßen und Kreuzungen.
    ///
    /// Gibt die Anzahl regenerierter Entitäten zurück; der Snap-Index wird
    /// nur bei tatsächlicher Änderung neu gebaut.
    pub fn regenerate_dirty(&mut self) -> usize {
        let mut regenerated = 0;

        for road in self.roads.values_mut() {
            if road.regenerate_if_dirty() {
                regenerated += 1;
            }
        }

        for (id, junction) in self.intersections.iter_mut() {
            if junction.regenerate_if_dirty(*id, &mut self.next_marker_id) {
                regenerated += 1;
            }
        }

        if regenerated > 0 {
            self.rebuild_snap_index();
        }
        regenerated
    }

    // ── Snap-Index ──────────────────────────────────────────────────────

    /// Sammelt alle Snap-Punkte des Netzwerks in Arena-Reihenfolge:
    /// erst Straßenenden, dann Kreuzungskanten.
    pub fn collect_snap_points(&self) -> Vec<SnapPoint> {
        let mut points = Vec::with_capacity(self.roads.len() * 2);
        for (id, road) in &self.roads {
            points.extend(road.snap_points(*id));
        }
        for junction in self.intersections.values() {
            points.extend_from_slice(junction.snap_points());
        }
        points
    }

    /// Baut den Snap-Index aus dem aktuellen Netzwerkstand neu.
    pub fn rebuild_snap_index(&mut self) {
        self.snap_index = SnapIndex::from_points(self.collect_snap_points());
    }

    /// Der aktuelle Snap-Index (read-only).
    pub fn snap_index(&self) -> &SnapIndex {
        &self.snap_index
    }

    // ── Mutation / Snapping ─────────────────────────────────────────────

    /// Bewegt einen Kontrollpunkt einer Straße (Weltkoordinaten).
    ///
    /// Endpunkt-Bewegungen lösen anschließend den Snap-Versuch für das
    /// betroffene Straßenende aus. Gibt `false` zurück bei unbekannter
    /// Straße, gesperrter Laufzeit-Bearbeitung oder ungültigem Index.
    pub fn move_control_point(&mut self, road_id: u64, index: usize, world_pos: Vec3) -> bool {
        let Some(road) = self.roads.get_mut(&road_id) else {
            log::warn!("Unbekannte Straße {} beim Bewegen eines Kontrollpunkts", road_id);
            return false;
        };
        if !road.runtime_editable {
            log::warn!(
                "Straße '{}' ist nicht zur Laufzeit bearbeitbar",
                road.name
            );
            return false;
        }

        let local = road.spline().inverse_transform_point(world_pos);
        if !road.spline_mut().set_control_point(index, local) {
            return false;
        }
        let last_index = road.spline().control_point_count() - 1;
        self.rebuild_snap_index();

        if index == 0 {
            self.try_snap_road_end(road_id, RoadEnd::Start);
        } else if index == last_index {
            self.try_snap_road_end(road_id, RoadEnd::End);
        }
        true
    }

    /// Versucht, ein Straßenende auf den nächsten kompatiblen Snap-Punkt
    /// einrasten zu lassen.
    ///
    /// Kandidaten sind alle Snap-Punkte fremder Besitzer innerhalb von
    /// `width / 3` um das Ende, polaritätskompatibel; der nächstgelegene
    /// gewinnt (bei Distanzgleichheit die Arena-Reihenfolge — beides
    /// deterministisch). Beim Einrasten landet der Endknoten exakt auf dem
    /// Kandidaten, der innere Handle behält seinen Knotenabstand und wird
    /// entlang der Auswärtsrichtung des Kandidaten ausgerichtet.
    pub fn try_snap_road_end(&mut self, road_id: u64, end: RoadEnd) -> Option<SnapMatch> {
        let road = self.roads.get(&road_id)?;
        let [start, finish] = road.snap_points(road_id);
        let moved = match end {
            RoadEnd::Start => start,
            RoadEnd::End => finish,
        };
        let radius = road.params.width / SNAP_RADIUS_DIVISOR;

        let candidate = self
            .snap_index
            .within_radius(moved.position, radius)
            .into_iter()
            .filter_map(|hit| {
                let point = self.snap_index.point(hit.point_index)?;
                Some((*point, hit.distance))
            })
            .find(|(point, _)| {
                !matches!(point.owner, SnapOwner::Road { id, .. } if id == road_id)
                    && moved.polarity.is_compatible(point.polarity)
            });

        let (target, distance) = candidate?;

        let road = self.roads.get_mut(&road_id)?;
        let knot_index = road.end_knot_index(end);
        let handle_index = road.end_handle_index(end);

        let spline = road.spline_mut();
        // Knotenabstand in Weltkoordinaten messen: der neue Handle wird als
        // Welt-Versatz angesetzt, die Skalierung der Spline darf den
        // Abstand nicht verfälschen
        let knot_world = spline.transform_point(spline.control_point(knot_index)?);
        let handle_world_old = spline.transform_point(spline.control_point(handle_index)?);
        let handle_distance = knot_world.distance(handle_world_old);

        let knot_local = spline.inverse_transform_point(target.position);
        let handle_world = target.position + target.forward * handle_distance;
        let handle_local = spline.inverse_transform_point(handle_world);

        spline.set_control_point(knot_index, knot_local);
        spline.set_control_point(handle_index, handle_local);

        log::info!(
            "Straße '{}' bei {:?} eingerastet (Distanz {:.3})",
            road.name,
            end,
            distance
        );

        self.rebuild_snap_index();
        Some(SnapMatch {
            point: target,
            distance,
        })
    }

    /// Snap-Durchlauf über alle Straßenenden in Arena-Reihenfolge
    /// (Lade-Zeitpunkt, CLI). Gibt die Anzahl eingerasteter Enden zurück.
    pub fn snap_all_road_ends(&mut self) -> usize {
        let road_ids: Vec<u64> = self.roads.keys().copied().collect();
        let mut snapped = 0;
        for id in road_ids {
            for end in [RoadEnd::Start, RoadEnd::End] {
                if self.try_snap_road_end(id, end).is_some() {
                    snapped += 1;
                }
            }
        }
        snapped
    }

    // ── Statistik ───────────────────────────────────────────────────────

    /// Kennzahlen des Netzwerks.
    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            road_count: self.roads.len(),
            intersection_count: self.intersections.len(),
            snap_point_count: self.snap_index.len(),
            total_road_length: self.roads.values().map(Road::center_line_length).sum(),
        }
    }
}

impl Default for RoadNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::intersection::IntersectionKind;
    use crate::core::surface::SurfaceParams;

    fn straight_road(name: &str, start_x: f32) -> Road {
        let mut road = Road::new(name, SurfaceParams::default());
        let offset = Vec3::new(start_x, 0.0, 0.0);
        road.spline_mut()
            .set_transform(offset, glam::Quat::IDENTITY, Vec3::ONE);
        road
    }

    #[test]
    fn test_default_netzwerk_entspricht_new() {
        let mut network = RoadNetwork::default();
        assert_eq!(network.road_count(), 0);
        assert!(network.snap_index().is_empty());
        // ID-Allokatoren starten wie bei `new()` bei 1
        assert_eq!(network.add_road(straight_road("A", 0.0)), 1);
    }

    #[test]
    fn test_arena_vergibt_fortlaufende_ids() {
        let mut network = RoadNetwork::new();
        let a = network.add_road(straight_road("A", 0.0));
        let b = network.add_road(straight_road("B", 50.0));
        assert_eq!((a, b), (1, 2));
        assert_eq!(network.road_count(), 2);
        assert_eq!(network.snap_index().len(), 4);
    }

    #[test]
    fn test_endpunkt_rastet_auf_fremdes_ende() {
        let mut network = RoadNetwork::new();
        // Straße A endet bei x=12 (Negative), Straße B beginnt bei x=13 (Positive)
        let _a = network.add_road(straight_road("A", 0.0));
        let b = network.add_road(straight_road("B", 13.0));

        let snap = network
            .try_snap_road_end(b, RoadEnd::Start)
            .expect("Snap erwartet: Abstand 1.0 < Radius 2.0");
        assert!((snap.distance - 1.0).abs() < 1e-4);

        // B-Anfang liegt jetzt exakt auf dem A-Ende
        let road_b = network.road(b).unwrap();
        let [start, _] = road_b.snap_points(b);
        assert!((start.position - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_gleiche_polaritaet_rastet_nicht() {
        let mut network = RoadNetwork::new();
        let _a = network.add_road(straight_road("A", 0.0));
        // B-Anfang (Positive) neben A-Anfang (Positive): inkompatibel
        let b = network.add_road(straight_road("B", 1.0));

        assert!(network.try_snap_road_end(b, RoadEnd::Start).is_none());
    }

    #[test]
    fn test_ausserhalb_des_radius_rastet_nicht() {
        let mut network = RoadNetwork::new();
        let _a = network.add_road(straight_road("A", 0.0));
        // Abstand 3.0 > Radius width/3 = 2.0
        let b = network.add_road(straight_road("B", 15.0));

        assert!(network.try_snap_road_end(b, RoadEnd::Start).is_none());
    }

    #[test]
    fn test_snap_auf_bipolare_kreuzungskante() {
        let mut network = RoadNetwork::new();
        let junction = Intersection::new(
            "Kreuzung",
            IntersectionKind::FourLane,
            Vec3::new(20.0, 0.0, 0.0),
            SurfaceParams::default(),
        );
        network.add_intersection(junction);

        // Straße endet bei x=12 (Negative); +(-X)-Kante der Kreuzung liegt bei x=17
        // → Abstand 5.0, zu weit. Straße bei x=4 endet bei x=16: Abstand 1.0.
        let road = network.add_road(straight_road("Zufahrt", 4.0));
        let snap = network
            .try_snap_road_end(road, RoadEnd::End)
            .expect("Snap auf Kreuzungskante erwartet");

        assert!(matches!(
            snap.point.owner,
            SnapOwner::Intersection { slot: 2, .. }
        ));
        let [_, end] = network.road(road).unwrap().snap_points(road);
        assert!((end.position - Vec3::new(17.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_handle_folgt_kandidaten_richtung() {
        let mut network = RoadNetwork::new();
        let _a = network.add_road(straight_road("A", 0.0));
        let b = network.add_road(straight_road("B", 13.0));

        let before = network.road(b).unwrap();
        let knot = before.spline().point_at(0.0);
        let handle = before
            .spline()
            .transform_point(before.spline().control_point(1).unwrap());
        let old_distance = knot.distance(handle);

        network.try_snap_road_end(b, RoadEnd::Start).unwrap();

        let after = network.road(b).unwrap();
        let new_knot = after.spline().point_at(0.0);
        let new_handle = after
            .spline()
            .transform_point(after.spline().control_point(1).unwrap());
        // Abstand erhalten, Richtung = forward des A-Endes (+X)
        assert!((new_knot.distance(new_handle) - old_distance).abs() < 1e-4);
        assert!(((new_handle - new_knot).normalize() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_skalierte_spline_behaelt_weltabstand_beim_einrasten() {
        let mut network = RoadNetwork::new();
        let _a = network.add_road(straight_road("A", 0.0));

        // B mit Skalierung 2: lokaler Handle-Abstand 4 → Weltabstand 8.
        // B-Anfang bei x=13, also 1.0 vor dem A-Ende (x=12).
        let mut scaled = Road::new("B", SurfaceParams::default());
        scaled.spline_mut().set_transform(
            Vec3::new(13.0, 0.0, 0.0),
            glam::Quat::IDENTITY,
            Vec3::splat(2.0),
        );
        let b = network.add_road(scaled);

        let before = network.road(b).unwrap().spline();
        let old_distance = before
            .transform_point(before.control_point(0).unwrap())
            .distance(before.transform_point(before.control_point(1).unwrap()));
        assert!((old_distance - 8.0).abs() < 1e-4);

        network
            .try_snap_road_end(b, RoadEnd::Start)
            .expect("Snap erwartet");

        let after = network.road(b).unwrap().spline();
        let new_knot = after.transform_point(after.control_point(0).unwrap());
        let new_handle = after.transform_point(after.control_point(1).unwrap());
        assert!((new_knot - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-4);
        assert!((new_knot.distance(new_handle) - old_distance).abs() < 1e-3);
    }

    #[test]
    fn test_laufzeit_sperre_blockiert_bewegung() {
        let mut network = RoadNetwork::new();
        let id = network.add_road(straight_road("Gesperrt", 0.0));
        network.road_mut(id).unwrap().runtime_editable = false;

        assert!(!network.move_control_point(id, 0, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_snap_durchlauf_zaehlt_eingerastete_enden() {
        let mut network = RoadNetwork::new();
        let _a = network.add_road(straight_road("A", 0.0));
        let _b = network.add_road(straight_road("B", 13.0));
        let _far = network.add_road(straight_road("C", 200.0));

        // A-Ende rastet auf B-Anfang; danach rastet B-Anfang deckungsgleich
        // auf das A-Ende (idempotent). C bleibt unberührt.
        assert_eq!(network.snap_all_road_ends(), 2);
    }

    #[test]
    fn test_statistik() {
        let mut network = RoadNetwork::new();
        network.add_road(straight_road("A", 0.0));
        network.add_road(straight_road("B", 50.0));
        network.regenerate_dirty();

        let stats = network.stats();
        assert_eq!(stats.road_count, 2);
        assert_eq!(stats.snap_point_count, 4);
        assert!((stats.total_road_length - 24.0).abs() < 0.01);
    }
}
