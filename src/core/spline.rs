//! Stückweise kubische Bézier-Spline mit Stetigkeitsmodi pro Knoten.
//!
//! Kontrollpunkte liegen im lokalen Raum der Spline; `point_at` und
//! `velocity_at` rechnen über die eigene Transform in Weltkoordinaten um.
//! Jede erfolgreiche Mutation erhöht die `revision`, gegen die der
//! Dirty-Check der Straße vergleicht (siehe `core::road`).

use glam::{Quat, Vec3};

use super::bezier;
use crate::shared::options::DEFAULT_HANDLE_SPACING;

/// Stetigkeitsmodus eines Knotens (gemeinsamer Punkt zweier Segmente).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuityMode {
    /// Beide Handles frei beweglich
    #[default]
    Free,
    /// Gegenüberliegender Handle bleibt kolinear, behält aber seinen Abstand
    Aligned,
    /// Gegenüberliegender Handle ist exakt gespiegelt (negierter Offset)
    Mirrored,
}

/// Stückweise kubische Bézier-Kurve.
///
/// Invarianten:
/// - `points.len() == 3 * curve_count + 1` und `points.len() >= 4`
/// - `modes.len() == (points.len() + 2) / 3` (ein Modus pro Knoten)
#[derive(Debug, Clone)]
pub struct SplineCurve {
    /// Kontrollpunkte im lokalen Raum; jeder dritte ist ein Knoten
    points: Vec<Vec3>,
    /// Stetigkeitsmodi, ein Eintrag pro Knoten
    modes: Vec<ContinuityMode>,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    /// Zähler erfolgreicher Mutationen (Geometrie und Transform)
    revision: u64,
}

impl SplineCurve {
    /// Erstellt die Standard-Spline: ein Segment entlang +X mit
    /// `DEFAULT_HANDLE_SPACING` Abstand zwischen den Kontrollpunkten.
    pub fn new() -> Self {
        let s = DEFAULT_HANDLE_SPACING;
        Self {
            points: vec![
                Vec3::ZERO,
                Vec3::new(s, 0.0, 0.0),
                Vec3::new(2.0 * s, 0.0, 0.0),
                Vec3::new(3.0 * s, 0.0, 0.0),
            ],
            modes: vec![ContinuityMode::Free, ContinuityMode::Free],
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            revision: 0,
        }
    }

    /// Erstellt eine Spline mit `curve_count` Segmenten (mindestens 1).
    ///
    /// Wird vom XML-Loader genutzt, der anschließend die Handle-Punkte in
    /// Vertragsreihenfolge über `set_control_point` einspielt.
    pub fn with_curve_count(curve_count: usize) -> Self {
        let mut spline = Self::new();
        for _ in 1..curve_count.max(1) {
            spline.add_curve();
        }
        spline
    }

    // ── Abfragen ────────────────────────────────────────────────────────

    /// Anzahl der kubischen Segmente.
    pub fn curve_count(&self) -> usize {
        (self.points.len() - 1) / 3
    }

    /// Anzahl der Kontrollpunkte (`3 * curve_count + 1`).
    pub fn control_point_count(&self) -> usize {
        self.points.len()
    }

    /// Kontrollpunkt im lokalen Raum.
    pub fn control_point(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// Stetigkeitsmodus des Knotens, zu dem der Kontrollpunkt gehört.
    pub fn continuity_mode(&self, point_index: usize) -> Option<ContinuityMode> {
        self.modes.get((point_index + 1) / 3).copied()
    }

    /// Aktueller Mutationszähler.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Weltposition auf der Kurve bei globalem `t ∈ [0, 1]`.
    ///
    /// `t >= 1` wird exakt auf das letzte Segment bei lokalem t = 1 geklemmt,
    /// damit kein Segment-Index außerhalb des Arrays entsteht.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let (i, local_t) = self.segment_at(t);
        let local = bezier::cubic_point(
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[i + 3],
            local_t,
        );
        self.transform_point(local)
    }

    /// Geschwindigkeitsvektor (erste Ableitung) in Weltausrichtung.
    ///
    /// Rotation und Skalierung werden angewandt, die Translation nicht.
    pub fn velocity_at(&self, t: f32) -> Vec3 {
        let (i, local_t) = self.segment_at(t);
        let local = bezier::cubic_derivative(
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[i + 3],
            local_t,
        );
        self.rotation * (self.scale * local)
    }

    /// Normierte Fahrtrichtung; Null-Vektor bei degenerierter Geschwindigkeit.
    pub fn direction_at(&self, t: f32) -> Vec3 {
        self.velocity_at(t).normalize_or_zero()
    }

    /// Mappt globales `t` auf (Segment-Basisindex, lokales t).
    fn segment_at(&self, t: f32) -> (usize, f32) {
        if t >= 1.0 {
            return (self.points.len() - 4, 1.0);
        }
        let scaled = t.clamp(0.0, 1.0) * self.curve_count() as f32;
        let segment = scaled.floor() as usize;
        (segment * 3, scaled - segment as f32)
    }

    // ── Transform ───────────────────────────────────────────────────────

    /// Lokalen Punkt in Weltkoordinaten umrechnen.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * local)
    }

    /// Weltpunkt in den lokalen Raum der Spline zurückrechnen.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        let unrotated = self.rotation.inverse() * (world - self.position);
        // Division komponentenweise; Null-Skalierung bleibt unverändert
        Vec3::new(
            if self.scale.x != 0.0 { unrotated.x / self.scale.x } else { unrotated.x },
            if self.scale.y != 0.0 { unrotated.y / self.scale.y } else { unrotated.y },
            if self.scale.z != 0.0 { unrotated.z / self.scale.z } else { unrotated.z },
        )
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Setzt die komplette Transform (Position, Rotation, Skalierung).
    pub fn set_transform(&mut self, position: Vec3, rotation: Quat, scale: Vec3) {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self.revision += 1;
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Setzt einen Kontrollpunkt (lokaler Raum).
    ///
    /// Knotenpunkte (`index % 3 == 0`) ziehen ihre beiden Nachbar-Handles um
    /// dasselbe Delta mit, bevor die Stetigkeit erzwungen wird. Ein Index
    /// außerhalb des Arrays ist eine Vorbedingungsverletzung: Warnung + `false`,
    /// das Array bleibt unverändert.
    pub fn set_control_point(&mut self, index: usize, local_pos: Vec3) -> bool {
        if index >= self.points.len() {
            log::warn!(
                "Kontrollpunkt-Index {} außerhalb [0, {})",
                index,
                self.points.len()
            );
            return false;
        }

        if index % 3 == 0 {
            let delta = local_pos - self.points[index];
            if index > 0 {
                self.points[index - 1] += delta;
            }
            if index + 1 < self.points.len() {
                self.points[index + 1] += delta;
            }
        }

        self.points[index] = local_pos;
        self.enforce_mode(index);
        self.revision += 1;
        true
    }

    /// Setzt den Stetigkeitsmodus des Knotens, zu dem `point_index` gehört,
    /// und erzwingt ihn sofort.
    pub fn set_continuity_mode(&mut self, point_index: usize, mode: ContinuityMode) -> bool {
        let knot = (point_index + 1) / 3;
        if point_index >= self.points.len() || knot >= self.modes.len() {
            log::warn!("Kontrollpunkt-Index {} hat keinen Knoten", point_index);
            return false;
        }
        self.modes[knot] = mode;
        self.enforce_mode(point_index);
        self.revision += 1;
        true
    }

    /// Erzwingt den Stetigkeitsmodus am Knoten des bearbeiteten Punkts.
    ///
    /// Innere Knoten in `Aligned`/`Mirrored` positionieren den Handle auf der
    /// Gegenseite kolinear um; `Aligned` behält dessen bisherigen Abstand,
    /// `Mirrored` spiegelt exakt. Randknoten haben keine Gegenseite und
    /// bleiben unangetastet.
    fn enforce_mode(&mut self, point_index: usize) {
        let knot = (point_index + 1) / 3;
        let mode = self.modes[knot];
        if mode == ContinuityMode::Free || knot == 0 || knot == self.modes.len() - 1 {
            return;
        }

        let middle = knot * 3;
        let (fixed, enforced) = if point_index <= middle {
            (middle - 1, middle + 1)
        } else {
            (middle + 1, middle - 1)
        };

        let middle_pos = self.points[middle];
        let mut tangent = middle_pos - self.points[fixed];
        if mode == ContinuityMode::Aligned {
            let keep_distance = middle_pos.distance(self.points[enforced]);
            tangent = tangent.normalize_or_zero() * keep_distance;
        }
        self.points[enforced] = middle_pos + tangent;
    }

    /// Hängt ein Segment an: drei Punkte, linear entlang der End-Richtung
    /// extrapoliert im mittleren Punktabstand des letzten Segments.
    ///
    /// Der neue Knoten erbt den Stetigkeitsmodus des bisherigen Endknotens.
    pub fn add_curve(&mut self) {
        let n = self.points.len();
        let last = self.points[n - 1];

        // Mittlerer Abstand der vier Punkte des letzten Segments
        let spacing = (self.points[n - 4].distance(self.points[n - 3])
            + self.points[n - 3].distance(self.points[n - 2])
            + self.points[n - 2].distance(last))
            / 3.0;
        let spacing = if spacing > f32::EPSILON {
            spacing
        } else {
            DEFAULT_HANDLE_SPACING
        };

        // End-Richtung im lokalen Raum; degeneriert → +X
        let end_dir = bezier::cubic_derivative(
            self.points[n - 4],
            self.points[n - 3],
            self.points[n - 2],
            last,
            1.0,
        )
        .normalize_or_zero();
        let end_dir = if end_dir == Vec3::ZERO { Vec3::X } else { end_dir };

        let mut p = last;
        for _ in 0..3 {
            p += end_dir * spacing;
            self.points.push(p);
        }

        let inherited = *self.modes.last().unwrap_or(&ContinuityMode::Free);
        self.modes.push(inherited);
        self.enforce_mode(self.points.len() - 4);
        self.revision += 1;
    }

    /// Entfernt das letzte Segment (drei Punkte plus ein Knotenmodus).
    ///
    /// No-op mit `false`, wenn danach weniger als ein Segment übrig bliebe.
    pub fn remove_curve(&mut self) -> bool {
        if self.curve_count() <= 1 {
            return false;
        }
        self.points.truncate(self.points.len() - 3);
        self.modes.pop();
        self.revision += 1;
        true
    }
}

impl Default for SplineCurve {
    fn default() -> Self {
        Self::new()
    }
}
