//! Querschnitts-Generator: tastet eine Spline ab und erzeugt die
//! Kantenpaare, Fahrspur-Mittellinien und Böschungssilhouetten der Fahrbahn.
//!
//! Alle Funktionen sind reine Funktionen ihrer Eingaben, halten keinen
//! Cache und sind pro Frame aufrufbar. Die Y-Koordinate jeder Kante wird
//! auf die Y-Koordinate des Spline-Punkts gesetzt, damit der Querschnitt
//! unabhängig von einer Verkippung der Spline eben bleibt.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::spline::SplineCurve;
use crate::shared::options::{
    DEFAULT_ROAD_WIDTH, DEFAULT_SIDE_DEPTH, DEFAULT_SLOPE_WIDTH, DEFAULT_STEPS_PER_CURVE,
};

/// Ein Querschnitt: linke und rechte Fahrbahnkante bei einem Parameterschritt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossSection {
    /// Linke Kante (in Fahrtrichtung)
    pub left: Vec3,
    /// Rechte Kante (in Fahrtrichtung)
    pub right: Vec3,
}

/// Fahrspurseite in Fahrtrichtung der Spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneSide {
    /// Linke Spur, Abtastung in Spline-Richtung
    #[default]
    Left,
    /// Rechte Spur, Abtastung gegen die Spline-Richtung (Gegenverkehr)
    Right,
}

/// Parameterbündel der Fahrbahn-Geometrie.
///
/// Änderungen an einem dieser Werte machen die gecachte Geometrie einer
/// Straße ungültig (siehe `core::road`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceParams {
    /// Fahrbahnbreite in Welteinheiten
    pub width: f32,
    /// Absenkung der Böschungs-Außenkante
    pub side_depth: f32,
    /// Böschungsbreite pro Seite
    pub slope_width: f32,
    /// Abtastschritte pro Kurvensegment
    pub steps_per_curve: u32,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_ROAD_WIDTH,
            side_depth: DEFAULT_SIDE_DEPTH,
            slope_width: DEFAULT_SLOPE_WIDTH,
            steps_per_curve: DEFAULT_STEPS_PER_CURVE,
        }
    }
}

/// Erzeugt `steps * curve_count + 1` Querschnitte entlang der Spline.
///
/// Der Versatz ist `±width/2` entlang der um 90° um die Y-Achse gedrehten
/// Fahrtrichtung; die Y-Koordinate beider Kanten ist die des Spline-Punkts.
/// Bei degenerierter Richtung (Null-Geschwindigkeit) fallen beide Kanten
/// auf den Spline-Punkt zusammen.
pub fn cross_sections(spline: &SplineCurve, width: f32, steps: u32) -> Vec<CrossSection> {
    let sample_count = steps as usize * spline.curve_count() + 1;
    let half = width / 2.0;

    (0..sample_count)
        .map(|i| {
            let t = i as f32 / (sample_count - 1) as f32;
            let point = spline.point_at(t);
            let dir = spline.direction_at(t);
            // Fahrtrichtung um 90° um +Y gedreht: (x, y, z) → (z, y, -x)
            let side = Vec3::new(dir.z, dir.y, -dir.x);

            let mut left = point + side * half;
            let mut right = point - side * half;
            left.y = point.y;
            right.y = point.y;

            CrossSection { left, right }
        })
        .collect()
}

/// Fahrspur-Mittellinie einer Seite.
///
/// Die Querschnitte bei halber Breite liefern die Spurmitten einer
/// zweispurigen Fahrbahn; `Right` wird in umgekehrter Reihenfolge
/// zurückgegeben, weil die rechte Spur gegen die Spline-Richtung
/// befahren wird.
pub fn lane_path(spline: &SplineCurve, width: f32, steps: u32, side: LaneSide) -> Vec<Vec3> {
    let sections = cross_sections(spline, width / 2.0, steps);
    match side {
        LaneSide::Left => sections.iter().map(|s| s.left).collect(),
        LaneSide::Right => sections.iter().rev().map(|s| s.right).collect(),
    }
}

/// Böschungs-Querschnitte: Außenkanten bei `width + slope_width`, um
/// `side_depth` abgesenkt. Zusammen mit den Fahrbahn-Querschnitten ergibt
/// das pro Seite eine trapezförmige Rampensilhouette.
pub fn embankment_sections(
    spline: &SplineCurve,
    width: f32,
    slope_width: f32,
    side_depth: f32,
    steps: u32,
) -> Vec<CrossSection> {
    cross_sections(spline, width + slope_width, steps)
        .into_iter()
        .map(|mut section| {
            section.left.y -= side_depth;
            section.right.y -= side_depth;
            section
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_spline() -> SplineCurve {
        // Standard-Spline entlang +X auf Höhe y = 0
        SplineCurve::new()
    }

    #[test]
    fn test_anzahl_querschnitte() {
        let mut spline = linear_spline();
        assert_eq!(cross_sections(&spline, 6.0, 10).len(), 11);

        spline.add_curve();
        spline.add_curve();
        assert_eq!(cross_sections(&spline, 6.0, 10).len(), 31);
    }

    #[test]
    fn test_kanten_liegen_symmetrisch_zur_mittellinie() {
        let spline = linear_spline();
        let sections = cross_sections(&spline, 6.0, 8);

        for (i, section) in sections.iter().enumerate() {
            let t = i as f32 / (sections.len() - 1) as f32;
            let center = spline.point_at(t);
            let mid = (section.left + section.right) / 2.0;
            assert!((mid - center).length() < 1e-4);
            assert!((section.left.distance(section.right) - 6.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_flattening_uebernimmt_spline_hoehe() {
        let mut spline = linear_spline();
        // Spline in der Höhe verbiegen: Handles weit nach oben
        spline.set_control_point(1, Vec3::new(4.0, 7.0, 2.0));
        spline.set_control_point(2, Vec3::new(8.0, -3.0, -2.0));

        for (i, section) in cross_sections(&spline, 6.0, 16).iter().enumerate() {
            let t = i as f32 / 16.0;
            let expected_y = spline.point_at(t).y;
            assert!((section.left.y - expected_y).abs() < 1e-5);
            assert!((section.right.y - expected_y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_lane_path_rechts_ist_umgekehrt() {
        let spline = linear_spline();
        let left = lane_path(&spline, 6.0, 10, LaneSide::Left);
        let right = lane_path(&spline, 6.0, 10, LaneSide::Right);

        assert_eq!(left.len(), 11);
        assert_eq!(right.len(), 11);

        // Linke Spur läuft in Spline-Richtung (+X), rechte dagegen
        assert!(left.last().unwrap().x > left.first().unwrap().x);
        assert!(right.last().unwrap().x < right.first().unwrap().x);

        // Spurmitten liegen bei ±width/4 neben der Mittellinie
        let center = spline.point_at(0.5);
        let left_mid = left[5];
        assert!((left_mid.distance(center) - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_boeschung_ist_breiter_und_abgesenkt() {
        let spline = linear_spline();
        let road = cross_sections(&spline, 6.0, 10);
        let slope = embankment_sections(&spline, 6.0, 1.2, 0.4, 10);

        assert_eq!(road.len(), slope.len());
        for (r, s) in road.iter().zip(&slope) {
            assert!(s.left.distance(s.right) > r.left.distance(r.right));
            assert!((s.left.y - (r.left.y - 0.4)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerierte_spline_kollabiert_auf_mittellinie() {
        let mut spline = linear_spline();
        // Knoten zuerst, dann die Handles (Knoten ziehen Handles mit)
        for i in [0, 3, 1, 2] {
            spline.set_control_point(i, Vec3::new(2.0, 1.0, 2.0));
        }

        for section in cross_sections(&spline, 6.0, 4) {
            assert_eq!(section.left, section.right);
        }
    }
}
