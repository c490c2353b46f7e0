//! Spatial-Index (KD-Tree) für schnelle Snap-Punkt-Abfragen.

use glam::Vec3;
use kiddo::{KdTree, SquaredEuclidean};

use super::snap::SnapPoint;

/// Ergebnis einer Distanzabfrage gegen den Snap-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapIndexMatch {
    /// Index des gefundenen Snap-Punkts im Index
    pub point_index: usize,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f32,
}

/// Read-only Spatial-Index über allen Snap-Punkten eines Netzwerks.
///
/// Wird nach jeder Mutation, die Snap-Punkte bewegt, komplett neu gebaut.
#[derive(Debug, Clone)]
pub struct SnapIndex {
    tree: KdTree<f64, 3>,
    points: Vec<SnapPoint>,
}

impl Default for SnapIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl SnapIndex {
    /// Erstellt einen leeren Snap-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 3]>::new()).into(),
            points: Vec::new(),
        }
    }

    /// Baut einen neuen Index aus den übergebenen Snap-Punkten.
    ///
    /// Die Reihenfolge der Punkte bleibt erhalten; `point_index` in den
    /// Abfrage-Ergebnissen referenziert in dieses Array.
    pub fn from_points(points: Vec<SnapPoint>) -> Self {
        let entries: Vec<[f64; 3]> = points
            .iter()
            .map(|p| {
                [
                    p.position.x as f64,
                    p.position.y as f64,
                    p.position.z as f64,
                ]
            })
            .collect();

        let tree: KdTree<f64, 3> = (&entries).into();

        Self { tree, points }
    }

    /// Gibt die Anzahl indexierter Snap-Punkte zurück.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Gibt `true` zurück, wenn keine Snap-Punkte im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Zugriff auf einen indexierten Snap-Punkt.
    pub fn point(&self, index: usize) -> Option<&SnapPoint> {
        self.points.get(index)
    }

    /// Findet den nächsten Snap-Punkt zur gegebenen Weltposition.
    pub fn nearest(&self, query: Vec3) -> Option<SnapIndexMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self.tree.nearest_one::<SquaredEuclidean>(&[
            query.x as f64,
            query.y as f64,
            query.z as f64,
        ]);

        Some(SnapIndexMatch {
            point_index: result.item as usize,
            distance: (result.distance as f32).sqrt(),
        })
    }

    /// Findet alle Snap-Punkte innerhalb eines Radius, nach Distanz sortiert.
    pub fn within_radius(&self, query: Vec3, radius: f32) -> Vec<SnapIndexMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(
                &[query.x as f64, query.y as f64, query.z as f64],
                (radius * radius) as f64,
            )
            .into_iter()
            .map(|entry| SnapIndexMatch {
                point_index: entry.item as usize,
                distance: (entry.distance as f32).sqrt(),
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }
}
