//! Snap-Punkte: gepolte Verbindungsstellen an Straßenenden und
//! Kreuzungskanten, über die Segmente magnetisch aneinandergefügt werden.

use glam::Vec3;

/// Polarität eines Snap-Punkts.
///
/// Straßenenden tragen genau einen `Positive`- (Anfang) und einen
/// `Negative`-Punkt (Ende); Kreuzungskanten sind `Bipolar` und nehmen
/// beide Polaritäten an.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapPolarity {
    /// Straßenanfang
    Positive,
    /// Straßenende
    Negative,
    /// Kreuzungskante, akzeptiert beide Polaritäten
    Bipolar,
}

impl SnapPolarity {
    /// Zwei Snap-Punkte dürfen verbunden werden, wenn ihre Polaritäten
    /// verschieden sind oder mindestens eine `Bipolar` ist.
    pub fn is_compatible(self, other: SnapPolarity) -> bool {
        self != other || self == SnapPolarity::Bipolar
    }
}

/// Welches Ende einer Straße.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadEnd {
    /// Spline-Anfang (t = 0)
    Start,
    /// Spline-Ende (t = 1)
    End,
}

/// Besitzer eines Snap-Punkts, als ID-Referenz in die Arena (`RoadNetwork`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapOwner {
    /// Straßenende
    Road { id: u64, end: RoadEnd },
    /// Kreuzungskante (`slot` nummeriert die Kanten der Vorlage)
    Intersection { id: u64, slot: u8 },
}

/// Eine Verbindungsstelle: Weltposition, Auswärtsrichtung, Polarität und
/// die Fahrbahnbreite des Besitzers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPoint {
    /// Weltposition der Verbindungsstelle
    pub position: Vec3,
    /// Auswärts gerichtete Tangente (vom Besitzer weg)
    pub forward: Vec3,
    /// Polarität der Stelle
    pub polarity: SnapPolarity,
    /// Fahrbahnbreite des Besitzers (bestimmt den Snap-Radius)
    pub road_width: f32,
    /// Besitzer als ID-Referenz
    pub owner: SnapOwner,
}
