//! Zentrale Konfiguration für die Trassen-Engine.
//!
//! `AuthoringOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Spline ──────────────────────────────────────────────────────────

/// Standard-Abstand zwischen neu angelegten Kontrollpunkten (Welteinheiten).
pub const DEFAULT_HANDLE_SPACING: f32 = 4.0;

// ── Straßen-Geometrie ───────────────────────────────────────────────

/// Standard-Fahrbahnbreite in Welteinheiten.
pub const DEFAULT_ROAD_WIDTH: f32 = 6.0;
/// Standard-Absenkung der Böschungs-Außenkante (Welteinheiten).
pub const DEFAULT_SIDE_DEPTH: f32 = 0.4;
/// Standard-Breite der Böschung pro Seite (Welteinheiten).
pub const DEFAULT_SLOPE_WIDTH: f32 = 1.2;
/// Standard-Anzahl Abtastschritte pro Kurvensegment.
pub const DEFAULT_STEPS_PER_CURVE: u32 = 20;

// ── Snapping ────────────────────────────────────────────────────────

/// Snap-Radius = Fahrbahnbreite geteilt durch diesen Divisor.
pub const SNAP_RADIUS_DIVISOR: f32 = 3.0;

// ── Routen-Validierung ──────────────────────────────────────────────

/// Maximale Lücke (Welteinheiten) zwischen Straßenende und Folgestraßen-Anfang,
/// bis zu der eine Route noch als zusammenhängend gilt.
pub const ROUTE_CONTIGUITY_TOLERANCE: f32 = 0.05;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Authoring-Optionen.
/// Wird als `trassen_engine.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoringOptions {
    // ── Straßen ─────────────────────────────────────────────────
    /// Fahrbahnbreite neuer Straßen in Welteinheiten
    pub default_road_width: f32,
    /// Absenkung der Böschungs-Außenkante neuer Straßen
    pub default_side_depth: f32,
    /// Böschungsbreite neuer Straßen pro Seite
    pub default_slope_width: f32,
    /// Abtastschritte pro Kurvensegment neuer Straßen
    pub default_steps_per_curve: u32,

    // ── Spline ──────────────────────────────────────────────────
    /// Abstand neu angelegter Kontrollpunkte
    #[serde(default = "default_handle_spacing")]
    pub handle_spacing: f32,

    // ── Snapping ────────────────────────────────────────────────
    /// Divisor für den breitenabhängigen Snap-Radius
    #[serde(default = "default_snap_radius_divisor")]
    pub snap_radius_divisor: f32,

    // ── Validierung ─────────────────────────────────────────────
    /// Toleranz für die Zusammenhangs-Prüfung von Routen
    #[serde(default = "default_route_contiguity_tolerance")]
    pub route_contiguity_tolerance: f32,
}

impl Default for AuthoringOptions {
    fn default() -> Self {
        Self {
            default_road_width: DEFAULT_ROAD_WIDTH,
            default_side_depth: DEFAULT_SIDE_DEPTH,
            default_slope_width: DEFAULT_SLOPE_WIDTH,
            default_steps_per_curve: DEFAULT_STEPS_PER_CURVE,
            handle_spacing: DEFAULT_HANDLE_SPACING,
            snap_radius_divisor: SNAP_RADIUS_DIVISOR,
            route_contiguity_tolerance: ROUTE_CONTIGUITY_TOLERANCE,
        }
    }
}

/// Serde-Default für `handle_spacing` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_handle_spacing() -> f32 {
    DEFAULT_HANDLE_SPACING
}

/// Serde-Default für `snap_radius_divisor` (Abwärtskompatibilität).
fn default_snap_radius_divisor() -> f32 {
    SNAP_RADIUS_DIVISOR
}

/// Serde-Default für `route_contiguity_tolerance` (Abwärtskompatibilität).
fn default_route_contiguity_tolerance() -> f32 {
    ROUTE_CONTIGUITY_TOLERANCE
}

impl AuthoringOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("trassen_engine"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("trassen_engine.toml")
    }

    /// Berechnet den Snap-Radius für eine Straße der gegebenen Breite.
    ///
    /// `width / snap_radius_divisor`
    pub fn snap_radius(&self, width: f32) -> f32 {
        width / self.snap_radius_divisor
    }
}
