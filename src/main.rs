//! trassen-check: Kommandozeilen-Prüfwerkzeug für Straßenkurse.
//!
//! Lädt einen Kurs, regeneriert die Geometrie und gibt Netzwerk-Kennzahlen
//! aus. Mit `--snap` läuft zusätzlich der Snap-Durchlauf über alle
//! Straßenenden; `--report` listet freie (nicht verbundene) Enden auf.

use anyhow::{bail, Context, Result};
use trassen_engine::{AuthoringOptions, RoadEnd, RoadNetwork, SnapOwner};

fn main() -> Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("trassen-check v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut path: Option<String> = None;
    let mut run_snap = false;
    let mut report_open_ends = false;

    for arg in &args {
        match arg.as_str() {
            "--snap" => run_snap = true,
            "--report" => report_open_ends = true,
            other if other.starts_with("--") => {
                bail!("Unbekannte Option: {}", other);
            }
            other => {
                if path.replace(other.to_string()).is_some() {
                    bail!("Mehr als eine Kursdatei angegeben");
                }
            }
        }
    }

    let Some(path) = path else {
        eprintln!("Aufruf: trassen-check <kurs.xml> [--snap] [--report]");
        bail!("Keine Kursdatei angegeben");
    };

    let options = AuthoringOptions::load_from_file(&AuthoringOptions::config_path());

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Kursdatei '{}' konnte nicht gelesen werden", path))?;
    let mut network =
        trassen_engine::parse_road_course(&content).context("Kurs konnte nicht geparst werden")?;

    if run_snap {
        let snapped = network.snap_all_road_ends();
        log::info!("Snap-Durchlauf: {} Enden eingerastet", snapped);
    }

    print_stats(&network);

    if report_open_ends {
        report_unconnected_ends(&network, &options);
    }

    Ok(())
}

fn print_stats(network: &RoadNetwork) {
    let stats = network.stats();
    println!("Kurs: {}", network.meta.course_name.as_deref().unwrap_or("(unbenannt)"));
    println!("  Straßen:      {}", stats.road_count);
    println!("  Kreuzungen:   {}", stats.intersection_count);
    println!("  Snap-Punkte:  {}", stats.snap_point_count);
    println!("  Gesamtlänge:  {:.1}", stats.total_road_length);
}

/// Listet Straßenenden auf, in deren Snap-Radius kein kompatibler
/// Kandidat liegt — typische Autorenfehler nach manuellen Edits.
fn report_unconnected_ends(network: &RoadNetwork, options: &AuthoringOptions) {
    let mut open = 0;
    for (id, road) in network.roads() {
        for snap in road.snap_points(id) {
            let radius = options.snap_radius(snap.road_width);
            let connected = network
                .snap_index()
                .within_radius(snap.position, radius)
                .into_iter()
                .filter_map(|hit| network.snap_index().point(hit.point_index).copied())
                .any(|candidate| {
                    !matches!(candidate.owner, SnapOwner::Road { id: other, .. } if other == id)
                        && snap.polarity.is_compatible(candidate.polarity)
                });
            if !connected {
                open += 1;
                let end = match snap.owner {
                    SnapOwner::Road {
                        end: RoadEnd::Start,
                        ..
                    } => "Anfang",
                    _ => "Ende",
                };
                println!(
                    "  Freies Ende: '{}' ({}) bei ({:.1}, {:.1}, {:.1})",
                    road.name, end, snap.position.x, snap.position.y, snap.position.z
                );
            }
        }
    }
    if open == 0 {
        println!("  Alle Straßenenden sind verbunden.");
    }
}
