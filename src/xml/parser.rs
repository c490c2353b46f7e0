//! Parser für RoadCourse XML-Dateien.

use anyhow::{bail, Context, Result};
use glam::{Quat, Vec3};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::{Intersection, IntersectionKind, Road, RoadNetwork, SplineCurve, SurfaceParams};
use crate::shared::options::DEFAULT_STEPS_PER_CURVE;

/// Gesammelte Felder eines `<road>`- oder `<intersection>`-Eintrags.
#[derive(Debug, Default)]
struct RecordFields {
    name: String,
    position: String,
    rotation: String,
    scale: String,
    materials: String,
    width: String,
    side_depth: String,
    slope_width: String,
    steps_per_curve: String,
    runtime_editable: String,
    handle_points: String,
    kind: String,
}

/// Parsed einen Straßenkurs aus einem XML-String.
///
/// Ein fehlgeschlagener Parse-Vorgang lässt keinen halb befüllten Zustand
/// zurück: das Netzwerk wird erst nach vollständigem Einlesen gebaut.
/// Nach dem Aufbau läuft ein voller Regenerations-Tick; der Snap-Durchlauf
/// bleibt dem Aufrufer überlassen, damit der Lade-Vorgang die Datei
/// bit-genau wiederherstellt.
pub fn parse_road_course(xml_content: &str) -> Result<RoadNetwork> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();

    let mut course_name: Option<String> = None;
    let mut author: Option<String> = None;

    let mut in_meta = false;
    let mut in_road = false;
    let mut in_intersection = false;
    let mut current_tag: Option<String> = None;
    let mut fields = RecordFields::default();

    let mut roads: Vec<Road> = Vec::new();
    let mut intersections: Vec<Intersection> = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let tag = reader.decoder().decode(name.as_ref())?;

                match tag.as_ref() {
                    "RoadCourse" => {}
                    "meta" => in_meta = true,
                    "road" => {
                        in_road = true;
                        fields = RecordFields::default();
                    }
                    "intersection" => {
                        in_intersection = true;
                        fields = RecordFields::default();
                    }
                    _ => current_tag = Some(tag.to_string()),
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.xml_content()?.into_owned();

                if in_road || in_intersection {
                    match current_tag.as_deref() {
                        Some("name") => fields.name.push_str(&text),
                        Some("position") => fields.position.push_str(&text),
                        Some("rotation") => fields.rotation.push_str(&text),
                        Some("scale") => fields.scale.push_str(&text),
                        Some("materials") => fields.materials.push_str(&text),
                        Some("width") => fields.width.push_str(&text),
                        Some("sideDepth") => fields.side_depth.push_str(&text),
                        Some("slopeWidth") => fields.slope_width.push_str(&text),
                        Some("stepsPerCurve") => fields.steps_per_curve.push_str(&text),
                        Some("runtimeEditable") => fields.runtime_editable.push_str(&text),
                        Some("handlePoints") => fields.handle_points.push_str(&text),
                        Some("type") => fields.kind.push_str(&text),
                        _ => {}
                    }
                } else if in_meta {
                    match current_tag.as_deref() {
                        Some("courseName") => course_name = Some(text),
                        Some("author") => author = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let tag = reader.decoder().decode(name.as_ref())?;
                match tag.as_ref() {
                    "meta" => in_meta = false,
                    "road" => {
                        in_road = false;
                        roads.push(build_road(&fields)?);
                    }
                    "intersection" => {
                        in_intersection = false;
                        intersections.push(build_intersection(&fields)?);
                    }
                    _ => {
                        if current_tag.as_deref() == Some(tag.as_ref()) {
                            current_tag = None;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err).context("Fehler beim Parsen des XML"),
            _ => {}
        }

        buffer.clear();
    }

    let mut network = RoadNetwork::new();
    network.meta.course_name = course_name;
    network.meta.author = author;
    for road in roads {
        network.add_road(road);
    }
    for intersection in intersections {
        network.add_intersection(intersection);
    }
    network.regenerate_dirty();

    Ok(network)
}

/// Baut eine Straße aus den Record-Feldern; spielt die Handle-Punkte in
/// Vertragsreihenfolge wieder ein (Knotenpunkte zuerst, dann die inneren
/// Handle-Paare).
fn build_road(fields: &RecordFields) -> Result<Road> {
    let name = if fields.name.is_empty() {
        "Unbenannt".to_string()
    } else {
        fields.name.clone()
    };
    let context = || format!("Straße '{}'", name);

    let points = parse_point_list(&fields.handle_points)
        .with_context(|| format!("{}: ungültige handlePoints", context()))?;
    if points.len() < 4 || points.len() % 3 != 1 {
        bail!(
            "{}: {} Handle-Punkte sind keine gültige Spline (3k+1, k ≥ 1)",
            context(),
            points.len()
        );
    }
    let curve_count = (points.len() - 1) / 3;

    let mut spline = SplineCurve::with_curve_count(curve_count);
    spline.set_transform(
        parse_vec3(&fields.position).with_context(|| format!("{}: position", context()))?,
        parse_quat(&fields.rotation).with_context(|| format!("{}: rotation", context()))?,
        parse_scale(&fields.scale).with_context(|| format!("{}: scale", context()))?,
    );

    // Vertragsreihenfolge: erst alle Knotenpunkte (0, 3, 6, …), dann die
    // inneren Handle-Paare (1, 2, 4, 5, …). Knoten-Bewegungen ziehen die
    // Default-Handles mit; die nachfolgenden Handle-Schreibvorgänge
    // überschreiben genau diese wieder.
    let mut order: Vec<usize> = (0..points.len()).step_by(3).collect();
    for knot in 0..curve_count {
        order.push(3 * knot + 1);
        order.push(3 * knot + 2);
    }
    for (slot, point) in order.into_iter().zip(&points) {
        spline.set_control_point(slot, *point);
    }

    let params = SurfaceParams {
        width: parse_f32_field(&fields.width).with_context(|| format!("{}: width", context()))?,
        side_depth: parse_f32_field(&fields.side_depth)
            .with_context(|| format!("{}: sideDepth", context()))?,
        slope_width: parse_f32_field(&fields.slope_width)
            .with_context(|| format!("{}: slopeWidth", context()))?,
        steps_per_curve: parse_steps(&fields.steps_per_curve)
            .with_context(|| format!("{}: stepsPerCurve", context()))?,
    };

    let mut road = Road::with_spline(name, spline, params);
    road.materials = parse_materials(&fields.materials);
    road.runtime_editable = parse_bool(&fields.runtime_editable)?;
    Ok(road)
}

/// Baut eine Kreuzung aus den Record-Feldern.
fn build_intersection(fields: &RecordFields) -> Result<Intersection> {
    let name = if fields.name.is_empty() {
        "Unbenannt".to_string()
    } else {
        fields.name.clone()
    };
    let context = || format!("Kreuzung '{}'", name);

    let kind = match fields.kind.trim() {
        "ThreeLane" => IntersectionKind::ThreeLane,
        "FourLane" => IntersectionKind::FourLane,
        other => bail!("{}: unbekannter Kreuzungstyp '{}'", context(), other),
    };

    let params = SurfaceParams {
        width: parse_f32_field(&fields.width).with_context(|| format!("{}: width", context()))?,
        side_depth: parse_f32_field(&fields.side_depth)
            .with_context(|| format!("{}: sideDepth", context()))?,
        slope_width: parse_f32_field(&fields.slope_width)
            .with_context(|| format!("{}: slopeWidth", context()))?,
        steps_per_curve: DEFAULT_STEPS_PER_CURVE,
    };

    let position =
        parse_vec3(&fields.position).with_context(|| format!("{}: position", context()))?;

    let mut intersection = Intersection::new(name.clone(), kind, position, params);
    intersection.rotation =
        parse_quat(&fields.rotation).with_context(|| format!("{}: rotation", context()))?;
    intersection.scale =
        parse_scale(&fields.scale).with_context(|| format!("{}: scale", context()))?;
    intersection.materials = parse_materials(&fields.materials);
    intersection.runtime_editable = parse_bool(&fields.runtime_editable)?;
    Ok(intersection)
}

/// Hilfsfunktion zum Parsen einer kommagetrennten Liste.
fn parse_list<T: std::str::FromStr>(text: &str, delimiter: char) -> Result<Vec<T>>
where
    <T as std::str::FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    text.split(delimiter)
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            let trimmed = s.trim();
            trimmed.parse::<T>().with_context(|| {
                format!(
                    "Wert '{}' konnte nicht geparst werden",
                    truncate_for_error(trimmed)
                )
            })
        })
        .collect::<Result<Vec<T>, _>>()
}

/// Kürzt einen String für Fehlermeldungen auf max. 40 Zeichen.
///
/// Schneidet an einer Zeichengrenze, nie mitten in einer
/// Multibyte-Sequenz.
fn truncate_for_error(s: &str) -> &str {
    match s.char_indices().nth(40) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

/// `"x,y,z"` → `Vec3`; leer = Nullpunkt.
fn parse_vec3(text: &str) -> Result<Vec3> {
    if text.trim().is_empty() {
        return Ok(Vec3::ZERO);
    }
    let values = parse_list::<f32>(text, ',')?;
    if values.len() != 3 {
        bail!("Erwartet 3 Komponenten, gefunden {}", values.len());
    }
    Ok(Vec3::new(values[0], values[1], values[2]))
}

/// `"x,y,z"` → Skalierung; leer = `Vec3::ONE`.
fn parse_scale(text: &str) -> Result<Vec3> {
    if text.trim().is_empty() {
        return Ok(Vec3::ONE);
    }
    parse_vec3(text)
}

/// `"x,y,z,w"` → Quaternion; leer = Identität.
fn parse_quat(text: &str) -> Result<Quat> {
    if text.trim().is_empty() {
        return Ok(Quat::IDENTITY);
    }
    let values = parse_list::<f32>(text, ',')?;
    if values.len() != 4 {
        bail!("Erwartet 4 Komponenten, gefunden {}", values.len());
    }
    Ok(Quat::from_xyzw(values[0], values[1], values[2], values[3]))
}

/// `"x,y,z;x,y,z;…"` → Punktliste.
fn parse_point_list(text: &str) -> Result<Vec<Vec3>> {
    text.split(';')
        .filter(|part| !part.trim().is_empty())
        .map(parse_vec3)
        .collect()
}

fn parse_f32_field(text: &str) -> Result<f32> {
    if text.trim().is_empty() {
        bail!("Pflichtfeld fehlt");
    }
    text.trim()
        .parse::<f32>()
        .with_context(|| format!("Wert '{}' ist keine Zahl", truncate_for_error(text.trim())))
}

fn parse_steps(text: &str) -> Result<u32> {
    if text.trim().is_empty() {
        return Ok(DEFAULT_STEPS_PER_CURVE);
    }
    let steps = text
        .trim()
        .parse::<u32>()
        .with_context(|| format!("Wert '{}' ist keine Schrittzahl", truncate_for_error(text)))?;
    if steps == 0 {
        bail!("stepsPerCurve muss mindestens 1 sein");
    }
    Ok(steps)
}

fn parse_materials(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"true"`/`"false"`; leer = `true`.
fn parse_bool(text: &str) -> Result<bool> {
    match text.trim() {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        other => bail!("Wert '{}' ist kein Wahrheitswert", truncate_for_error(other)),
    }
}
