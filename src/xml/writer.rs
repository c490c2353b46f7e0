//! Writer für RoadCourse XML-Dateien.

use anyhow::{bail, Result};
use glam::{Quat, Vec3};

use crate::core::{IntersectionKind, RoadNetwork};

/// Schreibt ein Netzwerk als RoadCourse XML.
///
/// Die Handle-Punkte jeder Straße werden in Vertragsreihenfolge emittiert
/// (Knotenpunkte zuerst, dann die inneren Handle-Paare), Koordinaten mit
/// drei Dezimalstellen. Stetigkeitsmodi sind nicht Teil des Formats;
/// geladene Splines stehen auf `Free`.
///
/// Materiallisten sind kommagetrennt; ein Materialname mit Komma würde
/// beim Wieder-Laden in zwei Namen zerfallen und wird deshalb als Fehler
/// abgewiesen.
pub fn write_road_course(network: &RoadNetwork) -> Result<String> {
    let mut output = String::new();
    output.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>\n");
    output.push_str("<RoadCourse version=\"1\">\n");

    if network.meta.course_name.is_some() || network.meta.author.is_some() {
        output.push_str("    <meta>\n");
        if let Some(ref course_name) = network.meta.course_name {
            output.push_str(&format!(
                "        <courseName>{}</courseName>\n",
                escape_xml(course_name)
            ));
        }
        if let Some(ref author) = network.meta.author {
            output.push_str(&format!(
                "        <author>{}</author>\n",
                escape_xml(author)
            ));
        }
        output.push_str("    </meta>\n");
    }

    for (_, road) in network.roads() {
        let spline = road.spline();
        output.push_str("    <road>\n");
        output.push_str(&format!(
            "        <name>{}</name>\n",
            escape_xml(&road.name)
        ));
        output.push_str(&format!(
            "        <position>{}</position>\n",
            format_vec3(spline.position())
        ));
        output.push_str(&format!(
            "        <rotation>{}</rotation>\n",
            format_quat(spline.rotation())
        ));
        output.push_str(&format!(
            "        <scale>{}</scale>\n",
            format_vec3(spline.scale())
        ));
        output.push_str(&format!(
            "        <materials>{}</materials>\n",
            escape_xml(&join_materials(&road.materials, &road.name)?)
        ));
        output.push_str(&format!(
            "        <width>{}</width>\n",
            format_float(road.params.width)
        ));
        output.push_str(&format!(
            "        <sideDepth>{}</sideDepth>\n",
            format_float(road.params.side_depth)
        ));
        output.push_str(&format!(
            "        <slopeWidth>{}</slopeWidth>\n",
            format_float(road.params.slope_width)
        ));
        output.push_str(&format!(
            "        <stepsPerCurve>{}</stepsPerCurve>\n",
            road.params.steps_per_curve
        ));
        output.push_str(&format!(
            "        <runtimeEditable>{}</runtimeEditable>\n",
            road.runtime_editable
        ));
        output.push_str(&format!(
            "        <handlePoints>{}</handlePoints>\n",
            format_handle_points(spline)
        ));
        output.push_str("    </road>\n");
    }

    for (_, intersection) in network.intersections() {
        output.push_str("    <intersection>\n");
        output.push_str(&format!(
            "        <name>{}</name>\n",
            escape_xml(&intersection.name)
        ));
        output.push_str(&format!(
            "        <position>{}</position>\n",
            format_vec3(intersection.position)
        ));
        output.push_str(&format!(
            "        <rotation>{}</rotation>\n",
            format_quat(intersection.rotation)
        ));
        output.push_str(&format!(
            "        <scale>{}</scale>\n",
            format_vec3(intersection.scale)
        ));
        output.push_str(&format!(
            "        <materials>{}</materials>\n",
            escape_xml(&join_materials(&intersection.materials, &intersection.name)?)
        ));
        output.push_str(&format!(
            "        <width>{}</width>\n",
            format_float(intersection.params.width)
        ));
        output.push_str(&format!(
            "        <sideDepth>{}</sideDepth>\n",
            format_float(intersection.params.side_depth)
        ));
        output.push_str(&format!(
            "        <slopeWidth>{}</slopeWidth>\n",
            format_float(intersection.params.slope_width)
        ));
        output.push_str(&format!(
            "        <runtimeEditable>{}</runtimeEditable>\n",
            intersection.runtime_editable
        ));
        let kind = match intersection.kind {
            IntersectionKind::ThreeLane => "ThreeLane",
            IntersectionKind::FourLane => "FourLane",
        };
        output.push_str(&format!("        <type>{}</type>\n", kind));
        output.push_str("    </intersection>\n");
    }

    output.push_str("</RoadCourse>\n");

    Ok(output)
}

/// Handle-Punkte in Vertragsreihenfolge: Knotenpunkte (0, 3, 6, …) zuerst,
/// dann die inneren Handle-Paare (1, 2, 4, 5, …).
fn format_handle_points(spline: &crate::core::SplineCurve) -> String {
    let count = spline.control_point_count();
    let mut order: Vec<usize> = (0..count).step_by(3).collect();
    for knot in 0..spline.curve_count() {
        order.push(3 * knot + 1);
        order.push(3 * knot + 2);
    }

    order
        .into_iter()
        .filter_map(|index| spline.control_point(index))
        .map(format_vec3)
        .collect::<Vec<String>>()
        .join(";")
}

/// Fügt Materialnamen kommagetrennt zusammen.
///
/// Das Komma ist das Listen-Trennzeichen des Formats; ein Name, der selbst
/// eines enthält, würde beim Laden still in zwei Namen zerfallen.
fn join_materials(materials: &[String], owner: &str) -> Result<String> {
    for material in materials {
        if material.contains(',') {
            bail!(
                "Material '{}' von '{}' enthält ein Komma (Listen-Trennzeichen des Formats)",
                material,
                owner
            );
        }
    }
    Ok(materials.join(","))
}

fn format_vec3(v: Vec3) -> String {
    format!(
        "{},{},{}",
        format_float(v.x),
        format_float(v.y),
        format_float(v.z)
    )
}

fn format_quat(q: Quat) -> String {
    format!(
        "{},{},{},{}",
        format_float(q.x),
        format_float(q.y),
        format_float(q.z),
        format_float(q.w)
    )
}

fn format_float(value: f32) -> String {
    format!("{:.3}", value)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
