use itertools::Itertools;
use model::path::GeoPoint;

pub const CREATOR: &str = "Twin Cities Marathon Route Planner";

/// Elevation written for every exported point, drawn routes carry none.
pub const PLACEHOLDER_ELEVATION_METERS: u32 = 300;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Writes a GPX 1.1 document with a single track. The first and last point
/// are named `Start` and `Finish`.
pub fn export_gpx(points: &[GeoPoint], name: &str, description: &str) -> String {
    let last = points.len().saturating_sub(1);
    let track_points = points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let label = if index == 0 {
                "\n      <name>Start</name>"
            } else if index == last {
                "\n      <name>Finish</name>"
            } else {
                ""
            };
            format!(
                "    <trkpt lat=\"{}\" lon=\"{}\">\n      <ele>{}</ele>{}\n    </trkpt>",
                point.latitude, point.longitude, PLACEHOLDER_ELEVATION_METERS, label
            )
        })
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="{creator}">
  <trk>
    <name>{name}</name>
    <desc>{description}</desc>
    <trkseg>
{track_points}
    </trkseg>
  </trk>
</gpx>
"#,
        creator = CREATOR,
        name = escape(name),
        description = escape(description),
    )
}
