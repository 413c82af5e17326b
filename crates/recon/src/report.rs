//! Overlay document: merged records joined with the geo index, grouped by
//! category and origin, rendered as KML.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use serde::Serialize;

use crate::classify::Classifier;
use crate::config::CategoryTables;
use crate::evidence::category_counts;
use crate::geo::{GeoIndex, GeoPoint};
use crate::model::{CategoryCounts, DeviceRecord, Origin};

const ICON_BLUE: &str = "http://maps.google.com/mapfiles/ms/icons/blue-dot.png";
const ICON_GREEN: &str = "http://maps.google.com/mapfiles/ms/icons/green-dot.png";

/// Placeholder written for blank optional fields.
const DASH: &str = "-";

// ---------------------------------------------------------------------------
// Document tree
// ---------------------------------------------------------------------------

/// Fixed marker style per origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub id: &'static str,
    /// KML `aabbggrr` color.
    pub color: &'static str,
    pub icon: &'static str,
}

impl MarkerStyle {
    pub const REITERATED: MarkerStyle = MarkerStyle { id: "pinBlue", color: "ffff0000", icon: ICON_BLUE };
    pub const INSPECTION: MarkerStyle = MarkerStyle { id: "pinGreen", color: "ff00ff00", icon: ICON_GREEN };

    pub fn for_origin(origin: Origin) -> MarkerStyle {
        match origin {
            Origin::Reiterated => Self::REITERATED,
            Origin::Inspection => Self::INSPECTION,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub name: String,
    pub style: MarkerStyle,
    pub category: String,
    pub subtype: String,
    pub device_label: String,
    pub work_order: String,
    pub feeder: String,
    pub installation: String,
    pub point: GeoPoint,
}

impl Marker {
    fn new(record: &DeviceRecord, category: &str, point: GeoPoint) -> Self {
        Self {
            name: record.device_label.clone(),
            style: MarkerStyle::for_origin(record.origin),
            category: category.to_string(),
            subtype: record.origin.subtype_label().to_string(),
            device_label: record.device_label.clone(),
            work_order: record.work_order.clone(),
            feeder: record.feeder.clone(),
            installation: record.installation.clone(),
            point,
        }
    }

    /// Label/value pairs of the descriptive payload, blanks as a dash.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("CATEGORIA", self.category.as_str()),
            ("TIPO", self.subtype.as_str()),
            ("DISPOSITIVO", self.device_label.as_str()),
            ("NUMERO_OT", or_dash(&self.work_order)),
            ("ALIMENTADOR", or_dash(&self.feeder)),
            ("INSTALACAO_NOVA", or_dash(&self.installation)),
        ]
    }
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        DASH
    } else {
        s
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubtypeGroup {
    pub label: String,
    pub origin: Origin,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub subgroups: Vec<SubtypeGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayDocument {
    pub name: String,
    pub groups: Vec<CategoryGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayReport {
    pub document: OverlayDocument,
    pub matched: usize,
    pub unmatched: usize,
    pub category_counts: CategoryCounts,
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Subgroup order inside every category.
const SUBTYPE_ORDER: [Origin; 2] = [Origin::Reiterated, Origin::Inspection];

/// Join merged records with the index and group them for display.
///
/// Records without a point are counted as unmatched and left out. Categories
/// follow `tables` display order; empty categories and empty subtypes are
/// omitted.
pub fn build_report(
    records: &[DeviceRecord],
    index: &GeoIndex,
    tables: &CategoryTables,
    document_name: &str,
) -> OverlayReport {
    let classifier = Classifier::new(tables);
    let listed: HashSet<&str> = tables.order.iter().map(String::as_str).collect();

    let mut buckets: HashMap<(String, Origin), Vec<Marker>> = HashMap::new();
    let mut matched = 0usize;
    let mut unmatched = 0usize;

    for record in records {
        let Some(point) = index.get(&record.key) else {
            unmatched += 1;
            continue;
        };
        matched += 1;

        let mut category = classifier.classify(record);
        if !listed.contains(category) {
            category = classifier.default_category();
        }
        buckets
            .entry((category.to_string(), record.origin))
            .or_default()
            .push(Marker::new(record, category, *point));
    }

    let mut groups = Vec::new();
    for category in tables.display_order() {
        let subgroups: Vec<SubtypeGroup> = SUBTYPE_ORDER
            .iter()
            .filter_map(|origin| {
                let markers = buckets.remove(&(category.to_string(), *origin))?;
                Some(SubtypeGroup {
                    label: origin.subtype_label().to_string(),
                    origin: *origin,
                    markers,
                })
            })
            .collect();
        if !subgroups.is_empty() {
            groups.push(CategoryGroup { name: category.to_string(), subgroups });
        }
    }

    let document = OverlayDocument { name: document_name.to_string(), groups };
    let category_counts = category_counts(&document);

    log::info!("overlay: {matched} markers placed, {unmatched} records without coordinates");

    OverlayReport { document, matched, unmatched, category_counts }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Escape the five XML-significant characters.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

impl OverlayDocument {
    pub fn marker_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.subgroups.iter())
            .map(|s| s.markers.len())
            .sum()
    }

    /// Render as a KML 2.2 document.
    pub fn to_kml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
        out.push_str("  <Document>\n");
        let _ = writeln!(out, "    <name>{}</name>", escape_xml(&self.name));
        for style in [MarkerStyle::REITERATED, MarkerStyle::INSPECTION] {
            let _ = writeln!(
                out,
                "    <Style id=\"{}\"><IconStyle><color>{}</color><Icon><href>{}</href></Icon></IconStyle></Style>",
                style.id, style.color, style.icon
            );
        }
        for group in &self.groups {
            out.push_str("    <Folder>\n");
            let _ = writeln!(out, "      <name>{}</name>", escape_xml(&group.name));
            for sub in &group.subgroups {
                out.push_str("      <Folder>\n");
                let _ = writeln!(out, "        <name>{}</name>", escape_xml(&sub.label));
                for marker in &sub.markers {
                    write_placemark(&mut out, marker);
                }
                out.push_str("      </Folder>\n");
            }
            out.push_str("    </Folder>\n");
        }
        out.push_str("  </Document>\n");
        out.push_str("</kml>\n");
        out
    }
}

fn write_placemark(out: &mut String, marker: &Marker) {
    let fields = marker.fields();

    out.push_str("        <Placemark>\n");
    let _ = writeln!(out, "          <name>{}</name>", escape_xml(&marker.name));
    let _ = writeln!(out, "          <styleUrl>#{}</styleUrl>", marker.style.id);

    // Values are escaped, so a "]]>" in the data cannot close the CDATA early.
    out.push_str("          <description><![CDATA[");
    for (label, value) in &fields {
        let _ = write!(out, "<b>{label}:</b> {}<br/>", escape_xml(value));
    }
    out.push_str("]]></description>\n");

    out.push_str("          <ExtendedData>\n");
    for (label, value) in &fields {
        let _ = writeln!(
            out,
            "            <Data name=\"{label}\"><value>{}</value></Data>",
            escape_xml(value)
        );
    }
    out.push_str("          </ExtendedData>\n");

    let _ = writeln!(
        out,
        "          <Point><coordinates>{},{},0</coordinates></Point>",
        marker.point.longitude, marker.point.latitude
    );
    out.push_str("        </Placemark>\n");
}
