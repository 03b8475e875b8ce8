//! Document assembly: resolved rows → the final KML text.
//!
//! One polygon placemark per valid row, one point placemark per unique site
//! (first occurrence wins), and one shared icon style per distinct site
//! color, referenced by id.

use std::collections::HashSet;

use crate::config::ExportConfig;
use crate::geometry::sector_outline;
use crate::kml::Element;
use crate::mapping::{MappingError, Role};
use crate::resolve::{DEFAULT_BEAM_DEG, DEFAULT_RADIUS_M, ResolvedSector, resolve_row};
use crate::table::{DataTable, Row};

const DOCUMENT_NAME: &str = "Sector Coverage Export";
const SITE_ICON_HREF: &str = "http://maps.google.com/mapfiles/kml/pal2/icon18.png";
const DESCRIPTION_FONT: &str = "<font style=\"font-size:8pt; font-family:Arial;\">";

/// Assemble the complete KML document. Fails only on an incomplete or
/// inconsistent column mapping; dirty rows are skipped, not fatal.
pub fn build_document(table: &DataTable, config: &ExportConfig) -> Result<String, MappingError> {
    config.columns.validate(table)?;

    let mut resolved: Vec<(&Row, ResolvedSector)> = Vec::new();
    let mut skipped = 0usize;
    for (index, row) in table.rows().iter().enumerate() {
        match resolve_row(row, &config.columns, &config.legends, config.opacity_pct) {
            Some(sector) => resolved.push((row, sector)),
            None => {
                skipped += 1;
                tracing::debug!(row = index + 1, "skipping row with non-numeric coordinates");
            }
        }
    }

    // First occurrence per site name decides marker position and color.
    let mut seen_sites: HashSet<&str> = HashSet::new();
    let mut first_per_site: Vec<&ResolvedSector> = Vec::new();
    for (_, sector) in &resolved {
        if seen_sites.insert(sector.site.as_str()) {
            first_per_site.push(sector);
        }
    }

    // Identical site colors share one style definition.
    let mut style_ids: HashSet<String> = HashSet::new();
    let mut styles: Vec<Element> = Vec::new();
    for sector in &first_per_site {
        let id = site_style_id(&sector.site_color);
        if style_ids.insert(id.clone()) {
            styles.push(site_style(&id, &sector.site_color));
        }
    }

    let sector_columns = selected_columns(config.sector_info_columns.as_deref(), table);
    let site_columns = selected_columns(config.site_info_columns.as_deref(), table);
    let sector_excluded: HashSet<&str> = config.columns.mapped_columns().into_iter().collect();
    let site_excluded: HashSet<&str> = Role::REQUIRED
        .into_iter()
        .chain([Role::SiteColor])
        .filter_map(|role| config.columns.column_for(role))
        .collect();

    let mut document = Element::new("Document").child(Element::leaf("name", DOCUMENT_NAME));
    for style in styles {
        document = document.child(style);
    }

    let mut emitted_sites: HashSet<&str> = HashSet::new();
    for (row, sector) in &resolved {
        document = document.child(sector_placemark(row, sector, sector_columns, &sector_excluded));
        if emitted_sites.insert(sector.site.as_str()) {
            document = document.child(site_placemark(row, sector, site_columns, &site_excluded));
        }
    }

    tracing::info!(
        sectors = resolved.len(),
        sites = first_per_site.len(),
        skipped,
        "assembled KML document"
    );

    let root = Element::new("kml")
        .attr("xmlns", "http://www.opengis.net/kml/2.2")
        .child(document);
    Ok(root.into_document())
}

fn selected_columns<'a>(selection: Option<&'a [String]>, table: &'a DataTable) -> &'a [String] {
    selection.unwrap_or_else(|| table.headers())
}

fn site_style_id(site_color: &str) -> String {
    // Drop the alpha byte; site colors are always opaque so the RGB part
    // alone identifies the style.
    format!("siteStyle_{}", &site_color[2..])
}

fn site_style(id: &str, color: &str) -> Element {
    Element::new("Style").attr("id", id).child(
        Element::new("IconStyle")
            .child(Element::leaf("color", color))
            .child(Element::leaf("scale", "1.0"))
            .child(Element::new("Icon").child(Element::leaf("href", SITE_ICON_HREF))),
    )
}

fn sector_placemark(
    row: &Row,
    sector: &ResolvedSector,
    selected: &[String],
    excluded: &HashSet<&str>,
) -> Element {
    let outline = sector_outline(
        sector.longitude,
        sector.latitude,
        sector.azimuth,
        sector.radius_m,
        sector.beam_deg,
    );
    let coordinates = outline
        .iter()
        .map(|(lon, lat)| format!("{lon:.6},{lat:.6},0"))
        .collect::<Vec<_>>()
        .join(" ");

    Element::new("Placemark")
        .child(Element::leaf("name", &sector.sector))
        .child(Element::new("description").cdata(sector_description(row, sector, selected, excluded)))
        .child(
            Element::new("Style")
                .child(
                    Element::new("LineStyle")
                        .child(Element::leaf("color", &sector.sector_color))
                        .child(Element::leaf("width", "1.5")),
                )
                .child(Element::new("PolyStyle").child(Element::leaf("color", &sector.sector_color))),
        )
        .child(
            Element::new("Polygon").child(
                Element::new("outerBoundaryIs").child(
                    Element::new("LinearRing").child(Element::leaf("coordinates", coordinates)),
                ),
            ),
        )
}

fn sector_description(
    row: &Row,
    sector: &ResolvedSector,
    selected: &[String],
    excluded: &HashSet<&str>,
) -> String {
    let mut text = String::from(DESCRIPTION_FONT);
    text.push_str("<b>Sector Information</b><br>");
    text.push_str(&format!("Site = {}<br>", sector.site));
    text.push_str(&format!("Sector = {}<br>", sector.sector));
    text.push_str(&format!("Azimuth = {}<br>", sector.azimuth));
    text.push_str(&format!(
        "Beam = {}\u{b0} ({})<br>",
        sector.beam_deg,
        sector.beam_source.describe(DEFAULT_BEAM_DEG, "\u{b0}")
    ));
    text.push_str(&format!(
        "Radius = {}m ({})<br>",
        sector.radius_m,
        sector.radius_source.describe(DEFAULT_RADIUS_M, "m")
    ));
    text.push_str(&format!("Sector Color Category = {}<br>", sector.sector_category));
    push_extra_columns(&mut text, row, selected, excluded);
    text.push_str("</font>");
    text
}

fn site_placemark(
    row: &Row,
    sector: &ResolvedSector,
    selected: &[String],
    excluded: &HashSet<&str>,
) -> Element {
    let mut text = String::from(DESCRIPTION_FONT);
    text.push_str("<b>Site Information</b><br>");
    text.push_str(&format!("Color Category = {}<br>", sector.site_category));
    push_extra_columns(&mut text, row, selected, excluded);
    text.push_str("</font>");

    Element::new("Placemark")
        .child(Element::leaf("name", &sector.site))
        .child(Element::new("description").cdata(text))
        .child(Element::leaf("styleUrl", format!("#{}", site_style_id(&sector.site_color))))
        .child(Element::new("Point").child(Element::leaf(
            "coordinates",
            format!("{},{},0", sector.longitude, sector.latitude),
        )))
}

/// Append `Header = value` lines for every selected column that is not
/// already consumed by the mapping and is non-empty in this row.
fn push_extra_columns(
    text: &mut String,
    row: &Row,
    selected: &[String],
    excluded: &HashSet<&str>,
) {
    for header in selected {
        if excluded.contains(header.as_str()) {
            continue;
        }
        let value = row.value(header);
        if !value.is_empty() {
            text.push_str(&format!("{header} = {value}<br>"));
        }
    }
}
