//! Per-row resolution: raw row + mapping + legends → the effective values a
//! sector is drawn with, plus provenance for the popup text.

use crate::color::{DEFAULT_BASE_COLOR, hex_to_kml_color};
use crate::legend::{CategoryLegend, LegendSet};
use crate::mapping::{ColumnMapping, Role};
use crate::table::Row;

pub const DEFAULT_RADIUS_M: f64 = 120.0;
pub const DEFAULT_BEAM_DEG: f64 = 35.0;

/// Which rule produced a resolved radius/beam value.
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    /// No category column mapped, or the row's category cell was blank.
    Default,
    /// Legend lookup succeeded; `value` is the legend entry as parsed.
    Mapped { category: String, value: f64 },
    /// The category exists in the row but has no usable legend entry.
    MissingMap { category: String },
}

impl Provenance {
    /// Human-readable source note for the description block, e.g.
    /// `Default (120m)` or `Category: Macro (Missing Map, using Default)`.
    pub fn describe(&self, default_value: f64, unit: &str) -> String {
        match self {
            Provenance::Default => format!("Default ({default_value}{unit})"),
            Provenance::Mapped { category, value } => {
                format!("Category: {category} ({value}{unit})")
            }
            Provenance::MissingMap { category } => {
                format!("Category: {category} (Missing Map, using Default)")
            }
        }
    }
}

/// Everything the document assembler needs for one valid row.
#[derive(Debug, Clone)]
pub struct ResolvedSector {
    pub site: String,
    pub sector: String,
    pub longitude: f64,
    pub latitude: f64,
    pub azimuth: f64,
    pub radius_m: f64,
    pub beam_deg: f64,
    pub radius_source: Provenance,
    pub beam_source: Provenance,
    /// Category display value for the sector color, including the N/A markers.
    pub sector_category: String,
    /// Resolved sector fill/line color, KML-encoded at the export opacity.
    pub sector_color: String,
    pub site_category: String,
    /// Resolved site marker color, always fully opaque.
    pub site_color: String,
}

/// Resolve one row. Returns `None` when the row has no usable coordinates;
/// such rows contribute neither a polygon nor a site marker.
pub fn resolve_row(
    row: &Row,
    mapping: &ColumnMapping,
    legends: &LegendSet,
    opacity_pct: u8,
) -> Option<ResolvedSector> {
    let value_for = |role: Role| row.value(mapping.column_for(role).unwrap_or(""));

    let longitude = parse_finite(value_for(Role::Longitude))?;
    let latitude = parse_finite(value_for(Role::Latitude))?;
    let azimuth = parse_finite(value_for(Role::Azimuth)).unwrap_or(0.0);

    let (radius_m, radius_source) = resolve_quantity(
        value_for(Role::RadiusCategory),
        mapping.column_for(Role::RadiusCategory).is_some(),
        &legends.radius_value,
        DEFAULT_RADIUS_M,
    );
    let (beam_deg, beam_source) = resolve_quantity(
        value_for(Role::BeamCategory),
        mapping.column_for(Role::BeamCategory).is_some(),
        &legends.beam_value,
        DEFAULT_BEAM_DEG,
    );

    let (sector_category, sector_color) = resolve_color(
        value_for(Role::SectorColor),
        mapping.column_for(Role::SectorColor).is_some(),
        &legends.sector_color,
        opacity_pct,
    );
    // Site markers are never translucent, whatever the export opacity.
    let (site_category, site_color) = resolve_color(
        value_for(Role::SiteColor),
        mapping.column_for(Role::SiteColor).is_some(),
        &legends.site_color,
        100,
    );

    Some(ResolvedSector {
        site: value_for(Role::SiteName).to_string(),
        sector: value_for(Role::SectorName).to_string(),
        longitude,
        latitude,
        azimuth,
        radius_m,
        beam_deg,
        radius_source,
        beam_source,
        sector_category,
        sector_color,
        site_category,
        site_color,
    })
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Radius/beam resolution with fallback. The returned value is forced back
/// to `default` when non-finite or non-positive; the provenance keeps the
/// legend entry so the popup still shows what was looked up.
fn resolve_quantity(
    category: &str,
    column_mapped: bool,
    legend: &CategoryLegend,
    default: f64,
) -> (f64, Provenance) {
    if !column_mapped || category.is_empty() {
        return (default, Provenance::Default);
    }

    let mapped = legend
        .get(category)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .and_then(parse_finite);

    match mapped {
        Some(value) => {
            let effective = if value > 0.0 { value } else { default };
            (
                effective,
                Provenance::Mapped {
                    category: category.to_string(),
                    value,
                },
            )
        }
        None => (
            default,
            Provenance::MissingMap {
                category: category.to_string(),
            },
        ),
    }
}

fn resolve_color(
    raw_value: &str,
    column_mapped: bool,
    legend: &CategoryLegend,
    opacity_pct: u8,
) -> (String, String) {
    if !column_mapped {
        return (
            "N/A (No Column)".to_string(),
            hex_to_kml_color(DEFAULT_BASE_COLOR, opacity_pct),
        );
    }

    let category = if raw_value.is_empty() {
        "N/A (Blank Value)".to_string()
    } else {
        raw_value.to_string()
    };

    let base = legend
        .get(&category)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_BASE_COLOR);

    (category, hex_to_kml_color(base, opacity_pct))
}
