//! Category legends: distinct values of a mapped column, each assigned a
//! target value (a hex color or a numeric string).
//!
//! Rebuilding is a pure transform over the prior legend: user-edited values
//! survive for category keys still present in the data, new categories get a
//! context-specific default, and categories no longer present are dropped.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::color::COLOR_POOL;
use crate::mapping::{ColumnMapping, Role};
use crate::table::DataTable;

/// Sorted category → target-value map. BTreeMap keeps iteration in the
/// lexicographic order the palette cycling is defined over.
pub type CategoryLegend = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendKind {
    SiteColor,
    SectorColor,
    BeamValue,
    RadiusValue,
}

impl LegendKind {
    pub fn is_color(self) -> bool {
        matches!(self, LegendKind::SiteColor | LegendKind::SectorColor)
    }

    /// Default assigned to a category that has no surviving prior value.
    ///
    /// Color legends cycle the fixed palette by sorted position. Value
    /// legends keyword-match the category text; more specific numbers are
    /// checked before their prefixes ("33" before "30") so a "33deg" antenna
    /// category cannot be captured by the "30" pattern.
    fn default_value(self, category: &str, sorted_index: usize) -> String {
        match self {
            LegendKind::SiteColor | LegendKind::SectorColor => {
                COLOR_POOL[sorted_index % COLOR_POOL.len()].to_string()
            }
            LegendKind::BeamValue => {
                let needle = category.to_lowercase();
                let value = if needle.contains("60") {
                    "60"
                } else if needle.contains("33") {
                    "33"
                } else if needle.contains("30") {
                    "30"
                } else if needle.contains("45") {
                    "45"
                } else {
                    "35"
                };
                value.to_string()
            }
            LegendKind::RadiusValue => {
                let needle = category.to_lowercase();
                let value = if needle.contains("small") {
                    "50"
                } else if needle.contains("micro") {
                    "80"
                } else if needle.contains("pico") {
                    "30"
                } else if needle.contains("large") {
                    "200"
                } else {
                    "120"
                };
                value.to_string()
            }
        }
    }
}

/// Build the legend for `column` over the whole table.
///
/// The category set is the sorted distinct set of non-empty trimmed values.
/// Returns an empty legend when the column yields no categories; the caller
/// decides how to report that.
pub fn build_legend(
    table: &DataTable,
    column: &str,
    prior: &CategoryLegend,
    kind: LegendKind,
) -> CategoryLegend {
    let mut categories = BTreeSet::new();
    for row in table.rows() {
        let value = row.value(column);
        if !value.is_empty() {
            categories.insert(value.to_string());
        }
    }

    categories
        .into_iter()
        .enumerate()
        .map(|(index, category)| {
            let value = match prior.get(&category) {
                Some(existing) if !existing.is_empty() => existing.clone(),
                _ => kind.default_value(&category, index),
            };
            (category, value)
        })
        .collect()
}

/// The four legends carried in the export configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegendSet {
    #[serde(default)]
    pub radius_value: CategoryLegend,
    #[serde(default)]
    pub beam_value: CategoryLegend,
    #[serde(default)]
    pub site_color: CategoryLegend,
    #[serde(default)]
    pub sector_color: CategoryLegend,
}

impl LegendSet {
    /// Rebuild all four legends against the current table and mapping,
    /// preserving prior values for surviving categories. A legend whose role
    /// has no mapped column comes back empty.
    pub fn rebuild(table: &DataTable, mapping: &ColumnMapping, prior: &LegendSet) -> LegendSet {
        let build = |role: Role, prior_legend: &CategoryLegend, kind: LegendKind| {
            match mapping.column_for(role) {
                Some(column) => build_legend(table, column, prior_legend, kind),
                None => CategoryLegend::new(),
            }
        };
        LegendSet {
            radius_value: build(Role::RadiusCategory, &prior.radius_value, LegendKind::RadiusValue),
            beam_value: build(Role::BeamCategory, &prior.beam_value, LegendKind::BeamValue),
            site_color: build(Role::SiteColor, &prior.site_color, LegendKind::SiteColor),
            sector_color: build(Role::SectorColor, &prior.sector_color, LegendKind::SectorColor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> DataTable {
        DataTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn categories_are_sorted_distinct_trimmed() {
        let table = table("Type\nmacro\n micro \nmacro\n\nsmall\n");
        let legend = build_legend(&table, "Type", &CategoryLegend::new(), LegendKind::RadiusValue);
        let keys: Vec<&str> = legend.keys().map(String::as_str).collect();
        assert_eq!(keys, ["macro", "micro", "small"]);
    }

    #[test]
    fn color_defaults_cycle_the_palette_by_sorted_position() {
        let table = table("Vendor\nvb\nva\nvc\n");
        let legend = build_legend(&table, "Vendor", &CategoryLegend::new(), LegendKind::SectorColor);
        assert_eq!(legend["va"], COLOR_POOL[0]);
        assert_eq!(legend["vb"], COLOR_POOL[1]);
        assert_eq!(legend["vc"], COLOR_POOL[2]);
    }

    #[test]
    fn palette_wraps_after_twelve_categories() {
        let rows: Vec<String> = (0..13).map(|i| format!("cat{i:02}")).collect();
        let csv = format!("C\n{}\n", rows.join("\n"));
        let table = table(&csv);
        let legend = build_legend(&table, "C", &CategoryLegend::new(), LegendKind::SiteColor);
        assert_eq!(legend["cat12"], COLOR_POOL[0]);
    }

    #[test]
    fn beam_keywords_map_to_known_widths() {
        let table = table("Beam\nABC-60\nnarrow30\nX33deg\npanel 45\nother\n");
        let legend = build_legend(&table, "Beam", &CategoryLegend::new(), LegendKind::BeamValue);
        assert_eq!(legend["ABC-60"], "60");
        assert_eq!(legend["narrow30"], "30");
        assert_eq!(legend["X33deg"], "33");
        assert_eq!(legend["panel 45"], "45");
        assert_eq!(legend["other"], "35");
    }

    #[test]
    fn beam_33_wins_over_30_prefix() {
        let table = table("Beam\ntype-33\n");
        let legend = build_legend(&table, "Beam", &CategoryLegend::new(), LegendKind::BeamValue);
        assert_eq!(legend["type-33"], "33");
    }

    #[test]
    fn radius_keywords_map_to_known_radii() {
        let table = table("Size\nSmallCell\nMicro site\nPICO\nLarge\nmacro\n");
        let legend = build_legend(&table, "Size", &CategoryLegend::new(), LegendKind::RadiusValue);
        assert_eq!(legend["SmallCell"], "50");
        assert_eq!(legend["Micro site"], "80");
        assert_eq!(legend["PICO"], "30");
        assert_eq!(legend["Large"], "200");
        assert_eq!(legend["macro"], "120");
    }

    #[test]
    fn rebuild_preserves_edited_values_for_surviving_categories() {
        let table = table("Type\nmacro\nsmall\n");
        let mut prior = CategoryLegend::new();
        prior.insert("macro".to_string(), "450".to_string());
        prior.insert("vanished".to_string(), "99".to_string());
        let legend = build_legend(&table, "Type", &prior, LegendKind::RadiusValue);
        assert_eq!(legend["macro"], "450", "edited value should survive rebuild");
        assert_eq!(legend["small"], "50", "new category should get a smart default");
        assert!(!legend.contains_key("vanished"), "removed category should be dropped");
    }

    #[test]
    fn empty_prior_value_is_replaced_by_default() {
        let table = table("Type\nmacro\n");
        let mut prior = CategoryLegend::new();
        prior.insert("macro".to_string(), String::new());
        let legend = build_legend(&table, "Type", &prior, LegendKind::RadiusValue);
        assert_eq!(legend["macro"], "120");
    }

    #[test]
    fn column_with_no_values_yields_empty_legend() {
        let table = table("Type,Other\n,x\n,y\n");
        let legend = build_legend(&table, "Type", &CategoryLegend::new(), LegendKind::BeamValue);
        assert!(legend.is_empty());
    }

    #[test]
    fn rebuild_skips_unmapped_roles() {
        let table = table("Site,Type\nA,macro\n");
        let mapping = ColumnMapping {
            radius_category: Some("Type".into()),
            ..Default::default()
        };
        let set = LegendSet::rebuild(&table, &mapping, &LegendSet::default());
        assert_eq!(set.radius_value.len(), 1);
        assert!(set.beam_value.is_empty());
        assert!(set.site_color.is_empty());
        assert!(set.sector_color.is_empty());
    }
}
