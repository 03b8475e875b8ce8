//! Role-to-column assignments.
//!
//! Five roles are required before an export can run; the four categorical
//! roles are optional and drive legend building and per-row resolution.

use serde::{Deserialize, Serialize};

use crate::table::DataTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SiteName,
    SectorName,
    Longitude,
    Latitude,
    Azimuth,
    RadiusCategory,
    BeamCategory,
    SiteColor,
    SectorColor,
}

impl Role {
    pub const REQUIRED: [Role; 5] = [
        Role::SiteName,
        Role::SectorName,
        Role::Longitude,
        Role::Latitude,
        Role::Azimuth,
    ];

    pub const OPTIONAL: [Role; 4] = [
        Role::RadiusCategory,
        Role::BeamCategory,
        Role::SiteColor,
        Role::SectorColor,
    ];

    /// Display name, also the needle for header auto-mapping.
    pub fn label(self) -> &'static str {
        match self {
            Role::SiteName => "SiteName",
            Role::SectorName => "SectorName",
            Role::Longitude => "Longitude",
            Role::Latitude => "Latitude",
            Role::Azimuth => "Azimuth",
            Role::RadiusCategory => "RadiusCategory",
            Role::BeamCategory => "BeamCategory",
            Role::SiteColor => "SiteColor",
            Role::SectorColor => "SectorColor",
        }
    }
}

#[derive(Debug)]
pub enum MappingError {
    RoleUnmapped(Role),
    UnknownColumn { role: Role, column: String },
}

impl std::fmt::Display for MappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingError::RoleUnmapped(role) => write!(
                f,
                "Required role {} is not mapped to a column",
                role.label()
            ),
            MappingError::UnknownColumn { role, column } => write!(
                f,
                "Role {} is mapped to column '{column}', which does not exist in the data",
                role.label()
            ),
        }
    }
}

impl std::error::Error for MappingError {}

/// Role → column assignments. An absent or empty column name means the role
/// is unmapped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beam_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_color: Option<String>,
}

impl ColumnMapping {
    /// Column assigned to `role`, treating empty strings as unmapped.
    pub fn column_for(&self, role: Role) -> Option<&str> {
        let slot = match role {
            Role::SiteName => &self.site_name,
            Role::SectorName => &self.sector_name,
            Role::Longitude => &self.longitude,
            Role::Latitude => &self.latitude,
            Role::Azimuth => &self.azimuth,
            Role::RadiusCategory => &self.radius_category,
            Role::BeamCategory => &self.beam_category,
            Role::SiteColor => &self.site_color,
            Role::SectorColor => &self.sector_color,
        };
        slot.as_deref().filter(|c| !c.is_empty())
    }

    fn set_column(&mut self, role: Role, column: String) {
        let slot = match role {
            Role::SiteName => &mut self.site_name,
            Role::SectorName => &mut self.sector_name,
            Role::Longitude => &mut self.longitude,
            Role::Latitude => &mut self.latitude,
            Role::Azimuth => &mut self.azimuth,
            Role::RadiusCategory => &mut self.radius_category,
            Role::BeamCategory => &mut self.beam_category,
            Role::SiteColor => &mut self.site_color,
            Role::SectorColor => &mut self.sector_color,
        };
        *slot = Some(column);
    }

    /// Check that every required role is mapped and that every mapped column
    /// exists in the table. Export refuses to start otherwise.
    pub fn validate(&self, table: &DataTable) -> Result<(), MappingError> {
        for role in Role::REQUIRED {
            if self.column_for(role).is_none() {
                return Err(MappingError::RoleUnmapped(role));
            }
        }
        for role in Role::REQUIRED.into_iter().chain(Role::OPTIONAL) {
            if let Some(column) = self.column_for(role)
                && !table.has_column(column)
            {
                return Err(MappingError::UnknownColumn {
                    role,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Guess assignments by case-insensitive substring match between role
    /// names and header names. First matching header wins per role.
    pub fn auto_map(headers: &[String]) -> Self {
        let mut mapping = ColumnMapping::default();
        for role in Role::REQUIRED.into_iter().chain(Role::OPTIONAL) {
            let needle = role.label().to_lowercase();
            if let Some(header) = headers.iter().find(|h| h.to_lowercase().contains(&needle)) {
                mapping.set_column(role, header.clone());
            }
        }
        mapping
    }

    /// Columns consumed by any mapped role, in a fixed role order. Used to
    /// keep them out of the "extra columns" description lists.
    pub fn mapped_columns(&self) -> Vec<&str> {
        Role::REQUIRED
            .into_iter()
            .chain(Role::OPTIONAL)
            .filter_map(|role| self.column_for(role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> DataTable {
        DataTable::from_reader(csv.as_bytes()).unwrap()
    }

    fn full_mapping() -> ColumnMapping {
        ColumnMapping {
            site_name: Some("Site".into()),
            sector_name: Some("Cell".into()),
            longitude: Some("Lon".into()),
            latitude: Some("Lat".into()),
            azimuth: Some("Az".into()),
            ..Default::default()
        }
    }

    #[test]
    fn validate_accepts_complete_mapping() {
        let table = table("Site,Cell,Lon,Lat,Az\nA,A-1,1,2,3\n");
        assert!(full_mapping().validate(&table).is_ok());
    }

    #[test]
    fn validate_rejects_unmapped_required_role() {
        let table = table("Site,Cell,Lon,Lat,Az\nA,A-1,1,2,3\n");
        let mut mapping = full_mapping();
        mapping.azimuth = None;
        let err = mapping.validate(&table).unwrap_err();
        assert!(matches!(err, MappingError::RoleUnmapped(Role::Azimuth)));
    }

    #[test]
    fn empty_string_counts_as_unmapped() {
        let table = table("Site,Cell,Lon,Lat,Az\nA,A-1,1,2,3\n");
        let mut mapping = full_mapping();
        mapping.latitude = Some(String::new());
        assert!(mapping.validate(&table).is_err());
    }

    #[test]
    fn validate_rejects_unknown_optional_column() {
        let table = table("Site,Cell,Lon,Lat,Az\nA,A-1,1,2,3\n");
        let mut mapping = full_mapping();
        mapping.beam_category = Some("NoSuchColumn".into());
        let err = mapping.validate(&table).unwrap_err();
        assert!(
            matches!(err, MappingError::UnknownColumn { role: Role::BeamCategory, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn auto_map_matches_headers_case_insensitively() {
        let headers: Vec<String> = ["My SiteName", "SECTORNAME", "longitude_deg", "Latitude", "azimuth"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = ColumnMapping::auto_map(&headers);
        assert_eq!(mapping.column_for(Role::SiteName), Some("My SiteName"));
        assert_eq!(mapping.column_for(Role::SectorName), Some("SECTORNAME"));
        assert_eq!(mapping.column_for(Role::Longitude), Some("longitude_deg"));
        assert_eq!(mapping.column_for(Role::Azimuth), Some("azimuth"));
    }

    #[test]
    fn auto_map_leaves_unmatched_roles_empty() {
        let headers: Vec<String> = vec!["Alpha".into(), "Beta".into()];
        let mapping = ColumnMapping::auto_map(&headers);
        for role in Role::REQUIRED {
            assert!(mapping.column_for(role).is_none(), "{} should be unmapped", role.label());
        }
    }
}
