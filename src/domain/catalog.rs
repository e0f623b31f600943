use crate::domain::model::FieldName;

pub const DEFAULT_ENDPOINT: &str = "https://services3.arcgis.com/n6uYoouQZW75n5WI/arcgis/rest/services/Wisconsin_Statewide_Parcels/FeatureServer/0/query";

pub const MAP_LINK_LABEL: &str = "Google Maps Link";

const SEARCH_FIELDS: &[FieldName] = &[
    FieldName::OwnerName1,
    FieldName::OwnerName2,
    FieldName::ParcelId,
    FieldName::SiteAddress,
    FieldName::CountyName,
];

const DEFAULT_SELECTION: &[FieldName] = &[
    FieldName::ParcelId,
    FieldName::OwnerName1,
    FieldName::OwnerName2,
    FieldName::PostalAddress,
    FieldName::SiteAddress,
    FieldName::ZipCode,
    FieldName::SchoolDistrict,
    FieldName::AssessedValue,
    FieldName::LandValue,
    FieldName::ImprovementValue,
    FieldName::ForestLandValue,
    FieldName::EstimatedMarketValue,
    FieldName::NetPropertyTax,
    FieldName::GrossPropertyTax,
    FieldName::PropertyClass,
    FieldName::AuxiliaryClass,
    FieldName::AssessedAcres,
    FieldName::DeededAcres,
    FieldName::GisAcres,
    FieldName::CountyName,
    FieldName::LoadDate,
    FieldName::Longitude,
    FieldName::Latitude,
];

/// Immutable description of the parcel layer, built once at startup and
/// handed to the predicate builder and result shaper.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCatalog {
    pub available: &'static [FieldName],
    pub search_fields: &'static [FieldName],
    pub default_selection: &'static [FieldName],
    pub acreage_field: FieldName,
    pub latitude_field: FieldName,
    pub longitude_field: FieldName,
    pub map_link_label: &'static str,
}

impl FieldCatalog {
    pub fn wisconsin_parcels() -> Self {
        Self {
            available: FieldName::ALL,
            search_fields: SEARCH_FIELDS,
            default_selection: DEFAULT_SELECTION,
            acreage_field: FieldName::GisAcres,
            latitude_field: FieldName::Latitude,
            longitude_field: FieldName::Longitude,
            map_link_label: MAP_LINK_LABEL,
        }
    }

    pub fn default_search_field(&self) -> FieldName {
        self.search_fields
            .first()
            .copied()
            .unwrap_or(FieldName::OwnerName1)
    }

    pub fn is_search_field(&self, field: FieldName) -> bool {
        self.search_fields.contains(&field)
    }

    pub fn is_default_selected(&self, field: FieldName) -> bool {
        self.default_selection.contains(&field)
    }

    pub fn coordinate_fields(&self) -> [FieldName; 2] {
        [self.latitude_field, self.longitude_field]
    }

    /// One line per field: `*` marks searchable fields, `+` the default selection.
    pub fn listing(&self) -> Vec<String> {
        self.available
            .iter()
            .map(|field| {
                let search = if self.is_search_field(*field) { '*' } else { ' ' };
                let default = if self.is_default_selected(*field) { '+' } else { ' ' };
                format!("{}{} {}", search, default, field)
            })
            .collect()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::wisconsin_parcels()
    }
}
