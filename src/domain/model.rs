use crate::utils::error::{ParcelError, Result};
use crate::utils::validation::{validate_non_negative, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

macro_rules! parcel_fields {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Attribute names published by the statewide parcel layer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum FieldName {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl FieldName {
            /// 服務端欄位順序
            pub const ALL: &'static [FieldName] = &[$(FieldName::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(FieldName::$variant => $name,)+
                }
            }
        }

        impl FromStr for FieldName {
            type Err = ParcelError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    $($name => Ok(FieldName::$variant),)+
                    other => Err(ParcelError::UnknownFieldError {
                        name: other.to_string(),
                    }),
                }
            }
        }
    };
}

parcel_fields! {
    ObjectId => "OBJECTID",
    ParcelId => "PARCELID",
    TaxParcelId => "TAXPARCELID",
    ParcelDate => "PARCELDATE",
    TaxRollYear => "TAXROLLYEAR",
    OwnerName1 => "OWNERNME1",
    OwnerName2 => "OWNERNME2",
    PostalAddress => "PSTLADRESS",
    SiteAddress => "SITEADRESS",
    AddressNumberPrefix => "ADDNUMPREFIX",
    AddressNumber => "ADDNUM",
    AddressNumberSuffix => "ADDNUMSUFFIX",
    Prefix => "PREFIX",
    StreetName => "STREETNAME",
    StreetType => "STREETTYPE",
    Suffix => "SUFFIX",
    LandmarkName => "LANDMARKNAME",
    UnitType => "UNITTYPE",
    UnitId => "UNITID",
    PlaceName => "PLACENAME",
    ZipCode => "ZIPCODE",
    Zip4 => "ZIP4",
    State => "STATE",
    SchoolDistrict => "SCHOOLDIST",
    SchoolDistrictNo => "SCHOOLDISTNO",
    AssessedValue => "CNTASSDVALUE",
    LandValue => "LNDVALUE",
    ImprovementValue => "IMPVALUE",
    ForestLandValue => "MFLVALUE",
    EstimatedMarketValue => "ESTFMKVALUE",
    NetPropertyTax => "NETPRPTA",
    GrossPropertyTax => "GRSPRPTA",
    PropertyClass => "PROPCLASS",
    AuxiliaryClass => "AUXCLASS",
    AssessedAcres => "ASSDACRES",
    DeededAcres => "DEEDACRES",
    GisAcres => "GISACRES",
    CountyName => "CONAME",
    LoadDate => "LOADDATE",
    Longitude => "LONGITUDE",
    Latitude => "LATITUDE",
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma separated list such as `PARCELID,OWNERNME1`.
pub fn parse_field_list(list: &str) -> Result<Vec<FieldName>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(FieldName::from_str)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    #[default]
    Partial,
}

/// One search submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub search_field: FieldName,
    #[serde(default)]
    pub search_value: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub min_acres: f64,
    pub output_fields: Vec<FieldName>,
}

impl QuerySpec {
    pub fn new(search_field: FieldName, output_fields: Vec<FieldName>) -> Self {
        Self {
            search_field,
            search_value: String::new(),
            match_mode: MatchMode::default(),
            min_acres: 0.0,
            output_fields,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>, mode: MatchMode) -> Self {
        self.search_value = value.into();
        self.match_mode = mode;
        self
    }

    pub fn with_min_acres(mut self, min_acres: f64) -> Self {
        self.min_acres = min_acres;
        self
    }
}

impl Validate for QuerySpec {
    fn validate(&self) -> Result<()> {
        if self.output_fields.is_empty() {
            return Err(ParcelError::ValidationError {
                message: "Please select at least one field to return.".to_string(),
            });
        }
        validate_non_negative("min_acres", self.min_acres)
    }
}

/// Scalar attribute value as returned by the feature service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Text used when the value is embedded in a URL. Null and NaN have none;
    /// whole floats keep their `.0` (`44.0`, not `44`).
    pub fn query_text(&self) -> Option<String> {
        match self {
            AttributeValue::Null => None,
            AttributeValue::Float(f) if f.is_nan() => None,
            AttributeValue::Float(f) => Some(format!("{:?}", f)),
            AttributeValue::Integer(i) => Some(i.to_string()),
            AttributeValue::Bool(true) => Some("True".to_string()),
            AttributeValue::Bool(false) => Some("False".to_string()),
            AttributeValue::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

static NULL: AttributeValue = AttributeValue::Null;

/// Attributes of one returned feature. Missing keys read as null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelRecord {
    attributes: BTreeMap<String, AttributeValue>,
}

impl ParcelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FieldName, value: impl Into<AttributeValue>) -> Self {
        self.insert(field.as_str(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(key.into(), value);
    }

    pub fn get(&self, field: FieldName) -> &AttributeValue {
        self.get_key(field.as_str())
    }

    pub fn get_key(&self, key: &str) -> &AttributeValue {
        self.attributes.get(key).unwrap_or(&NULL)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Header row plus typed cells, ready for a table widget or an exporter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<AttributeValue>>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// What the feature service answered for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Features(Vec<ParcelRecord>),
    /// 200 但沒有 `features`，通常是服務端的 `error` 物件
    NoFeatures { detail: Option<String> },
    HttpFailure { status: u16 },
}

impl FetchOutcome {
    pub fn into_records(self) -> Vec<ParcelRecord> {
        match self {
            FetchOutcome::Features(records) => records,
            _ => Vec::new(),
        }
    }

    pub fn failure_status(&self) -> Option<u16> {
        match self {
            FetchOutcome::HttpFailure { status } => Some(*status),
            _ => None,
        }
    }
}

/// Non-fatal conditions surfaced to the user instead of results.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNotice {
    NoFieldsSelected,
    InvalidQuery { message: String },
    NoFeatures { detail: Option<String> },
    HttpFailure { status: u16 },
    Transport { message: String },
    NoResults,
}

impl QueryNotice {
    pub fn message(&self) -> String {
        match self {
            QueryNotice::NoFieldsSelected => {
                "Please select at least one field to return.".to_string()
            }
            QueryNotice::InvalidQuery { message } => message.clone(),
            QueryNotice::NoFeatures { detail: Some(detail) } => {
                format!("No features found in the response: {}", detail)
            }
            QueryNotice::NoFeatures { detail: None } => {
                "No features found in the response.".to_string()
            }
            QueryNotice::HttpFailure { status } => {
                format!("API request failed with status code: {}", status)
            }
            QueryNotice::Transport { message } => format!("API request failed: {}", message),
            QueryNotice::NoResults => "No results found.".to_string(),
        }
    }

    /// 警告類（使用者輸入或空結果）相對於錯誤類
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            QueryNotice::NoFieldsSelected | QueryNotice::InvalidQuery { .. } | QueryNotice::NoResults
        )
    }
}

impl fmt::Display for QueryNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
