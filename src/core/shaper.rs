use crate::domain::catalog::FieldCatalog;
use crate::domain::model::{AttributeValue, FieldName, ParcelRecord, TableView};

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRecord {
    pub record: ParcelRecord,
    pub map_link: String,
}

/// Rows of one query, with the field orders needed to derive both views.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub records: Vec<ShapedRecord>,
    selected_fields: Vec<FieldName>,
    requested_fields: Vec<FieldName>,
    link_label: String,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn selected_fields(&self) -> &[FieldName] {
        &self.selected_fields
    }

    /// Every column the service returned plus the link column.
    pub fn display_view(&self) -> TableView {
        let mut columns: Vec<String> = self
            .requested_fields
            .iter()
            .map(|f| f.as_str())
            .filter(|name| self.records.iter().any(|r| r.record.contains_key(name)))
            .map(str::to_string)
            .collect();

        // 服務端多回傳的欄位（例如 OBJECTID）依名稱排序附加在後
        let mut extra: Vec<String> = Vec::new();
        for shaped in &self.records {
            for key in shaped.record.keys() {
                if !columns.iter().any(|c| c == key) && !extra.iter().any(|c| c == key) {
                    extra.push(key.to_string());
                }
            }
        }
        extra.sort();
        columns.extend(extra);

        self.view_over(columns.iter().map(String::as_str))
    }

    /// The user's selection in selection order plus the link column.
    /// Coordinates only appear when the user picked them.
    pub fn export_view(&self) -> TableView {
        self.view_over(self.selected_fields.iter().map(|f| f.as_str()))
    }

    fn view_over<'a>(&self, columns: impl Iterator<Item = &'a str>) -> TableView {
        let columns: Vec<&str> = columns.collect();
        let mut headers: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        headers.push(self.link_label.clone());

        let rows = self
            .records
            .iter()
            .map(|shaped| {
                let mut row: Vec<AttributeValue> = columns
                    .iter()
                    .map(|c| shaped.record.get_key(c).clone())
                    .collect();
                row.push(AttributeValue::Text(shaped.map_link.clone()));
                row
            })
            .collect();

        TableView { headers, rows }
    }
}

/// Turns raw attribute records into a [`ResultSet`].
#[derive(Debug, Clone)]
pub struct ResultShaper {
    catalog: FieldCatalog,
}

impl ResultShaper {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn map_link(&self, record: &ParcelRecord) -> String {
        let lat = record.get(self.catalog.latitude_field).query_text();
        let lon = record.get(self.catalog.longitude_field).query_text();
        match (lat, lon) {
            (Some(lat), Some(lon)) => format!("{}{},{}", MAPS_SEARCH_URL, lat, lon),
            _ => String::new(),
        }
    }

    pub fn shape_results(
        &self,
        raw_records: Vec<ParcelRecord>,
        selected_fields: &[FieldName],
        requested_fields: &[FieldName],
    ) -> ResultSet {
        let records = raw_records
            .into_iter()
            .map(|record| ShapedRecord {
                map_link: self.map_link(&record),
                record,
            })
            .collect();

        ResultSet {
            records,
            selected_fields: selected_fields.to_vec(),
            requested_fields: requested_fields.to_vec(),
            link_label: self.catalog.map_link_label.to_string(),
        }
    }
}

impl Default for ResultShaper {
    fn default() -> Self {
        Self::new(FieldCatalog::default())
    }
}
