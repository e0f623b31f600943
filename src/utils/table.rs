use crate::domain::model::TableView;
use comfy_table::Table;

/// Terminal rendering of a table view. Cells are never truncated so the map
/// links stay usable.
pub fn render_table(view: &TableView) -> String {
    let mut table = Table::new();
    table.set_header(view.headers.iter());
    for row in &view.rows {
        table.add_row(row.iter().map(|cell| cell.to_string()));
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shaper::ResultShaper;
    use crate::domain::model::{AttributeValue, FieldName, ParcelRecord};

    #[test]
    fn test_render_includes_headers_and_cells() {
        let view = TableView {
            headers: vec!["PARCELID".to_string(), "GISACRES".to_string()],
            rows: vec![
                vec![AttributeValue::Text("A1".into()), AttributeValue::Float(1.5)],
                vec![AttributeValue::Text("B22".into()), AttributeValue::Null],
            ],
        };

        let rendered = render_table(&view);
        assert!(rendered.contains("PARCELID"));
        assert!(rendered.contains("GISACRES"));
        assert!(rendered.contains("A1"));
        assert!(rendered.contains("1.5"));
        assert!(rendered.contains("B22"));
    }

    #[test]
    fn test_map_links_are_rendered_in_full() {
        let shaper = ResultShaper::default();
        let record = ParcelRecord::new()
            .with(FieldName::ParcelId, "A1")
            .with(FieldName::Latitude, 44.5)
            .with(FieldName::Longitude, -89.5);
        let results = shaper.shape_results(
            vec![record],
            &[FieldName::ParcelId],
            &[FieldName::ParcelId, FieldName::Latitude, FieldName::Longitude],
        );

        let rendered = render_table(&results.display_view());
        assert!(rendered.contains("Google Maps Link"));
        assert!(rendered.contains("https://www.google.com/maps/search/?api=1&query=44.5,-89.5"));
    }
}
