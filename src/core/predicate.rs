use crate::domain::catalog::FieldCatalog;
use crate::domain::model::{FieldName, MatchMode, QuerySpec};

/// Match-all predicate; the service still caps the page size.
pub const MATCH_ALL: &str = "1=1";

/// Builds the `where` predicate and the requested field list for a query.
#[derive(Debug, Clone)]
pub struct PredicateBuilder {
    catalog: FieldCatalog,
}

impl PredicateBuilder {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    /// `search_value` is inserted verbatim. Quotes are not escaped, so a value
    /// such as `O'Brien` yields a malformed predicate on the service side.
    pub fn build_predicate(&self, spec: &QuerySpec) -> String {
        let mut clauses = Vec::with_capacity(2);

        if !spec.search_value.is_empty() {
            if spec.search_value.contains('\'') {
                tracing::warn!(
                    "Search value contains a single quote and is sent unescaped: {}",
                    spec.search_value
                );
            }
            clauses.push(match spec.match_mode {
                MatchMode::Exact => format!("{} = '{}'", spec.search_field, spec.search_value),
                MatchMode::Partial => {
                    format!("{} LIKE '%{}%'", spec.search_field, spec.search_value)
                }
            });
        }

        if spec.min_acres > 0.0 {
            clauses.push(format!("{} > {}", self.catalog.acreage_field, spec.min_acres));
        }

        if clauses.is_empty() {
            MATCH_ALL.to_string()
        } else {
            clauses.join(" AND ")
        }
    }

    /// Selected fields (deduplicated, order kept) plus the coordinate fields
    /// needed for the map link.
    pub fn normalize_fields(&self, selected: &[FieldName]) -> Vec<FieldName> {
        let mut fields: Vec<FieldName> = Vec::with_capacity(selected.len() + 2);
        for field in selected
            .iter()
            .chain(self.catalog.coordinate_fields().iter())
        {
            if !fields.contains(field) {
                fields.push(*field);
            }
        }
        fields
    }
}

impl Default for PredicateBuilder {
    fn default() -> Self {
        Self::new(FieldCatalog::default())
    }
}

/// `outFields` parameter value.
pub fn join_fields(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(FieldName::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_spec(value: &str, mode: MatchMode, min_acres: f64) -> QuerySpec {
        QuerySpec::new(FieldName::OwnerName1, vec![FieldName::ParcelId])
            .with_value(value, mode)
            .with_min_acres(min_acres)
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let builder = PredicateBuilder::default();
        let spec = owner_spec("", MatchMode::Partial, 0.0);
        assert_eq!(builder.build_predicate(&spec), "1=1");
    }

    #[test]
    fn test_exact_match_clause() {
        let builder = PredicateBuilder::default();
        let spec = owner_spec("Smith", MatchMode::Exact, 0.0);
        assert_eq!(builder.build_predicate(&spec), "OWNERNME1 = 'Smith'");
    }

    #[test]
    fn test_partial_match_with_acreage() {
        let builder = PredicateBuilder::default();
        let spec = owner_spec("Smith", MatchMode::Partial, 5.0);
        assert_eq!(
            builder.build_predicate(&spec),
            "OWNERNME1 LIKE '%Smith%' AND GISACRES > 5"
        );
    }

    #[test]
    fn test_acreage_only_and_fractional_threshold() {
        let builder = PredicateBuilder::default();
        let spec = owner_spec("", MatchMode::Exact, 2.5);
        assert_eq!(builder.build_predicate(&spec), "GISACRES > 2.5");
    }

    #[test]
    fn test_search_value_is_not_escaped() {
        let builder = PredicateBuilder::default();
        let spec = owner_spec("O'Brien", MatchMode::Exact, 0.0);
        assert_eq!(builder.build_predicate(&spec), "OWNERNME1 = 'O'Brien'");
    }

    #[test]
    fn test_build_predicate_is_idempotent() {
        let builder = PredicateBuilder::default();
        let spec = QuerySpec::new(FieldName::CountyName, vec![FieldName::ParcelId])
            .with_value("DANE", MatchMode::Partial)
            .with_min_acres(40.0);
        let first = builder.build_predicate(&spec);
        let second = builder.build_predicate(&spec);
        assert_eq!(first, second);
        assert_eq!(first, "CONAME LIKE '%DANE%' AND GISACRES > 40");
    }

    #[test]
    fn test_normalize_fields_adds_coordinates() {
        let builder = PredicateBuilder::default();
        assert_eq!(
            builder.normalize_fields(&[FieldName::ParcelId]),
            vec![FieldName::ParcelId, FieldName::Latitude, FieldName::Longitude]
        );
    }

    #[test]
    fn test_normalize_fields_keeps_user_order_without_duplicates() {
        let builder = PredicateBuilder::default();
        let fields = builder.normalize_fields(&[
            FieldName::Longitude,
            FieldName::OwnerName1,
            FieldName::OwnerName1,
        ]);
        assert_eq!(
            fields,
            vec![FieldName::Longitude, FieldName::OwnerName1, FieldName::Latitude]
        );
        assert_eq!(join_fields(&fields), "LONGITUDE,OWNERNME1,LATITUDE");
    }
}
