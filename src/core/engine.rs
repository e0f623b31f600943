use crate::core::export::{export_table, ExportArtifact};
use crate::core::predicate::PredicateBuilder;
use crate::core::shaper::{ResultSet, ResultShaper};
use crate::domain::catalog::FieldCatalog;
use crate::domain::model::{FetchOutcome, FieldName, QueryNotice, QuerySpec};
use crate::domain::ports::{ExportFormat, ParcelSource, Storage};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// What a query would send. A rejected query carries the notice and no fields.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub predicate: String,
    pub requested_fields: Vec<FieldName>,
    pub rejection: Option<QueryNotice>,
}

/// Everything one query produced. Failures arrive as a notice and an empty
/// result set, never as an error.
#[derive(Debug, Clone)]
pub struct QueryReport {
    pub predicate: String,
    pub requested_fields: Vec<FieldName>,
    pub results: ResultSet,
    pub notice: Option<QueryNotice>,
}

impl QueryReport {
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}

pub struct QueryEngine<P: ParcelSource> {
    source: P,
    builder: PredicateBuilder,
    shaper: ResultShaper,
}

impl<P: ParcelSource> QueryEngine<P> {
    pub fn new(source: P, catalog: FieldCatalog) -> Self {
        Self {
            source,
            builder: PredicateBuilder::new(catalog.clone()),
            shaper: ResultShaper::new(catalog),
        }
    }

    pub fn builder(&self) -> &PredicateBuilder {
        &self.builder
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    /// Predicate and field list for `spec`, or the reason it must not be sent.
    pub fn plan(&self, spec: &QuerySpec) -> QueryPlan {
        let predicate = self.builder.build_predicate(spec);

        let rejection = match spec.validate() {
            Ok(()) => None,
            Err(_) if spec.output_fields.is_empty() => Some(QueryNotice::NoFieldsSelected),
            Err(e) => Some(QueryNotice::InvalidQuery {
                message: e.user_friendly_message(),
            }),
        };

        let requested_fields = match rejection {
            Some(_) => Vec::new(),
            None => self.builder.normalize_fields(&spec.output_fields),
        };

        QueryPlan {
            predicate,
            requested_fields,
            rejection,
        }
    }

    pub async fn run(&self, spec: &QuerySpec) -> QueryReport {
        let QueryPlan {
            predicate,
            requested_fields,
            rejection,
        } = self.plan(spec);
        tracing::info!("Query WHERE clause: {}", predicate);

        if let Some(notice) = rejection {
            tracing::warn!("{}", notice);
            return QueryReport {
                predicate,
                requested_fields,
                results: self.shaper.shape_results(Vec::new(), &[], &[]),
                notice: Some(notice),
            };
        }

        let (records, notice) = match self
            .source
            .fetch_parcels(&predicate, &requested_fields)
            .await
        {
            Ok(FetchOutcome::Features(records)) if records.is_empty() => {
                (records, Some(QueryNotice::NoResults))
            }
            Ok(FetchOutcome::Features(records)) => (records, None),
            Ok(FetchOutcome::NoFeatures { detail }) => {
                (Vec::new(), Some(QueryNotice::NoFeatures { detail }))
            }
            Ok(FetchOutcome::HttpFailure { status }) => {
                (Vec::new(), Some(QueryNotice::HttpFailure { status }))
            }
            Err(e) => {
                tracing::debug!("Transport error detail: {:?}", e);
                (
                    Vec::new(),
                    Some(QueryNotice::Transport {
                        message: e.user_friendly_message(),
                    }),
                )
            }
        };

        match &notice {
            Some(n) if n.is_warning() => tracing::warn!("{}", n),
            Some(n) => tracing::error!("{}", n),
            None => tracing::info!("Fetched {} parcels", records.len()),
        }

        let results = self
            .shaper
            .shape_results(records, &spec.output_fields, &requested_fields);

        QueryReport {
            predicate,
            requested_fields,
            results,
            notice,
        }
    }

    /// Writes the export view through `storage`. Returns `None` when there is
    /// nothing to export.
    pub async fn export<S: Storage>(
        &self,
        report: &QueryReport,
        storage: &S,
        format: ExportFormat,
        file_name: Option<&str>,
    ) -> Result<Option<(ExportArtifact, String)>> {
        if !report.has_results() {
            return Ok(None);
        }

        let artifact = export_table(&report.results.export_view(), format, file_name)?;
        let path = storage
            .write_file(&artifact.file_name, &artifact.bytes)
            .await?;

        tracing::info!(
            "Saved {} ({}, {} bytes)",
            path,
            artifact.mime_type,
            artifact.bytes.len()
        );
        Ok(Some((artifact, path)))
    }
}
