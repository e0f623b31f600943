use crate::config::toml_config::TomlConfig;
use crate::domain::catalog::{FieldCatalog, DEFAULT_ENDPOINT};
use crate::domain::model::{FieldName, QuerySpec};
use crate::domain::ports::{ConfigProvider, ExportFormat};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_name, validate_path, validate_url, Validate};
use std::str::FromStr;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Fully resolved run settings: defaults, then the TOML file, then the
/// command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub output_path: String,
    pub verify_tls: bool,
    pub format: ExportFormat,
    pub file_name: Option<String>,
    pub query: QuerySpec,
}

impl Settings {
    pub fn defaults(catalog: &FieldCatalog) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            verify_tls: false,
            format: ExportFormat::default(),
            file_name: None,
            query: QuerySpec::new(
                catalog.default_search_field(),
                catalog.default_selection.to_vec(),
            ),
        }
    }

    pub fn from_toml(file: &TomlConfig, catalog: &FieldCatalog) -> Result<Self> {
        let mut settings = Self::defaults(catalog);

        if let Some(endpoint) = &file.source.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(verify) = file.source.verify_tls {
            settings.verify_tls = verify;
        }

        if let Some(field) = &file.query.search_field {
            settings.query.search_field = FieldName::from_str(field)?;
        }
        if let Some(value) = &file.query.search_value {
            settings.query.search_value = value.clone();
        }
        if let Some(mode) = file.query.match_mode {
            settings.query.match_mode = mode;
        }
        if let Some(min_acres) = file.query.min_acres {
            settings.query.min_acres = min_acres;
        }
        if let Some(fields) = &file.query.fields {
            settings.query.output_fields = fields
                .iter()
                .map(|f| FieldName::from_str(f))
                .collect::<Result<Vec<_>>>()?;
        }

        if let Some(path) = &file.export.output_path {
            settings.output_path = path.clone();
        }
        if let Some(format) = file.export.format {
            settings.format = format;
        }
        if let Some(name) = &file.export.file_name {
            settings.file_name = Some(name.clone());
        }

        Ok(settings)
    }
}

impl ConfigProvider for Settings {
    fn api_endpoint(&self) -> &str {
        &self.endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    fn export_format(&self) -> ExportFormat {
        self.format
    }

    fn export_file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

/// Empty field selections are not rejected here; the engine reports them
/// as a notice without sending a request.
impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_path("output_path", &self.output_path)?;
        if let Some(name) = &self.file_name {
            validate_file_name("file_name", name)?;
        }
        crate::utils::validation::validate_non_negative("min_acres", self.query.min_acres)
    }
}
