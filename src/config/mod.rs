pub mod settings;
pub mod toml_config;

pub use settings::Settings;

#[cfg(feature = "cli")]
use crate::domain::catalog::FieldCatalog;
#[cfg(feature = "cli")]
use crate::domain::model::{parse_field_list, FieldName, MatchMode};
#[cfg(feature = "cli")]
use crate::domain::ports::ExportFormat;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::str::FromStr;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "parcel-query")]
#[command(about = "Search Wisconsin statewide parcels and export the results")]
pub struct CliConfig {
    /// TOML configuration file; command line values take precedence
    #[arg(short, long)]
    pub config: Option<String>,

    /// Feature layer query endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Directory the export is written to
    #[arg(long)]
    pub output_path: Option<String>,

    /// Field to search, e.g. OWNERNME1
    #[arg(long)]
    pub search_field: Option<String>,

    /// Value to look for; empty means no search clause
    #[arg(long)]
    pub search_value: Option<String>,

    #[arg(long, value_enum)]
    pub match_mode: Option<MatchMode>,

    /// Only parcels with GISACRES above this value (0 = no filter)
    #[arg(long)]
    pub min_acres: Option<f64>,

    /// Comma separated output fields
    #[arg(long)]
    pub fields: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Override the export file name
    #[arg(long)]
    pub file_name: Option<String>,

    /// Check the service's TLS certificate (off by default)
    #[arg(long)]
    pub verify_tls: bool,

    /// Print the request without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the field catalog and exit
    #[arg(long)]
    pub list_fields: bool,

    /// Skip writing the export file
    #[arg(long)]
    pub no_export: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Resolve the final settings, reading `--config` when given.
    pub fn load_settings(&self, catalog: &FieldCatalog) -> Result<Settings> {
        let settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                let file = toml_config::TomlConfig::from_file(path)?;
                Settings::from_toml(&file, catalog)?
            }
            None => Settings::defaults(catalog),
        };
        self.apply(settings, catalog)
    }

    /// 命令列參數覆蓋設定檔
    pub fn apply(&self, mut settings: Settings, catalog: &FieldCatalog) -> Result<Settings> {
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(path) = &self.output_path {
            settings.output_path = path.clone();
        }
        if let Some(field) = &self.search_field {
            settings.query.search_field = FieldName::from_str(field)?;
        }
        if let Some(value) = &self.search_value {
            settings.query.search_value = value.clone();
        }
        if let Some(mode) = self.match_mode {
            settings.query.match_mode = mode;
        }
        if let Some(min_acres) = self.min_acres {
            settings.query.min_acres = min_acres;
        }
        if let Some(fields) = &self.fields {
            settings.query.output_fields = parse_field_list(fields)?;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(name) = &self.file_name {
            settings.file_name = Some(name.clone());
        }
        if self.verify_tls {
            settings.verify_tls = true;
        }

        if !catalog.is_search_field(settings.query.search_field) {
            tracing::debug!(
                "{} is not one of the suggested search fields",
                settings.query.search_field
            );
        }

        Ok(settings)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_overrides() {
        let cli = CliConfig::parse_from([
            "parcel-query",
            "--search-value",
            "Smith",
            "--match-mode",
            "exact",
            "--min-acres",
            "5",
            "--fields",
            "PARCELID,OWNERNME1",
            "--format",
            "csv",
            "--verify-tls",
        ]);
        let catalog = FieldCatalog::default();
        let settings = cli.apply(Settings::defaults(&catalog), &catalog).unwrap();

        assert_eq!(settings.query.search_value, "Smith");
        assert_eq!(settings.query.match_mode, MatchMode::Exact);
        assert_eq!(settings.query.min_acres, 5.0);
        assert_eq!(
            settings.query.output_fields,
            vec![FieldName::ParcelId, FieldName::OwnerName1]
        );
        assert_eq!(settings.format, ExportFormat::Csv);
        assert!(settings.verify_tls);
    }

    #[test]
    fn test_empty_field_list_selects_nothing() {
        let cli = CliConfig::parse_from(["parcel-query", "--fields", ""]);
        let catalog = FieldCatalog::default();
        let settings = cli.apply(Settings::defaults(&catalog), &catalog).unwrap();
        assert!(settings.query.output_fields.is_empty());
    }

    #[test]
    fn test_unknown_search_field_is_an_error() {
        let cli = CliConfig::parse_from(["parcel-query", "--search-field", "OWNER"]);
        let catalog = FieldCatalog::default();
        assert!(cli.apply(Settings::defaults(&catalog), &catalog).is_err());
    }
}
