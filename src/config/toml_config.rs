use crate::domain::model::MatchMode;
use crate::domain::ports::ExportFormat;
use crate::utils::error::{ParcelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub verify_tls: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    pub search_field: Option<String>,
    pub search_value: Option<String>,
    pub match_mode: Option<MatchMode>,
    pub min_acres: Option<f64>,
    /// 未設定時使用預設欄位；空陣列代表沒有選任何欄位
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: Option<String>,
    pub format: Option<ExportFormat>,
    pub file_name: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ParcelError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ParcelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PARCEL_ENDPOINT})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ParcelError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
endpoint = "https://example.com/FeatureServer/0/query"
verify_tls = true

[query]
search_field = "CONAME"
search_value = "DANE"
match_mode = "exact"
min_acres = 40.0
fields = ["PARCELID", "GISACRES"]

[export]
output_path = "./exports"
format = "csv"
file_name = "dane.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.source.endpoint.as_deref(),
            Some("https://example.com/FeatureServer/0/query")
        );
        assert_eq!(config.source.verify_tls, Some(true));
        assert_eq!(config.query.match_mode, Some(MatchMode::Exact));
        assert_eq!(config.query.min_acres, Some(40.0));
        assert_eq!(
            config.query.fields,
            Some(vec!["PARCELID".to_string(), "GISACRES".to_string()])
        );
        assert_eq!(config.export.format, Some(ExportFormat::Csv));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.source.endpoint.is_none());
        assert!(config.query.fields.is_none());
        assert!(config.export.format.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_PARCEL_ENDPOINT", "https://test.example.com/query");

        let toml_content = r#"
[source]
endpoint = "${TEST_PARCEL_ENDPOINT}"

[export]
output_path = "${TEST_PARCEL_UNDEFINED_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.source.endpoint.as_deref(),
            Some("https://test.example.com/query")
        );
        assert_eq!(
            config.export.output_path.as_deref(),
            Some("${TEST_PARCEL_UNDEFINED_DIR}")
        );

        std::env::remove_var("TEST_PARCEL_ENDPOINT");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[query\nsearch_field = ").unwrap_err();
        assert!(matches!(err, ParcelError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[query]\nsearch_value = \"Smith\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.query.search_value.as_deref(), Some("Smith"));
    }
}
