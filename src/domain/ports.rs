use crate::domain::model::{FetchOutcome, FieldName};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    /// 預設關閉憑證驗證
    fn verify_tls(&self) -> bool;
    fn export_format(&self) -> ExportFormat;
    fn export_file_name(&self) -> Option<&str>;
}

/// Anything that can answer a parcel query.
#[async_trait]
pub trait ParcelSource: Send + Sync {
    async fn fetch_parcels(&self, predicate: &str, fields: &[FieldName]) -> Result<FetchOutcome>;
}
