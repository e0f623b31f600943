pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::ArcGisClient, storage::LocalStorage};
pub use config::Settings;
pub use crate::core::{engine::QueryEngine, predicate::PredicateBuilder, shaper::ResultShaper};
pub use domain::catalog::FieldCatalog;
pub use domain::model::{FieldName, MatchMode, QuerySpec};
pub use utils::error::{ParcelError, Result};
