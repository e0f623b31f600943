pub mod engine;
pub mod export;
pub mod predicate;
pub mod shaper;

pub use crate::domain::model::{FieldName, ParcelRecord, QuerySpec, TableView};
pub use crate::domain::ports::{ConfigProvider, ParcelSource, Storage};
pub use crate::utils::error::Result;
