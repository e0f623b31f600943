// Adapters layer: concrete implementations for external systems (feature service, storage).

pub mod http;
pub mod storage;
