// Domain layer: parcel model, field catalog and ports (interfaces).

pub mod catalog;
pub mod model;
pub mod ports;
