pub mod layer;
pub mod markers;
pub mod routes;
pub mod symbology;

pub use layer::*;
