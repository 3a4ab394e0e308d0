//! Stock filters: access logging and CORS handling.

pub mod access_log;
pub mod cors;

pub use access_log::AccessLog;
pub use cors::CorsFilter;
