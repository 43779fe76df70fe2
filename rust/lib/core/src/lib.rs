pub mod config;
pub mod error;
pub mod types;

pub use config::DirectusConfig;
pub use error::ConfigError;
pub use types::{
    Record, RecordId, days_ago_midnight, f64_field, now_millis, now_rfc3339, parse_datetime,
    record_id, str_field,
};
