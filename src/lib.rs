pub mod api;
pub mod catalog;
pub mod config;
pub mod contacts;
pub mod error;
pub mod report;
pub mod session;

pub use api::ApiClient;
pub use config::{Config, load_config};
pub use error::{BizError, Result};
pub use report::{AggregationResult, Period, ReportAggregator, ReportView};
