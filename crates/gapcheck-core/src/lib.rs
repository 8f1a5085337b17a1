pub mod config;
pub mod error;
pub mod fields;
pub mod form;
pub mod format;
pub mod import;
pub mod io;
pub mod metrics;
pub mod numeric;
pub mod paths;
pub mod persist;
pub mod record;
pub mod report;
pub mod store;

pub use error::{GapError, Result};
pub use record::AnalysisRecord;
