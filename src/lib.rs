pub mod bundle;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod solver;
pub mod tensor;

pub use config::Config;
pub use error::{ReportError, ReportResult};
pub use model::{ReportModel, ValidatedReport};
pub use report::{parse_report, parse_str, RawReport, ReportLayout};
pub use tensor::{build, DerivedTensors};
