pub mod report;

pub use report::{Category, NewReport, Report, ReportLocation, parse_tags};
