//! Compare module - difference classification and text reports.

mod compare_model;
mod compare_service;
mod report;

pub use compare_model::CalculationDifference;
pub use compare_service::ResultComparator;
pub use report::ReportGenerator;
