//! Results module - capture of view runs into comparable result sets.

mod capture_service;
mod engine_model;
mod results_model;
mod results_traits;
mod target_resolver;

pub use capture_service::CalculationResultCapture;
pub use engine_model::{
    ComputationTarget, ComputationTargetType, ComputedValue, ViewComputationResult,
};
pub use results_model::{
    CalculatedValue, CalculationResultKey, CalculationResults, ResultEntry, ValueProperties,
};
pub use results_traits::{TargetResolverTrait, ViewRunnerTrait};
pub use target_resolver::MasterTargetResolver;
