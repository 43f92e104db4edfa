use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::engine_model::{ComputationTarget, ViewComputationResult};
use crate::errors::Result;
use crate::masters::Masters;

/// Runs a view against a set of masters. Implemented by the calculation
/// engine integration; the run is awaited to completion.
#[async_trait]
pub trait ViewRunnerTrait: Send + Sync {
    async fn run_view(
        &self,
        masters: &Masters,
        view_name: &str,
        snapshot_name: &str,
        valuation_time: DateTime<Utc>,
    ) -> Result<ViewComputationResult>;
}

/// Resolves a position or trade target to its stable regression id.
pub trait TargetResolverTrait: Send + Sync {
    fn regression_id(&self, target: &ComputationTarget) -> Option<String>;
}
