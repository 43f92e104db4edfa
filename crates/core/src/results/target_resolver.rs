use log::debug;
use std::collections::HashMap;

use super::engine_model::{ComputationTarget, ComputationTargetType};
use super::results_traits::TargetResolverTrait;
use crate::errors::Result;
use crate::identity::ObjectId;
use crate::masters::{MasterTrait, Position};

/// Regression ids of every position and trade in a positions master.
///
/// The index is built in full before the resolver is handed out and is
/// read-only afterwards, so lookups need no locking.
#[derive(Debug, Clone, Default)]
pub struct MasterTargetResolver {
    positions: HashMap<ObjectId, String>,
    trades: HashMap<ObjectId, String>,
}

impl MasterTargetResolver {
    /// Indexes only records tagged with a regression id.
    pub fn build(master: &dyn MasterTrait<Position>) -> Result<Self> {
        Self::build_inner(master, false)
    }

    /// Indexes untagged records under their own identity.
    ///
    /// Restoring a dump of this master tags every record with exactly that
    /// identity, so results captured here line up with results captured
    /// after the restore.
    pub fn build_for_source(master: &dyn MasterTrait<Position>) -> Result<Self> {
        Self::build_inner(master, true)
    }

    fn build_inner(master: &dyn MasterTrait<Position>, identity_fallback: bool) -> Result<Self> {
        let stable = |id: &Option<ObjectId>, tag: Option<&str>| match (id, tag) {
            (Some(id), Some(tag)) => Some((id.clone(), tag.to_string())),
            (Some(id), None) if identity_fallback => Some((id.clone(), id.to_string())),
            _ => None,
        };

        let mut position_entries = Vec::new();
        let mut trade_entries = Vec::new();
        for position in master.search_all()? {
            position_entries.extend(stable(&position.unique_id, position.regression_id()));
            for trade in &position.trades {
                trade_entries.extend(stable(&trade.unique_id, trade.regression_id()));
            }
        }

        let resolver = Self {
            positions: position_entries.into_iter().collect(),
            trades: trade_entries.into_iter().collect(),
        };
        debug!(
            "Indexed {} position and {} trade regression ids",
            resolver.positions.len(),
            resolver.trades.len()
        );
        Ok(resolver)
    }
}

impl TargetResolverTrait for MasterTargetResolver {
    fn regression_id(&self, target: &ComputationTarget) -> Option<String> {
        match target.target_type {
            ComputationTargetType::Position => self.positions.get(&target.id).cloned(),
            ComputationTargetType::Trade => self.trades.get(&target.id).cloned(),
            _ => None,
        }
    }
}
