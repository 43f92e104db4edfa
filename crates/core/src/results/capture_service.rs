use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};

use super::engine_model::{ComputationTargetType, ComputedValue, ViewComputationResult};
use super::results_model::{CalculatedValue, CalculationResultKey, CalculationResults};
use super::results_traits::TargetResolverTrait;
use crate::identity::ObjectId;
use crate::masters::PortfolioNode;

/// Turns a view run into results keyed independently of durable identities.
pub struct CalculationResultCapture;

impl CalculationResultCapture {
    pub fn capture(
        result: &ViewComputationResult,
        resolver: &dyn TargetResolverTrait,
    ) -> CalculationResults {
        let node_paths = result
            .portfolio
            .as_ref()
            .map(|portfolio| node_paths(&portfolio.root_node))
            .unwrap_or_default();

        let mut entries = BTreeMap::new();
        let mut skipped = 0usize;
        for computed in &result.values {
            let Some(key) = key_for(computed, &node_paths, resolver) else {
                skipped += 1;
                continue;
            };
            let value = CalculatedValue {
                value: computed.value.clone(),
                specification_properties: computed.specification_properties.clone(),
                target_type: computed.target.target_type,
                target_name: computed.target.name.clone(),
            };
            if let Some(previous) = entries.insert(key, value) {
                warn!(
                    "Duplicate result for {} '{}'; keeping the later value over {}",
                    computed.value_name,
                    previous.target_name,
                    previous.value.summary()
                );
            }
        }

        info!(
            "Captured {} results for view '{}' on snapshot '{}' ({} skipped)",
            entries.len(),
            result.view_name,
            result.snapshot_name,
            skipped
        );
        CalculationResults::new(entries)
    }
}

/// Path of node names from the root for every identified node.
fn node_paths(root: &PortfolioNode) -> HashMap<ObjectId, Vec<String>> {
    let mut paths = HashMap::new();
    root.visit_pre_order(&mut |node, path| {
        if let Some(id) = &node.unique_id {
            paths.insert(id.clone(), path.to_vec());
        }
    });
    paths
}

fn key_for(
    computed: &ComputedValue,
    node_paths: &HashMap<ObjectId, Vec<String>>,
    resolver: &dyn TargetResolverTrait,
) -> Option<CalculationResultKey> {
    let target = &computed.target;
    let calc = computed.calc_config_name.as_str();
    let value_name = computed.value_name.as_str();
    let properties = computed.requirement_properties.clone();

    match target.target_type {
        ComputationTargetType::PortfolioNode => match node_paths.get(&target.id) {
            Some(path) => Some(CalculationResultKey::for_node_path(
                calc,
                value_name,
                properties,
                path.clone(),
            )),
            None => {
                warn!(
                    "Node {} ('{}') is not in the view's portfolio; skipping {}",
                    target.id, target.name, value_name
                );
                None
            }
        },
        ComputationTargetType::Position => {
            let parent_path = target
                .parent_node_id
                .as_ref()
                .and_then(|parent| node_paths.get(parent))
                .cloned();
            let target_id = stable_id(computed, resolver);
            Some(CalculationResultKey::for_position(
                calc,
                value_name,
                properties,
                parent_path,
                target_id,
            ))
        }
        ComputationTargetType::Trade => {
            let target_id = stable_id(computed, resolver);
            Some(CalculationResultKey::for_trade(calc, value_name, properties, target_id))
        }
        other => {
            warn!(
                "Results for {:?} targets are not captured; skipping {} on '{}'",
                other, value_name, target.name
            );
            None
        }
    }
}

fn stable_id(computed: &ComputedValue, resolver: &dyn TargetResolverTrait) -> Option<String> {
    let target = &computed.target;
    let stable = resolver.regression_id(target);
    match &stable {
        Some(id) => debug!("{:?} {} resolved to regression id {}", target.target_type, target.id, id),
        None => warn!(
            "{:?} {} ('{}') has no regression id; its {} result cannot be matched across databases",
            target.target_type, target.id, target.name, computed.value_name
        ),
    }
    stable
}
