use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::GOLDEN_COPY_VERSION;
use crate::results::CalculationResults;

/// Expected results of one view on one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldenCopy {
    pub snapshot_name: String,
    pub view_name: String,
    pub valuation_time: DateTime<Utc>,
    pub calculation_results: CalculationResults,
    /// Version of the crate that wrote the golden copy.
    pub version: String,
}

impl GoldenCopy {
    pub fn create(
        snapshot_name: impl Into<String>,
        view_name: impl Into<String>,
        valuation_time: DateTime<Utc>,
        calculation_results: CalculationResults,
    ) -> Self {
        Self {
            snapshot_name: snapshot_name.into(),
            view_name: view_name.into(),
            valuation_time,
            calculation_results,
            version: GOLDEN_COPY_VERSION.to_string(),
        }
    }

    pub fn identifier(&self) -> String {
        Self::identifier_for(&self.view_name, &self.snapshot_name)
    }

    /// `<view>.<snapshot>`, with characters unsafe in file names replaced.
    pub fn identifier_for(view_name: &str, snapshot_name: &str) -> String {
        format!("{}.{}", sanitize(view_name), sanitize(snapshot_name))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
