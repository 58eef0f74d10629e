//! Frozen copies of a scenario, optionally with cached results.

use chrono::{DateTime, Utc};
use devsim_core::Scenario;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::ComplianceResult;
use crate::cost::CostResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub scenario: Scenario,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostResult>,
}

impl Snapshot {
    /// Capture the scenario as it is now. Later edits to the live scenario
    /// produce new values and never reach this copy.
    pub fn take(name: impl Into<String>, scenario: &Scenario) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            scenario: scenario.clone(),
            compliance: None,
            cost: None,
        }
    }

    pub fn with_compliance(mut self, compliance: ComplianceResult) -> Self {
        self.compliance = Some(compliance);
        self
    }

    pub fn with_cost(mut self, cost: CostResult) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Copy under a new id and timestamp, named "<name> Copy". Cached
    /// results are dropped.
    pub fn duplicated(&self) -> Self {
        Self::take(format!("{} Copy", self.name), &self.scenario)
    }

    /// Fingerprint of the embedded scenario.
    pub fn fingerprint(&self) -> String {
        self.scenario.fingerprint()
    }

    /// First 8 hex characters of the fingerprint.
    pub fn short_fingerprint(&self) -> String {
        self.fingerprint().chars().take(8).collect()
    }
}
