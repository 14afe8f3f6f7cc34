//! Per-(fund, policy) settings.

use crate::domain::errors::PolicyError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings a policy stored for one fund.
///
/// Fund managers submit settings as JSON bytes; the owning policy parses
/// them once in `add_fund_settings` and keeps the normalized document
/// here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig(Value);

impl PolicyConfig {
    /// Store typed settings.
    pub fn from_settings<T: Serialize>(policy: &str, settings: &T) -> Result<Self, PolicyError> {
        serde_json::to_value(settings)
            .map(Self)
            .map_err(|e| PolicyError::invalid_settings(policy, e))
    }

    /// Read the stored settings back as `T`.
    pub fn settings<T: DeserializeOwned>(&self, policy: &str) -> Result<T, PolicyError> {
        serde_json::from_value(self.0.clone()).map_err(|e| PolicyError::Evaluation {
            policy: policy.to_string(),
            reason: format!("corrupt settings: {e}"),
        })
    }

    /// Raw JSON document.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Parse settings bytes submitted by a fund manager.
pub fn decode_settings<T: DeserializeOwned>(policy: &str, config: &[u8]) -> Result<T, PolicyError> {
    serde_json::from_slice(config).map_err(|e| PolicyError::invalid_settings(policy, e))
}
