//! Bundler configuration.

use crate::error::{Error, Result};
use crate::model::EdgeNode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_ANGLE_STRENGTH: f64 = 1.2;
pub const DEFAULT_K: usize = 10;
pub const DEFAULT_TAU: f64 = 0.1;

pub type NodeComparator = Arc<dyn Fn(&EdgeNode, &EdgeNode) -> Ordering + Send + Sync>;

/// Ordering applied to a coalesced node's `node_array`, which drives stacking at render time.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeSort {
    ById,
    ByWeight,
    ByWeightDesc,
    #[serde(skip)]
    Custom(NodeComparator),
}

impl NodeSort {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&EdgeNode, &EdgeNode) -> Ordering + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn compare(&self, a: &EdgeNode, b: &EdgeNode) -> Ordering {
        match self {
            Self::ById => a.id().cmp(b.id()),
            Self::ByWeight => a.weight().total_cmp(&b.weight()),
            Self::ByWeightDesc => b.weight().total_cmp(&a.weight()),
            Self::Custom(f) => f(a, b),
        }
    }
}

impl fmt::Debug for NodeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById => f.write_str("ById"),
            Self::ByWeight => f.write_str("ByWeight"),
            Self::ByWeightDesc => f.write_str("ByWeightDesc"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Angle-strength presets. Lower values penalize bends more and give tighter, straighter trunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleProfile {
    Ink,
    Balanced,
    Smooth,
}

impl AngleProfile {
    pub fn angle_strength(self) -> f64 {
        match self {
            Self::Ink => 1.2,
            Self::Balanced => 5.0,
            Self::Smooth => 25.0,
        }
    }
}

impl FromStr for AngleProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ink" => Ok(Self::Ink),
            "balanced" => Ok(Self::Balanced),
            "smooth" => Ok(Self::Smooth),
            other => Err(Error::InvalidOptions {
                reason: format!("unknown angle profile `{other}`"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundlerOptions {
    /// Divides the bend penalty: `ink * (1 + sin(angle) / angle_strength)`.
    pub angle_strength: f64,
    /// Proximity neighbors per edge.
    pub k: usize,
    /// Relative tolerance of the compromise-point search.
    pub tau: f64,
    /// Upper bound on MINGLE rounds; `None` runs until no round saves ink.
    pub max_rounds: Option<usize>,
    pub sort: Option<NodeSort>,
}

impl Default for BundlerOptions {
    fn default() -> Self {
        Self {
            angle_strength: DEFAULT_ANGLE_STRENGTH,
            k: DEFAULT_K,
            tau: DEFAULT_TAU,
            max_rounds: None,
            sort: None,
        }
    }
}

impl BundlerOptions {
    pub fn with_profile(mut self, profile: AngleProfile) -> Self {
        self.angle_strength = profile.angle_strength();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(Error::InvalidOptions { reason });
        if !(self.angle_strength.is_finite() && self.angle_strength > 0.0) {
            return invalid(format!(
                "angleStrength must be a positive number, got {}",
                self.angle_strength
            ));
        }
        if self.k == 0 {
            return invalid("k must be at least 1".to_string());
        }
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return invalid(format!("tau must be a positive number, got {}", self.tau));
        }
        if self.max_rounds == Some(0) {
            return invalid("maxRounds must be at least 1".to_string());
        }
        Ok(())
    }
}
