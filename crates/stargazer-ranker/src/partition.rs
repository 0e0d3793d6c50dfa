//! Allele-direction partitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use stargazer_common::entities::NEUTRAL_EFFECT_SIZE;

use crate::features::FeatureRow;

/// How the effect feature is derived from the odds ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTransform {
    /// OR as is
    Identity,
    /// 1 - OR, so stronger protection scores higher
    Complement,
}

impl EffectTransform {
    pub fn apply(&self, effect_size: f64) -> f64 {
        match self {
            EffectTransform::Identity   => effect_size,
            EffectTransform::Complement => 1.0 - effect_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Overall,
    Risk,
    Protective,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Overall, Partition::Risk, Partition::Protective];

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Overall    => "overall",
            Partition::Risk       => "risk",
            Partition::Protective => "protective",
        }
    }

    pub fn transform(&self) -> EffectTransform {
        match self {
            Partition::Protective => EffectTransform::Complement,
            _ => EffectTransform::Identity,
        }
    }

    pub fn admits(&self, effect_size: f64) -> bool {
        match self {
            Partition::Overall    => true,
            Partition::Risk       => effect_size >= NEUTRAL_EFFECT_SIZE,
            Partition::Protective => effect_size < NEUTRAL_EFFECT_SIZE,
        }
    }

    /// Rows of this partition, cloned, in input order.
    pub fn select(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().filter(|r| self.admits(r.effect_size)).cloned().collect()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::row;

    #[test]
    fn test_protective_transform() {
        let t = Partition::Protective.transform();
        assert!((t.apply(0.4) - 0.6).abs() < 1e-12);
        assert_eq!(Partition::Risk.transform().apply(0.4), 0.4);
        assert_eq!(Partition::Overall.transform(), EffectTransform::Identity);
    }

    #[test]
    fn test_every_row_in_exactly_one_direction() {
        let rows = vec![row("A", 2.0), row("B", 0.5), row("C", 1.0), row("A", 0.99)];
        let risk = Partition::Risk.select(&rows);
        let protective = Partition::Protective.select(&rows);
        assert_eq!(risk.len() + protective.len(), rows.len());
        assert_eq!(Partition::Overall.select(&rows).len(), rows.len());
        // neutral OR counts as risk
        assert!(risk.iter().any(|r| r.gene == "C"));
        assert!(protective.iter().all(|r| r.effect_size < 1.0));
    }
}
