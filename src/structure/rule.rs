use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::{Mirror, Rotation};

fn default_weight() -> f64 {
    1.0
}

fn default_frequency() -> f64 {
    1.0
}

fn default_spacing() -> i32 {
    8
}

/// When and how one structure template may be placed.
///
/// `spacing` divides the chunk grid into `spacing × spacing` regions, each of
/// which gets at most one candidate chunk. `frequency` is the chance that
/// the candidate is used at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureRule {
    pub id: String,
    /// Biome structure tags; empty matches every biome
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub mirror: Mirror,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    #[serde(default = "default_spacing")]
    pub spacing: i32,
}

impl StructureRule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: BTreeSet::new(),
            rotation: Rotation::None,
            mirror: Mirror::None,
            weight: default_weight(),
            frequency: default_frequency(),
            spacing: default_spacing(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.frequency) {
            return Err(Error::config(format!("structure `{}` frequency {} outside [0, 1]", self.id, self.frequency)));
        }
        if self.weight < 0.0 || !self.weight.is_finite() {
            return Err(Error::config(format!("structure `{}` weight must be a non-negative number", self.id)));
        }
        if self.spacing < 1 {
            return Err(Error::config(format!("structure `{}` spacing must be at least 1", self.id)));
        }
        Ok(())
    }

    /// Parse and validate a JSON array of rules
    pub fn list_from_json(json: &str) -> Result<Vec<StructureRule>> {
        let rules: Vec<StructureRule> = serde_json::from_str(json)?;
        for rule in &rules {
            rule.validate()?;
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults() {
        let rules = StructureRule::list_from_json(r#"[{"id": "well", "tags": ["village"]}, {"id": "igloo", "rotation": "clockwise90", "spacing": 4}]"#)
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].frequency, 1.0);
        assert_eq!(rules[0].spacing, 8);
        assert!(rules[0].tags.contains("village"));
        assert_eq!(rules[1].rotation, Rotation::Clockwise90);
        assert_eq!(rules[1].spacing, 4);
    }

    #[test]
    fn test_validation() {
        assert!(StructureRule::new("a").validate().is_ok());
        let bad = StructureRule { frequency: 1.5, ..StructureRule::new("a") };
        assert!(bad.validate().is_err());
        let bad = StructureRule { spacing: 0, ..StructureRule::new("a") };
        assert!(bad.validate().is_err());
        assert!(StructureRule::list_from_json(r#"[{"id": "x", "weight": -1.0}]"#).is_err());
    }
}
