use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString, IntoStaticStr};

use crate::core::error::{AssistantError, Result};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, IntoStaticStr, Display, PartialEq, Eq, Hash,
)]
pub enum EntityLabel {
    Disease,
    Symptom,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, IntoStaticStr, Display, PartialEq, Eq, Hash,
)]
pub enum RelationType {
    #[strum(serialize = "HAS_SYMPTOM")]
    HasSymptom,
    #[strum(serialize = "SYMPTOM_OF")]
    SymptomOf,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Entity {
    pub name: String,
    pub label: EntityLabel,
}

impl Entity {
    pub fn new(name: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            name: name.into(),
            label,
        }
    }

    pub fn disease(name: impl Into<String>) -> Self {
        Self::new(name, EntityLabel::Disease)
    }

    pub fn symptom(name: impl Into<String>) -> Self {
        Self::new(name, EntityLabel::Symptom)
    }
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub relation: RelationType,
}

impl Relationship {
    pub fn has_symptom(disease: impl Into<String>, symptom: impl Into<String>) -> Self {
        Self {
            source: disease.into(),
            target: symptom.into(),
            relation: RelationType::HasSymptom,
        }
    }

    /// Builds a relationship from a caller-supplied relation string.
    pub fn parse(source: &str, target: &str, relation: &str) -> Result<Self> {
        let relation = RelationType::from_str(relation).map_err(|_| {
            AssistantError::TypeMismatch(format!(
                "unknown relation type '{relation}' (expected HAS_SYMPTOM or SYMPTOM_OF)"
            ))
        })?;
        Ok(Self {
            source: source.to_string(),
            target: target.to_string(),
            relation,
        })
    }

    /// Returns `(disease, symptom)` regardless of which way the relation was written.
    pub fn disease_symptom(&self) -> (&str, &str) {
        match self.relation {
            RelationType::HasSymptom => (&self.source, &self.target),
            RelationType::SymptomOf => (&self.target, &self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_type_wire_names() {
        let name: &'static str = RelationType::HasSymptom.into();
        assert_eq!(name, "HAS_SYMPTOM");
        assert_eq!(RelationType::from_str("SYMPTOM_OF").unwrap(), RelationType::SymptomOf);
    }

    #[test]
    fn test_parse_rejects_unknown_relation() {
        let err = Relationship::parse("Flu", "Fever", "CAUSES").unwrap_err();
        assert!(matches!(err, AssistantError::TypeMismatch(_)));
    }

    #[test]
    fn test_symptom_of_normalises_direction() {
        let rel = Relationship::parse("Fever", "Flu", "SYMPTOM_OF").unwrap();
        assert_eq!(rel.disease_symptom(), ("Flu", "Fever"));
    }
}
