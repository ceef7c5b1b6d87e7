//! RubricRequest — the validated parameters of one generation.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::rubric::catalog::CriterionCatalog;

pub const PRESET_PERFORMANCE_LEVELS: [&str; 5] = [
    "Exemplary",
    "Proficient",
    "Adequate",
    "Developing",
    "Needs Improvement",
];

pub const MAX_LEARNING_OUTCOMES: usize = 10;
pub const MIN_PERFORMANCE_LEVELS: usize = 2;
pub const MAX_PERFORMANCE_LEVELS: usize = 7;

/// Unvalidated rubric parameters as they arrive in a request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RubricParams {
    #[serde(default)]
    pub learning_outcomes: Vec<String>,
    #[serde(default)]
    pub criteria: Vec<String>,
    /// `None` selects the preset levels.
    #[serde(default)]
    pub performance_levels: Option<Vec<String>>,
}

/// Parameters that passed validation. All three lists are non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricRequest {
    learning_outcomes: Vec<String>,
    criteria: Vec<String>,
    performance_levels: Vec<String>,
}

impl RubricRequest {
    /// Validates raw parameters against the catalog.
    ///
    /// Outcomes and levels are trimmed; blank entries are rejected rather than
    /// skipped so the caller sees which field needs attention. Repeated criteria
    /// collapse to their first occurrence.
    pub fn validate(params: RubricParams, catalog: &CriterionCatalog) -> Result<Self, AppError> {
        let learning_outcomes = trimmed_non_blank(params.learning_outcomes, "learning outcome")?;
        if learning_outcomes.is_empty() {
            return Err(AppError::Validation(
                "At least one learning outcome is required".to_string(),
            ));
        }
        if learning_outcomes.len() > MAX_LEARNING_OUTCOMES {
            return Err(AppError::Validation(format!(
                "At most {MAX_LEARNING_OUTCOMES} learning outcomes are allowed, got {}",
                learning_outcomes.len()
            )));
        }

        let mut criteria: Vec<String> = Vec::new();
        for name in params.criteria {
            let name = name.trim().to_string();
            if !catalog.contains(&name) {
                return Err(AppError::Validation(format!("Unknown criterion '{name}'")));
            }
            if !criteria.contains(&name) {
                criteria.push(name);
            }
        }
        if criteria.is_empty() {
            return Err(AppError::Validation(
                "Select at least one criterion".to_string(),
            ));
        }

        let performance_levels = match params.performance_levels {
            None => PRESET_PERFORMANCE_LEVELS.iter().map(|l| l.to_string()).collect(),
            Some(levels) => {
                let levels = trimmed_non_blank(levels, "performance level")?;
                if !(MIN_PERFORMANCE_LEVELS..=MAX_PERFORMANCE_LEVELS).contains(&levels.len()) {
                    return Err(AppError::Validation(format!(
                        "Between {MIN_PERFORMANCE_LEVELS} and {MAX_PERFORMANCE_LEVELS} performance levels are required, got {}",
                        levels.len()
                    )));
                }
                levels
            }
        };

        Ok(Self {
            learning_outcomes,
            criteria,
            performance_levels,
        })
    }

    pub fn learning_outcomes(&self) -> &[String] {
        &self.learning_outcomes
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn performance_levels(&self) -> &[String] {
        &self.performance_levels
    }
}

fn trimmed_non_blank(values: Vec<String>, what: &str) -> Result<Vec<String>, AppError> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let v = v.trim();
            if v.is_empty() {
                Err(AppError::Validation(format!("{what} {} is empty", i + 1)))
            } else {
                Ok(v.to_string())
            }
        })
        .collect()
}
