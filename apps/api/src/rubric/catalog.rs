//! Criterion catalog — the fixed set of assessment criteria a rubric may use.
//!
//! Loaded once at startup (built-in table or a JSON file) and shared read-only.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// A selectable assessment dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub description: String,
    pub category: String,
}

/// Criteria of one category, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionGroup {
    pub category: String,
    pub criteria: Vec<Criterion>,
}

/// Immutable name → description table. Order is preserved for display.
#[derive(Debug, Clone)]
pub struct CriterionCatalog {
    criteria: Vec<Criterion>,
}

impl CriterionCatalog {
    /// Builds a catalog, rejecting blank or duplicate names.
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        if criteria.is_empty() {
            bail!("criterion catalog is empty");
        }
        let mut seen = HashSet::new();
        for criterion in &criteria {
            if criterion.name.trim().is_empty() {
                bail!("criterion catalog contains a blank name");
            }
            if !seen.insert(criterion.name.as_str()) {
                bail!("duplicate criterion '{}' in catalog", criterion.name);
            }
        }
        Ok(Self { criteria })
    }

    /// Reads a JSON array of `{name, description, category}` objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read criteria catalog {}", path.display()))?;
        let criteria: Vec<Criterion> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid criteria catalog JSON in {}", path.display()))?;
        Self::new(criteria)
    }

    pub fn get(&self, name: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Groups criteria by category, categories in first-appearance order.
    pub fn grouped(&self) -> Vec<CriterionGroup> {
        let mut groups: Vec<CriterionGroup> = Vec::new();
        for criterion in &self.criteria {
            match groups.iter_mut().find(|g| g.category == criterion.category) {
                Some(group) => group.criteria.push(criterion.clone()),
                None => groups.push(CriterionGroup {
                    category: criterion.category.clone(),
                    criteria: vec![criterion.clone()],
                }),
            }
        }
        groups
    }
}

impl Default for CriterionCatalog {
    fn default() -> Self {
        let criteria = DEFAULT_CRITERIA
            .iter()
            .map(|(category, name, description)| Criterion {
                name: name.to_string(),
                description: description.to_string(),
                category: category.to_string(),
            })
            .collect();
        Self { criteria }
    }
}

const KNOWLEDGE: &str = "Knowledge";
const SKILLS: &str = "Skills";
const ETHICS: &str = "Ethics";
const CHARACTER: &str = "Character";
const TEAMWORK: &str = "Teamwork and Collaboration";
const REFLECTION: &str = "Reflection and Growth";

/// (category, name, description)
const DEFAULT_CRITERIA: &[(&str, &str, &str)] = &[
    (KNOWLEDGE, "Subject Matter Expertise (K)", "Assesses depth and breadth of knowledge in the specific subject area."),
    (KNOWLEDGE, "Environmental Literacy (K)", "Assesses understanding of environmental issues, their causes, impacts, and approaches to sustainability."),
    (KNOWLEDGE, "Theoretical Understanding (K)", "Evaluates comprehension of fundamental theories and concepts."),
    (KNOWLEDGE, "Interdisciplinary Knowledge (K)", "Measures ability to connect ideas across different disciplines."),
    (KNOWLEDGE, "Social Change Knowledge (K)", "Assesses understanding of social structures and historical transformations."),
    (KNOWLEDGE, "Cultural Knowledge (K)", "Assesses knowledge of cultural influences and their implications on tourism."),
    (SKILLS, "Critical Thinking (S)", "Assesses ability to analyze, evaluate, and synthesize information."),
    (SKILLS, "Systematic Decision-Making (S)", "Assesses ability to use structured processes to make well-informed and impactful decisions."),
    (SKILLS, "Problem-Solving (S)", "Evaluates capacity to identify, frame, and resolve complex problems."),
    (SKILLS, "Design Thinking and Innovation (S)", "Assesses ability to apply design thinking methodologies to develop innovative and practical solutions."),
    (SKILLS, "Communication Skills (S)", "Measures effectiveness in verbal, written, and visual communication."),
    (SKILLS, "Technical Proficiency (S)", "Assesses mastery of relevant tools, technologies, or methodologies."),
    (SKILLS, "Creativity (S)", "Assesses ability to generate original ideas and innovative solutions to challenges."),
    (SKILLS, "Digital Literacy (S)", "Assesses ability to navigate, evaluate, and create information using digital technologies."),
    (SKILLS, "AI Literacy (S)", "Measures proficiency in understanding and applying artificial intelligence tools, technologies, and ethical considerations."),
    (SKILLS, "Analytical Skills (S)", "Assesses ability to evaluate and interpret data effectively."),
    (SKILLS, "Collaboration Skills (S)", "Measures ability to work effectively in teams and contribute to collective goals."),
    (ETHICS, "Ethical Reasoning (E)", "Evaluates ability to recognize and analyze ethical issues."),
    (ETHICS, "Professional Ethics (E)", "Assesses understanding and application of field-specific ethical standards."),
    (ETHICS, "Social Responsibility (E)", "Measures awareness and commitment to broader societal impacts."),
    (ETHICS, "Sustainability Awareness (E)", "Evaluates understanding of sustainable practices and their impact on environmental, social, and economic systems."),
    (ETHICS, "Cultural Sensitivity (E)", "Assesses understanding and respect for diverse cultural perspectives and practices."),
    (CHARACTER, "Perseverance (C)", "Assesses ability to persist through challenges and setbacks."),
    (CHARACTER, "Integrity (C)", "Evaluates adherence to moral and ethical principles in academic and professional contexts."),
    (CHARACTER, "Empathy and Perspective-Taking (C)", "Measures ability to understand diverse viewpoints, including environmental, societal, and future generational concerns."),
    (CHARACTER, "Respect (C)", "Measures ability to show consideration and regard for others' opinions, rights, and feelings."),
    (CHARACTER, "Responsibility (C)", "Assesses commitment to fulfilling duties and being accountable for actions and decisions."),
    (CHARACTER, "Open-Mindedness (C)", "Evaluates ability to consider and embrace new ideas and different perspectives."),
    (TEAMWORK, "Contribution to Team Goals", "Measures students' ability to apply knowledge to help achieve team objectives."),
    (TEAMWORK, "Collaborative Problem Solving", "Assesses ability to work with others to solve complex problems."),
    (TEAMWORK, "Leadership and Initiative", "Evaluates capacity to guide and motivate team members."),
    (REFLECTION, "Self-Reflection", "Assesses ability to critically evaluate one's own performance and learning."),
    (REFLECTION, "Continuous Learning", "Measures commitment to ongoing personal and professional development."),
    (REFLECTION, "Adaptability", "Evaluates ability to adjust to new situations and incorporate feedback."),
];

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn criterion(name: &str, category: &str) -> Criterion {
        Criterion {
            name: name.to_string(),
            description: format!("Describes {name}."),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_default_catalog_has_all_criteria() {
        let catalog = CriterionCatalog::default();
        assert_eq!(catalog.len(), 34);
        assert!(catalog.contains("Environmental Literacy (K)"));
        assert!(catalog.contains("Adaptability"));
    }

    #[test]
    fn test_default_catalog_names_are_unique() {
        let catalog = CriterionCatalog::default();
        assert!(CriterionCatalog::new(catalog.criteria.clone()).is_ok());
    }

    #[test]
    fn test_get_returns_description() {
        let catalog = CriterionCatalog::default();
        let c = catalog.get("Critical Thinking (S)").unwrap();
        assert_eq!(
            c.description,
            "Assesses ability to analyze, evaluate, and synthesize information."
        );
        assert_eq!(c.category, "Skills");
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = CriterionCatalog::default();
        assert!(!catalog.contains("critical thinking (s)"));
        assert!(!catalog.contains("Critical Thinking"));
    }

    #[test]
    fn test_grouped_preserves_category_order() {
        let catalog = CriterionCatalog::default();
        let groups = catalog.grouped();
        let categories: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![
                "Knowledge",
                "Skills",
                "Ethics",
                "Character",
                "Teamwork and Collaboration",
                "Reflection and Growth"
            ]
        );
    }

    #[test]
    fn test_grouped_counts() {
        let catalog = CriterionCatalog::default();
        let groups = catalog.grouped();
        assert_eq!(groups[0].criteria.len(), 6);
        assert_eq!(groups[1].criteria.len(), 11);
        let total: usize = groups.iter().map(|g| g.criteria.len()).sum();
        assert_eq!(total, catalog.len());
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let result = CriterionCatalog::new(vec![criterion("A", "X"), criterion("A", "Y")]);
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_new_rejects_empty_and_blank() {
        assert!(CriterionCatalog::new(vec![]).is_err());
        assert!(CriterionCatalog::new(vec![criterion("  ", "X")]).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Teamwork", "description": "Works with others.", "category": "Social"}}]"#
        )
        .unwrap();

        let catalog = CriterionCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Teamwork").unwrap().category, "Social");
    }

    #[test]
    fn test_from_json_file_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = CriterionCatalog::from_json_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid criteria catalog JSON"));
    }

    #[test]
    fn test_from_json_file_missing() {
        assert!(CriterionCatalog::from_json_file("/nonexistent/criteria.json").is_err());
    }
}
