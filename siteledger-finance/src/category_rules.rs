//! Deterministic keyword rules mapping a free-text project description to a
//! [`ProjectType`].
//!
//! No model needed: each type owns a list of trigger terms, the type with the
//! most distinct hits wins, and rule order breaks ties. The result is advisory;
//! callers that know the type pass it explicitly.

use serde::{Deserialize, Serialize};
use siteledger_core::ProjectType;

/// Trigger terms for one project type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub project_type: ProjectType,
    pub terms: Vec<String>,
}

/// Ordered rule set. Earlier rules win ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    /// Returned when no term matches at all
    pub default_type: ProjectType,
    pub rules: Vec<KeywordRule>,
}

impl Default for KeywordTable {
    /// Priority: abatement, hazmat-cleanup, interior-demolition,
    /// full-demolition, retail-fit-out, restoration.
    fn default() -> Self {
        Self {
            default_type: ProjectType::InteriorDemolition,
            rules: vec![
                rule(
                    ProjectType::Abatement,
                    &["asbestos", "lead", "mold", "mould", "abatement", "acm", "encapsulation"],
                ),
                rule(
                    ProjectType::HazmatCleanup,
                    &["hazmat", "hazardous", "chemical", "spill", "biohazard", "decontamination"],
                ),
                rule(
                    ProjectType::InteriorDemolition,
                    &["demo", "demolition", "interior", "gut", "strip-out", "soft strip", "selective"],
                ),
                rule(
                    ProjectType::FullDemolition,
                    &["demo", "demolition", "full", "teardown", "tear down", "raze", "structure", "building"],
                ),
                rule(
                    ProjectType::RetailFitOut,
                    &["retail", "fit-out", "fitout", "fit out", "storefront", "tenant improvement", "build-out"],
                ),
                rule(
                    ProjectType::Restoration,
                    &["restoration", "restore", "repair", "water damage", "fire damage"],
                ),
            ],
        }
    }
}

fn rule(project_type: ProjectType, terms: &[&str]) -> KeywordRule {
    KeywordRule {
        project_type,
        terms: terms.iter().map(|t| t.to_string()).collect(),
    }
}

impl KeywordTable {
    /// Distinct trigger-term hits per type, in rule order.
    pub fn scores(&self, description: &str) -> Vec<(ProjectType, usize)> {
        let text = description.to_lowercase();
        self.rules
            .iter()
            .map(|r| {
                let hits = r
                    .terms
                    .iter()
                    .filter(|t| contains_term(&text, &t.to_lowercase()))
                    .count();
                (r.project_type, hits)
            })
            .collect()
    }

    pub fn classify(&self, description: &str) -> ProjectType {
        let mut best: Option<(ProjectType, usize)> = None;
        for (project_type, hits) in self.scores(description) {
            match best {
                Some((_, best_hits)) if hits <= best_hits => {}
                _ if hits == 0 => {}
                _ => best = Some((project_type, hits)),
            }
        }
        best.map(|(t, _)| t).unwrap_or(self.default_type)
    }
}

/// Classify with the built-in keyword table.
pub fn classify(description: &str) -> ProjectType {
    KeywordTable::default().classify(description)
}

/// Whole-term containment: the term must not touch letters or digits on
/// either side, so "demo" does not fire inside "demolition".
fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    text.match_indices(term).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abatement_keywords() {
        assert_eq!(classify("Asbestos removal, 2nd floor"), ProjectType::Abatement);
        assert_eq!(classify("lead paint and MOLD"), ProjectType::Abatement);
    }

    #[test]
    fn test_retail_fit_out_variants() {
        assert_eq!(classify("Retail fit-out for tenant"), ProjectType::RetailFitOut);
        assert_eq!(classify("storefront fitout"), ProjectType::RetailFitOut);
    }

    #[test]
    fn test_full_vs_interior_demolition() {
        assert_eq!(classify("Full demolition of warehouse"), ProjectType::FullDemolition);
        assert_eq!(classify("Interior demolition, gut to studs"), ProjectType::InteriorDemolition);
        // Equal hits: interior ranks ahead of full
        assert_eq!(classify("demolition"), ProjectType::InteriorDemolition);
    }

    #[test]
    fn test_tie_breaks_by_priority() {
        // one abatement hit, one interior-demolition hit
        assert_eq!(classify("demo with asbestos"), ProjectType::Abatement);
    }

    #[test]
    fn test_terms_need_boundaries() {
        assert!(contains_term("demo day", "demo"));
        assert!(!contains_term("demolition", "demo"));
        assert!(!contains_term("leader", "lead"));
        assert!(contains_term("retail fit-out", "fit-out"));
    }

    #[test]
    fn test_hazmat_and_restoration() {
        assert_eq!(classify("HAZMAT spill response"), ProjectType::HazmatCleanup);
        assert_eq!(classify("water damage restoration"), ProjectType::Restoration);
    }

    #[test]
    fn test_no_match_returns_default() {
        assert_eq!(classify("misc site work"), ProjectType::InteriorDemolition);
        assert_eq!(classify(""), ProjectType::InteriorDemolition);
    }

    #[test]
    fn test_custom_table() {
        let table = KeywordTable {
            default_type: ProjectType::Abatement,
            rules: vec![rule(ProjectType::Restoration, &["Roof"])],
        };
        assert_eq!(table.classify("roof leak"), ProjectType::Restoration);
        assert_eq!(table.classify("asbestos"), ProjectType::Abatement);
    }

    #[test]
    fn test_scores_are_in_rule_order() {
        let scores = KeywordTable::default().scores("mold and lead abatement");
        assert_eq!(scores[0], (ProjectType::Abatement, 3));
        assert_eq!(scores.len(), 6);
    }
}
