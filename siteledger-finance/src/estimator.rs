//! Quote estimation from completed projects of the same type.
//!
//! The estimate is a weighted average over comparables: closer square footage
//! weighs more, a shared location adds a flat bonus, and projects with unknown
//! area still count at a reduced weight. With no usable history the estimator
//! falls back to a per-type rate table and reports `low` confidence.
//!
//! Everything here is a pure function of the request, the corpus and the
//! configuration; the comparable list in the response is enough to reproduce
//! the number.

use serde::{Deserialize, Serialize};
use siteledger_core::{Project, ProjectType};
use tracing::{debug, warn};

use crate::category_rules::KeywordTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

/// Where the number came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteBasis {
    History,
    FallbackRate,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Inferred from `description` when absent
    #[serde(default)]
    pub project_type: Option<ProjectType>,
    pub description: String,
    #[serde(default)]
    pub square_footage: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub client_code: Option<String>,
}

impl QuoteRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, project_type: ProjectType) -> Self {
        self.project_type = Some(project_type);
        self
    }

    pub fn with_square_footage(mut self, square_footage: f64) -> Self {
        self.square_footage = Some(square_footage);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableWeight {
    pub project_id: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub project_type: ProjectType,
    pub type_inferred: bool,
    pub estimated_total: f64,
    pub price_per_square_foot: Option<f64>,
    pub confidence: ConfidenceTier,
    pub basis: QuoteBasis,
    /// Highest weight first, ties by project id
    pub comparables: Vec<ComparableWeight>,
}

/// Default pricing for a type with no history yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackRate {
    pub project_type: ProjectType,
    pub per_square_foot: f64,
    /// Floor for the total, and the whole quote when area is unknown
    pub minimum_total: f64,
}

pub fn default_fallback_rates() -> Vec<FallbackRate> {
    let rate = |project_type, per_square_foot, minimum_total| FallbackRate {
        project_type,
        per_square_foot,
        minimum_total,
    };
    vec![
        rate(ProjectType::InteriorDemolition, 6.50, 5_000.0),
        rate(ProjectType::FullDemolition, 9.00, 15_000.0),
        rate(ProjectType::Abatement, 12.00, 7_500.0),
        rate(ProjectType::RetailFitOut, 35.00, 20_000.0),
        rate(ProjectType::HazmatCleanup, 18.00, 10_000.0),
        rate(ProjectType::Restoration, 22.00, 8_000.0),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Weight for a comparable whose area is unknown when the request has one
    pub unknown_area_weight: f64,
    /// Added to a comparable's weight when its location token matches
    pub location_bonus: f64,
    pub high_confidence_min_comparables: usize,
    /// Combined weight must exceed this for `high`
    pub high_confidence_min_weight: f64,
    pub medium_confidence_min_comparables: usize,
    pub fallback_rates: Vec<FallbackRate>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            unknown_area_weight: 0.35,
            location_bonus: 0.5,
            high_confidence_min_comparables: 5,
            high_confidence_min_weight: 2.5,
            medium_confidence_min_comparables: 2,
            fallback_rates: default_fallback_rates(),
        }
    }
}

impl EstimatorConfig {
    /// Configured rate for a type, else the built-in one.
    pub fn fallback_rate(&self, project_type: ProjectType) -> FallbackRate {
        self.fallback_rates
            .iter()
            .chain(default_fallback_rates().iter())
            .find(|r| r.project_type == project_type)
            .copied()
            .unwrap_or(FallbackRate {
                project_type,
                per_square_foot: 0.0,
                minimum_total: 0.0,
            })
    }

    /// `count` comparables with combined `weight` → tier.
    pub fn tier_for(&self, count: usize, weight: f64) -> ConfidenceTier {
        let high_min = self.high_confidence_min_comparables.max(5);
        if count >= high_min && weight > self.high_confidence_min_weight {
            ConfidenceTier::High
        } else if count >= self.medium_confidence_min_comparables.max(2) {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Estimator bundling weighting config with the classifier table.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    pub config: EstimatorConfig,
    pub keywords: KeywordTable,
}

struct Comparable<'a> {
    project: &'a Project,
    revenue: f64,
    weight: f64,
}

impl Estimator {
    pub fn new(config: EstimatorConfig, keywords: KeywordTable) -> Self {
        Self { config, keywords }
    }

    pub fn estimate(&self, request: &QuoteRequest, history: &[Project]) -> QuoteResponse {
        let (project_type, type_inferred) = match request.project_type {
            Some(t) => (t, false),
            None => (self.keywords.classify(&request.description), true),
        };

        let area = match request.square_footage {
            Some(a) if a.is_finite() && a > 0.0 => Some(a),
            Some(a) => {
                warn!(square_footage = a, "ignoring unusable square footage on quote request");
                None
            }
            None => None,
        };
        let location = request.location.as_deref().and_then(location_token);

        let mut comparables: Vec<Comparable<'_>> = history
            .iter()
            .filter(|p| p.is_closed() && p.project_type == Some(project_type))
            .filter_map(|p| {
                if let Some(a) = p.square_footage.filter(|a| !a.is_finite() || *a <= 0.0) {
                    debug!(project = %p.id, square_footage = a, "skipping comparable with unusable area");
                    return None;
                }
                let revenue = p.final_revenue.filter(|r| r.is_finite() && *r >= 0.0)?;
                let weight = self.weight_for(p, area, location.as_deref());
                (weight > 0.0).then_some(Comparable {
                    project: p,
                    revenue,
                    weight,
                })
            })
            .collect();

        comparables.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.project.id.cmp(&b.project.id))
        });

        if comparables.is_empty() {
            return self.fallback_quote(project_type, type_inferred, area);
        }

        let price_per_sqft = weighted_mean(
            comparables
                .iter()
                .filter_map(|c| c.project.known_area().map(|a| (c.revenue / a, c.weight))),
        );
        let mean_revenue = weighted_mean(comparables.iter().map(|c| (c.revenue, c.weight)))
            .unwrap_or(0.0);

        let (estimated_total, price_per_square_foot) = match (area, price_per_sqft) {
            (Some(a), Some(rate)) => (a * rate, Some(rate)),
            (Some(a), None) => (mean_revenue, Some(mean_revenue / a)),
            (None, rate) => (mean_revenue, rate),
        };

        let total_weight: f64 = comparables.iter().map(|c| c.weight).sum();
        let confidence = self.config.tier_for(comparables.len(), total_weight);
        debug!(
            %project_type,
            comparables = comparables.len(),
            total_weight,
            ?confidence,
            "estimated from history"
        );

        QuoteResponse {
            project_type,
            type_inferred,
            estimated_total: estimated_total.max(0.0),
            price_per_square_foot: price_per_square_foot.map(|p| p.max(0.0)),
            confidence,
            basis: QuoteBasis::History,
            comparables: comparables
                .iter()
                .map(|c| ComparableWeight {
                    project_id: c.project.id.clone(),
                    weight: c.weight,
                })
                .collect(),
        }
    }

    fn weight_for(&self, project: &Project, area: Option<f64>, location: Option<&str>) -> f64 {
        let base = match (area, project.known_area()) {
            (Some(target), Some(actual)) => 1.0 / (1.0 + (actual - target).abs() / target),
            (Some(_), None) => self.config.unknown_area_weight,
            (None, _) => 1.0,
        };
        let same_place = location.is_some()
            && project.location.as_deref().and_then(location_token).as_deref() == location;
        if same_place {
            base + self.config.location_bonus
        } else {
            base
        }
    }

    fn fallback_quote(
        &self,
        project_type: ProjectType,
        type_inferred: bool,
        area: Option<f64>,
    ) -> QuoteResponse {
        let rate = self.config.fallback_rate(project_type);
        let estimated_total = match area {
            Some(a) => (a * rate.per_square_foot).max(rate.minimum_total),
            None => rate.minimum_total,
        };
        debug!(%project_type, "no comparables, using fallback rate");
        QuoteResponse {
            project_type,
            type_inferred,
            estimated_total: estimated_total.max(0.0),
            price_per_square_foot: Some(rate.per_square_foot.max(0.0)),
            confidence: ConfidenceTier::Low,
            basis: QuoteBasis::FallbackRate,
            comparables: Vec::new(),
        }
    }
}

/// Estimate with default weighting and the built-in keyword table.
pub fn estimate(request: &QuoteRequest, history: &[Project]) -> QuoteResponse {
    Estimator::default().estimate(request, history)
}

/// Normalized city-level token: first comma-separated segment, case-folded,
/// whitespace collapsed. "Chicago, IL" and "chicago" share a token.
pub fn location_token(location: &str) -> Option<String> {
    let head = location.split(',').next().unwrap_or("");
    let token = head
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    (!token.is_empty()).then_some(token)
}

fn weighted_mean(values: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let (sum, weight) = values.fold((0.0, 0.0), |(s, w), (v, wt)| (s + v * wt, w + wt));
    (weight > 0.0).then(|| sum / weight)
}
