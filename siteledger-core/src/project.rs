//! Project entities as handed over by project intake.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::code::ProjectCode;
use crate::error::ParseError;

/// Categorical project type used for classification and quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    InteriorDemolition,
    FullDemolition,
    Abatement,
    RetailFitOut,
    HazmatCleanup,
    Restoration,
}

impl ProjectType {
    pub const ALL: [ProjectType; 6] = [
        ProjectType::InteriorDemolition,
        ProjectType::FullDemolition,
        ProjectType::Abatement,
        ProjectType::RetailFitOut,
        ProjectType::HazmatCleanup,
        ProjectType::Restoration,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::InteriorDemolition => "interior-demolition",
            ProjectType::FullDemolition => "full-demolition",
            ProjectType::Abatement => "abatement",
            ProjectType::RetailFitOut => "retail-fit-out",
            ProjectType::HazmatCleanup => "hazmat-cleanup",
            ProjectType::Restoration => "restoration",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', ' '], "-");
        ProjectType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| ParseError::UnknownProjectType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub code: ProjectCode,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub client_code: Option<String>,
    #[serde(default)]
    pub project_type: Option<ProjectType>,
    /// Positive when known.
    #[serde(default)]
    pub square_footage: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub final_cost: Option<f64>,
    #[serde(default)]
    pub final_revenue: Option<f64>,
}

impl Project {
    pub fn new(id: impl Into<String>, code: ProjectCode) -> Self {
        Self {
            id: id.into(),
            code,
            name: None,
            client_code: None,
            project_type: None,
            square_footage: None,
            location: None,
            status: ProjectStatus::Active,
            final_cost: None,
            final_revenue: None,
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

    /// Mark the project closed with its settled figures.
    pub fn closed(mut self, final_revenue: Option<f64>, final_cost: Option<f64>) -> Self {
        self.status = ProjectStatus::Closed;
        self.final_revenue = final_revenue;
        self.final_cost = final_cost;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.status == ProjectStatus::Closed
    }

    /// Square footage only when it is a usable positive number.
    pub fn known_area(&self) -> Option<f64> {
        self.square_footage.filter(|a| a.is_finite() && *a > 0.0)
    }
}
