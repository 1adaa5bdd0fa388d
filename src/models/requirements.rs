use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum DesignType {
    LandingPage,
    Portfolio,
    Dashboard,
    ECommerce,
    Blog,
    Other,
}

impl DesignType {
    pub const ALL: [&'static str; 6] = [
        "landing-page",
        "portfolio",
        "dashboard",
        "e-commerce",
        "blog",
        "other",
    ];
}

/// Gathered website requirements. `None` always means "not yet known",
/// never "explicitly empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequirements {
    #[serde(default)]
    pub design_type: Option<DesignType>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub preferred_style_and_inspiration: Option<String>,
    #[serde(default)]
    pub color_preferences: Option<Vec<String>>,
    #[serde(default)]
    pub functionality_needs: Option<Vec<String>>,
    #[serde(default)]
    pub content_types: Option<Vec<String>>,
}

impl DesignRequirements {
    /// True when no field has been filled in at all.
    pub fn is_empty(&self) -> bool {
        *self == DesignRequirements::default()
    }
}
