//! Core data types for the Kairos renewal intelligence core
//!
//! This module defines the fundamental data structures used throughout kairos:
//! accounts, observations, relevance tiers, questions, and intelligence briefs.
//! Observations carry per-question relevance maps; the flat single-tier model
//! is a degenerate case of this one and is not supported separately.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relevance tier for an observation under a given question.
///
/// Totally ordered by descending actionability: High > Medium > Low > Noise.
/// High and Medium observations are kept in the agent context; Low and Noise
/// are filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceTier {
    /// Strong predictor for the question, immediate action
    High,

    /// Moderate concern, monitor closely
    Medium,

    /// Weak signal, noted but not actionable alone
    Low,

    /// No predictive value, filtered out
    Noise,
}

impl RelevanceTier {
    /// Actionability rank, 0 = most actionable
    pub fn rank(&self) -> u8 {
        match self {
            RelevanceTier::High => 0,
            RelevanceTier::Medium => 1,
            RelevanceTier::Low => 2,
            RelevanceTier::Noise => 3,
        }
    }

    /// Whether observations at this tier survive filtering into the context
    pub fn is_kept(&self) -> bool {
        matches!(self, RelevanceTier::High | RelevanceTier::Medium)
    }

    /// Short display label
    pub fn label(&self) -> &'static str {
        match self {
            RelevanceTier::High => "HIGH",
            RelevanceTier::Medium => "MED",
            RelevanceTier::Low => "LOW",
            RelevanceTier::Noise => "NOISE",
        }
    }

    /// Parse a tier name as used in fixtures and collaborator responses
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "high" => Some(RelevanceTier::High),
            "medium" => Some(RelevanceTier::Medium),
            "low" => Some(RelevanceTier::Low),
            "noise" => Some(RelevanceTier::Noise),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelevanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Category of an account observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalCategory {
    Usage,
    Support,
    Stakeholder,
    Financial,
    Sentiment,
}

impl SignalCategory {
    /// Uppercase form used in serialized context lines
    pub fn upper(&self) -> &'static str {
        match self {
            SignalCategory::Usage => "USAGE",
            SignalCategory::Support => "SUPPORT",
            SignalCategory::Stakeholder => "STAKEHOLDER",
            SignalCategory::Financial => "FINANCIAL",
            SignalCategory::Sentiment => "SENTIMENT",
        }
    }
}

impl std::fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalCategory::Usage => "Usage",
            SignalCategory::Support => "Support",
            SignalCategory::Stakeholder => "Stakeholder",
            SignalCategory::Financial => "Financial",
            SignalCategory::Sentiment => "Sentiment",
        };
        write!(f, "{}", name)
    }
}

/// Question identifier: the four canned catalog questions plus the ad hoc
/// custom slot. The custom question's free text lives on the session; this
/// key is what observation relevance maps are indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionId {
    Churn,
    Expansion,
    Seats,
    Features,
    Custom,
}

impl QuestionId {
    /// The four canned catalog questions, in catalog order
    pub const CATALOG: [QuestionId; 4] = [
        QuestionId::Churn,
        QuestionId::Expansion,
        QuestionId::Seats,
        QuestionId::Features,
    ];

    /// Display label for catalog questions; the custom slot has no fixed
    /// label (its text is session state)
    pub fn label(&self) -> &'static str {
        match self {
            QuestionId::Churn => "Churn Risk at Renewal",
            QuestionId::Expansion => "Expansion Likelihood",
            QuestionId::Seats => "Seat Reduction Risk",
            QuestionId::Features => "Feature Adoption Trajectory",
            QuestionId::Custom => "Custom Question",
        }
    }

    /// Longer description shown when choosing a question
    pub fn description(&self) -> &'static str {
        match self {
            QuestionId::Churn => {
                "What is this customer's likelihood of churning in the next 6 months?"
            }
            QuestionId::Expansion => {
                "Will this customer expand seats, usage, or contract value in the next 6 months?"
            }
            QuestionId::Seats => {
                "Is this customer likely to reduce seats or downgrade in the next 6 months?"
            }
            QuestionId::Features => {
                "Which features will this customer adopt or abandon in the next 6 months?"
            }
            QuestionId::Custom => "Free-text question classified by the collaborator",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, QuestionId::Custom)
    }

    /// Parse a question id as used on the CLI and in fixtures
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "churn" => Some(QuestionId::Churn),
            "expansion" => Some(QuestionId::Expansion),
            "seats" => Some(QuestionId::Seats),
            "features" => Some(QuestionId::Features),
            "custom" => Some(QuestionId::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QuestionId::Churn => "churn",
            QuestionId::Expansion => "expansion",
            QuestionId::Seats => "seats",
            QuestionId::Features => "features",
            QuestionId::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// One raw data point about an account: a metric name and an opaque observed
/// value, plus per-question relevance tiers and rationale strings.
///
/// `value` is display text (numeric delta, ratio, qualitative string, or a
/// literal quote) and is never parsed. `signals` and `insights` share key
/// sets in fixture data; absent entries resolve to Noise / "".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Signal category
    pub category: SignalCategory,

    /// Metric display name, unique within an account; glossary lookup key
    pub metric: String,

    /// Observed value, treated as opaque display text
    pub value: String,

    /// Relevance tier per question
    #[serde(default)]
    pub signals: BTreeMap<QuestionId, RelevanceTier>,

    /// Short rationale per question, parallel to `signals`
    #[serde(default)]
    pub insights: BTreeMap<QuestionId, String>,

    /// Set once a manager has manually changed the tier; never cleared within
    /// a session (audit marker, not a revert marker)
    #[serde(default)]
    pub overridden: bool,
}

/// Account risk banding as shipped by the upstream scoring fixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// A customer account with its observation set and precomputed briefs.
///
/// Immutable for the session except as a container for its observations,
/// which the session clones and mutates via overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub arr: String,
    pub renewal_in: String,
    pub renewal_date: String,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub csm: String,
    pub contacts: u32,
    pub last_activity: String,
    pub observations: Vec<Observation>,

    /// Precomputed brief per canned question
    #[serde(default)]
    pub briefs: BTreeMap<QuestionId, Brief>,
}

/// Display color tag for a brief. Unknown or missing tags fall back to the
/// neutral/info color rather than erroring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefColor {
    Red,
    Green,
    Orange,
    #[default]
    #[serde(other)]
    Neutral,
}

/// Projected impact of one recommended action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionImpact {
    /// Headline projection
    pub text: String,

    /// Supporting calculation narrative
    pub math: String,
}

/// The output artifact for an (account, question) pair: risk narrative,
/// ranked factors and actions, projected impacts, confidence, and timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub title: String,

    /// Risk/status label
    pub risk: String,

    /// Headline probability or metric, display text
    pub prob: String,

    #[serde(default)]
    pub color: BriefColor,

    pub factors: Vec<String>,
    pub actions: Vec<String>,

    #[serde(default)]
    pub action_impacts: Vec<ActionImpact>,

    /// Confidence score, 0-100
    pub confidence: u8,

    pub timeline: String,
}

/// Risk label carried by degraded briefs after a classification failure
pub const ANALYSIS_ERROR_RISK: &str = "ANALYSIS ERROR";

impl Brief {
    /// Degraded brief substituted when the collaborator fails, times out, or
    /// returns unparsable output. Confidence 0, no impact detail, guidance to
    /// retry or fall back to a catalog question.
    pub fn degraded() -> Self {
        Brief {
            title: "CUSTOM ANALYSIS".to_string(),
            risk: ANALYSIS_ERROR_RISK.to_string(),
            prob: "N/A".to_string(),
            color: BriefColor::Orange,
            factors: vec![
                "Could not generate analysis — check API connection".to_string(),
                "Try one of the predefined questions instead".to_string(),
            ],
            actions: vec![
                "Retry the question".to_string(),
                "Use a predefined question".to_string(),
            ],
            action_impacts: vec![],
            confidence: 0,
            timeline: "N/A".to_string(),
        }
    }

    /// Whether this brief clears the autonomy gate (see [`AUTONOMY_CONFIDENCE_FLOOR`])
    pub fn autonomy_eligible(&self) -> bool {
        self.confidence >= AUTONOMY_CONFIDENCE_FLOOR
    }
}

/// Minimum brief confidence at which autonomous mode becomes selectable
pub const AUTONOMY_CONFIDENCE_FLOOR: u8 = 90;

/// Operating mode derived from the displayed brief and the manager's toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// Agent may act without per-action approval
    Autonomous,

    /// Manager approves each action; forced below the confidence floor
    CoPilot,
}

/// One per-observation classification from the collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalScore {
    /// Observation index, 0..N-1; out-of-range entries are ignored
    pub idx: usize,

    /// Assigned tier
    pub signal: RelevanceTier,

    /// Rationale for this question
    #[serde(default)]
    pub insight: String,
}

/// Role of a chat transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the follow-up chat transcript. The full transcript is
/// replayed on every collaborator call; no server-side state is assumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering_by_actionability() {
        assert!(RelevanceTier::High.rank() < RelevanceTier::Medium.rank());
        assert!(RelevanceTier::Medium.rank() < RelevanceTier::Low.rank());
        assert!(RelevanceTier::Low.rank() < RelevanceTier::Noise.rank());
        assert!(RelevanceTier::High < RelevanceTier::Noise);
    }

    #[test]
    fn test_tier_kept_policy() {
        assert!(RelevanceTier::High.is_kept());
        assert!(RelevanceTier::Medium.is_kept());
        assert!(!RelevanceTier::Low.is_kept());
        assert!(!RelevanceTier::Noise.is_kept());
    }

    #[test]
    fn test_tier_serde_roundtrip() {
        let json = serde_json::to_string(&RelevanceTier::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let tier: RelevanceTier = serde_json::from_str("\"noise\"").unwrap();
        assert_eq!(tier, RelevanceTier::Noise);
    }

    #[test]
    fn test_question_labels() {
        assert_eq!(QuestionId::Churn.label(), "Churn Risk at Renewal");
        assert_eq!(QuestionId::Seats.label(), "Seat Reduction Risk");
        assert_eq!(QuestionId::from_name("expansion"), Some(QuestionId::Expansion));
        assert_eq!(QuestionId::from_name("bogus"), None);
    }

    #[test]
    fn test_brief_color_fallback() {
        let color: BriefColor = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(color, BriefColor::Red);
        let color: BriefColor = serde_json::from_str("\"chartreuse\"").unwrap();
        assert_eq!(color, BriefColor::Neutral);
    }

    #[test]
    fn test_degraded_brief_shape() {
        let brief = Brief::degraded();
        assert_eq!(brief.risk, ANALYSIS_ERROR_RISK);
        assert_eq!(brief.confidence, 0);
        assert!(brief.action_impacts.is_empty());
        assert!(!brief.autonomy_eligible());
    }

    #[test]
    fn test_autonomy_floor() {
        let mut brief = Brief::degraded();
        brief.confidence = 89;
        assert!(!brief.autonomy_eligible());
        brief.confidence = 90;
        assert!(brief.autonomy_eligible());
    }

    #[test]
    fn test_category_upper() {
        assert_eq!(SignalCategory::Stakeholder.upper(), "STAKEHOLDER");
    }
}
