//! Advisory request and result records.
//!
//! Requests are immutable bundles built by the caller; results are transient
//! and typed, with documented bounds on every numeric field. Nothing here is
//! persisted by the core — the caller decides whether to store a result
//! (e.g. attach a lead score to a customer) or display it ephemerally.

use serde::{Deserialize, Serialize};

/// Where a result came from.
///
/// `Fallback` means the model was unavailable or its response could not be
/// trusted, and the deterministic input-derived substitute was returned
/// instead. Callers that want to show a "generation failed, try again"
/// notice can branch on this; correctness never requires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Model,
    Fallback,
}

/// A typed advisory result tagged with its origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advised<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Advised<T> {
    pub fn model(value: T) -> Self {
        Advised {
            value,
            origin: Origin::Model,
        }
    }

    pub fn fallback(value: T) -> Self {
        Advised {
            value,
            origin: Origin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }
}

/// Input bundle for lead scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadProfile {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub interactions: u32,
}

/// Sentiment classification for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Full customer analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInsight {
    pub customer_id: String,
    /// −1.0 (hostile) to 1.0 (delighted).
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    /// 0–100, likelihood of losing this customer.
    pub churn_risk: u8,
    /// 0–100, overall customer health.
    pub health_score: u8,
    pub next_best_actions: Vec<String>,
    pub key_insights: Vec<String>,
    /// Expected revenue over the next 90 days.
    pub predicted_value: f64,
}

/// Input bundle for email generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub recipient_name: String,
    pub purpose: String,
    /// Desired tone, e.g. "professional", "friendly", "urgent", "casual".
    pub tone: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// A drafted email with self-review notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSuggestion {
    pub subject: String,
    pub body: String,
    /// The tone the draft actually uses.
    pub tone: String,
    pub sentiment: String,
    pub improvements: Vec<String>,
}

/// Revenue forecast horizon values, dollars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueForecast {
    #[serde(rename = "next30Days")]
    pub next_30_days: f64,
    #[serde(rename = "next60Days")]
    pub next_60_days: f64,
    #[serde(rename = "next90Days")]
    pub next_90_days: f64,
    /// 0–100.
    pub confidence: u8,
}

/// Close probability for one open opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealProbability {
    pub customer_id: String,
    pub customer_name: String,
    /// 0–100.
    pub probability: u8,
    pub expected_value: f64,
    pub timeline: String,
}

/// Overall revenue trend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// Percentage, may be negative.
    pub growth_rate: f64,
    pub insights: Vec<String>,
}

/// Pipeline-level predictive analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveAnalytics {
    pub revenue_forecast: RevenueForecast,
    /// Sorted by probability descending, stable on ties.
    pub deal_probabilities: Vec<DealProbability>,
    pub trend_analysis: TrendAnalysis,
}

/// Estimated business impact of completing a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

/// Priority advice for one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAdvice {
    pub task_id: String,
    /// 0–100, higher = more urgent.
    pub priority_score: u8,
    pub urgency_reason: String,
    pub suggested_time: String,
    pub estimated_impact: ImpactLevel,
}

/// Category of a dashboard insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
    Alert,
}

/// One actionable dashboard observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInsight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// 1–10, higher = more important.
    pub priority: u8,
}

/// Extracted structure from free-text meeting notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingAnalysis {
    pub summary: String,
    pub action_items: Vec<String>,
    pub key_decisions: Vec<String>,
    pub follow_ups: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_kind_uses_type_field() {
        let insight = DashboardInsight {
            kind: InsightKind::Warning,
            title: "Pending Tasks".into(),
            description: "3 tasks need attention".into(),
            action: Some("Review task list".into()),
            priority: 7,
        };
        let json = serde_json::to_string(&insight).expect("serialize");
        assert!(json.contains("\"type\":\"warning\""));
    }

    #[test]
    fn forecast_serde_day_fields() {
        let forecast = RevenueForecast {
            next_30_days: 105.0,
            next_60_days: 112.0,
            next_90_days: 120.0,
            confidence: 70,
        };
        let json = serde_json::to_string(&forecast).expect("serialize");
        assert!(json.contains("\"next30Days\""));
        assert!(json.contains("\"next90Days\""));
    }

    #[test]
    fn advised_origin_tagging() {
        let advised = Advised::fallback(42u8);
        assert!(advised.is_fallback());
        let advised = Advised::model(42u8);
        assert!(!advised.is_fallback());
    }
}
