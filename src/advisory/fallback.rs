//! Deterministic, input-derived fallback results.
//!
//! Returned whenever the gateway fails, the response cannot be parsed, or
//! validation rejects the whole payload. Each constructor is pure: the same
//! input always yields the same result, so the degraded experience is
//! predictable and testable without a network.

use crate::advisory::types::{
    CustomerInsight, DashboardInsight, DealProbability, EmailRequest, EmailSuggestion,
    ImpactLevel, InsightKind, LeadProfile, MeetingAnalysis, PredictiveAnalytics, RevenueForecast,
    SentimentLabel, TaskAdvice, TrendAnalysis, TrendDirection,
};
use crate::types::{Customer, Task, TaskPriority, TaskStatus};

pub(crate) const DEFAULT_CHURN_RISK: u8 = 20;
pub(crate) const DEFAULT_HEALTH_SCORE: u8 = 75;
pub(crate) const DEFAULT_TIMELINE: &str = "30-60 days";
pub(crate) const MEETING_SUMMARY: &str = "Meeting notes analyzed";

/// Assistant reply when no API key is configured.
pub(crate) const CHAT_UNCONFIGURED: &str =
    "I'm currently not configured with an API key. Please add your Groq API key \
     in the Settings page to enable AI features.";

/// Assistant reply when the provider call fails.
pub(crate) const CHAT_UNAVAILABLE: &str =
    "I'm having trouble connecting right now. Please make sure your API key is \
     configured correctly in Settings.";

/// Heuristic lead score: base 50, up to +30 for engagement, +10 each for
/// known company and industry, capped at 100.
pub(crate) fn lead_score(lead: &LeadProfile) -> u8 {
    let base: u32 = 50;
    let interaction_bonus = (lead.interactions * 2).min(30);
    let has_company = if lead.company.is_some() { 10 } else { 0 };
    let has_industry = if lead.industry.is_some() { 10 } else { 0 };
    (base + interaction_bonus + has_company + has_industry).min(100) as u8
}

pub(crate) fn default_next_actions() -> Vec<String> {
    vec![
        "Schedule follow-up call".into(),
        "Send personalized email".into(),
        "Review account status".into(),
    ]
}

pub(crate) fn default_key_insights() -> Vec<String> {
    vec!["Active customer".into(), "Regular engagement".into()]
}

pub(crate) fn customer_insight(customer: &Customer) -> CustomerInsight {
    CustomerInsight {
        customer_id: customer.id.clone(),
        sentiment_score: 0.0,
        sentiment_label: SentimentLabel::Neutral,
        churn_risk: DEFAULT_CHURN_RISK,
        health_score: DEFAULT_HEALTH_SCORE,
        next_best_actions: default_next_actions(),
        key_insights: default_key_insights(),
        predicted_value: customer.value,
    }
}

pub(crate) fn email(request: &EmailRequest) -> EmailSuggestion {
    EmailSuggestion {
        subject: format!("Follow-up with {}", request.recipient_name),
        body: format!(
            "Dear {},\n\nI wanted to follow up regarding {}.\n\nBest regards",
            request.recipient_name, request.purpose
        ),
        tone: "professional".into(),
        sentiment: "neutral".into(),
        improvements: vec!["Add specific details".into(), "Include call-to-action".into()],
    }
}

pub(crate) fn revenue_forecast(total_revenue: f64, confidence: u8) -> RevenueForecast {
    RevenueForecast {
        next_30_days: total_revenue * 1.05,
        next_60_days: total_revenue * 1.12,
        next_90_days: total_revenue * 1.20,
        confidence,
    }
}

/// Pipeline analytics without a model: a multiplier forecast plus the top 5
/// customers by value as assumed-probability deals.
pub(crate) fn predictive(customers: &[Customer]) -> PredictiveAnalytics {
    let total_revenue: f64 = customers.iter().map(|c| c.value).sum();

    let mut top: Vec<&Customer> = customers.iter().collect();
    top.sort_by(|a, b| b.value.total_cmp(&a.value));

    let deal_probabilities = top
        .into_iter()
        .take(5)
        .map(|c| DealProbability {
            customer_id: c.id.clone(),
            customer_name: c.name.clone(),
            probability: 65,
            expected_value: c.value * 1.2,
            timeline: DEFAULT_TIMELINE.into(),
        })
        .collect();

    PredictiveAnalytics {
        revenue_forecast: revenue_forecast(total_revenue, 70),
        deal_probabilities,
        trend_analysis: TrendAnalysis {
            direction: TrendDirection::Up,
            growth_rate: 8.0,
            insights: vec!["Positive growth trajectory".into(), "Strong pipeline".into()],
        },
    }
}

/// Well-formed zeroed result for an empty customer list.
pub(crate) fn empty_predictive() -> PredictiveAnalytics {
    PredictiveAnalytics {
        revenue_forecast: RevenueForecast {
            next_30_days: 0.0,
            next_60_days: 0.0,
            next_90_days: 0.0,
            confidence: 0,
        },
        deal_probabilities: Vec::new(),
        trend_analysis: TrendAnalysis {
            direction: TrendDirection::Stable,
            growth_rate: 0.0,
            insights: Vec::new(),
        },
    }
}

/// Map the user-set task priority onto the advisory scale.
pub(crate) fn task_advice(task: &Task) -> TaskAdvice {
    let (priority_score, estimated_impact) = match task.priority {
        TaskPriority::High => (90, ImpactLevel::High),
        TaskPriority::Medium => (60, ImpactLevel::Medium),
        TaskPriority::Low => (30, ImpactLevel::Low),
    };
    TaskAdvice {
        task_id: task.id.clone(),
        priority_score,
        urgency_reason: "Standard priority".into(),
        suggested_time: "This week".into(),
        estimated_impact,
    }
}

/// Two canned observations derived from entity counts.
pub(crate) fn dashboard_insights(customers: &[Customer], tasks: &[Task]) -> Vec<DashboardInsight> {
    let pending = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .count();
    vec![
        DashboardInsight {
            kind: InsightKind::Warning,
            title: "Pending Tasks".into(),
            description: format!("{pending} tasks need attention"),
            action: Some("Review task list".into()),
            priority: 7,
        },
        DashboardInsight {
            kind: InsightKind::Info,
            title: "Customer Base Growing".into(),
            description: format!("You have {} customers with steady growth", customers.len()),
            action: None,
            priority: 5,
        },
    ]
}

pub(crate) fn meeting_analysis() -> MeetingAnalysis {
    MeetingAnalysis {
        summary: MEETING_SUMMARY.into(),
        action_items: Vec::new(),
        key_decisions: Vec::new(),
        follow_ups: Vec::new(),
    }
}
