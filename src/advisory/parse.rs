//! Model response parsing and field-level validation.
//!
//! Responses are supposed to be ONLY JSON but routinely arrive wrapped in
//! markdown code fences or surrounded by prose, so extraction tries, in
//! order: a ```json fence, a bare ``` fence, a raw payload, and finally a
//! balanced brace/bracket scan through surrounding text.
//!
//! Validation is field-level: a present, well-typed, in-bounds value is
//! accepted; an out-of-range numeric clamps to its bounds; a missing or
//! ill-typed field takes its documented default. Only an unparseable
//! response or one where no expected field survives escalates to the
//! function's whole-result fallback.

use serde::Deserialize;

use crate::advisory::fallback;
use crate::advisory::types::{
    CustomerInsight, DashboardInsight, DealProbability, EmailRequest, EmailSuggestion,
    ImpactLevel, InsightKind, MeetingAnalysis, PredictiveAnalytics, RevenueForecast,
    SentimentLabel, TaskAdvice, TrendAnalysis, TrendDirection,
};
use crate::error::AdvisoryError;
use crate::types::{Customer, Task};

/// Extract a JSON payload (object or array) from the response text.
pub(crate) fn extract_json(response: &str) -> Option<&str> {
    // ```json fence
    if let Some(start) = response.find("```json") {
        let payload_start = start + 7;
        if let Some(end) = response[payload_start..].find("```") {
            return Some(response[payload_start..payload_start + end].trim());
        }
    }
    // Generic ``` fence
    if let Some(start) = response.find("```") {
        let after_fence = start + 3;
        if let Some(nl) = response[after_fence..].find('\n') {
            let payload_start = after_fence + nl + 1;
            if let Some(end) = response[payload_start..].find("```") {
                let candidate = response[payload_start..payload_start + end].trim();
                if candidate.starts_with('{') || candidate.starts_with('[') {
                    return Some(candidate);
                }
            }
        }
    }

    // Raw payload
    let trimmed = response.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(trimmed);
    }

    // Payload embedded in other text: balanced scan from the first opener
    let start = response.find(['{', '['])?;
    let candidate = &response[start..];
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for (i, ch) in candidate.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&candidate[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode the response into a typed raw shape after fence stripping.
fn decode<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T, AdvisoryError> {
    if response.trim().is_empty() {
        return Err(AdvisoryError::Parse("empty response".into()));
    }
    let payload = extract_json(response)
        .ok_or_else(|| AdvisoryError::Parse("no JSON payload in response".into()))?;
    serde_json::from_str(payload).map_err(|e| AdvisoryError::Parse(e.to_string()))
}

fn clamp_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

fn clamp_insight_priority(value: f64) -> u8 {
    value.clamp(1.0, 10.0).round() as u8
}

// --- Lead score -------------------------------------------------------------

/// The lead scorer is asked for a bare number, but models sometimes wrap it
/// in prose or a fence anyway. Accept the first integer found.
pub(crate) fn parse_lead_score(response: &str) -> Result<u8, AdvisoryError> {
    let text = extract_json(response).unwrap_or(response).trim();
    if let Ok(score) = text.parse::<f64>() {
        return Ok(clamp_score(score));
    }
    // Score hidden in prose or a tiny JSON object
    let digits: String = {
        let mut found = String::new();
        for ch in text.chars() {
            if ch.is_ascii_digit() {
                found.push(ch);
            } else if !found.is_empty() {
                break;
            }
        }
        found
    };
    digits
        .parse::<f64>()
        .map(clamp_score)
        .map_err(|_| AdvisoryError::Parse(format!("no numeric score in response: {text:.40}")))
}

// --- Customer analysis ------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInsight {
    sentiment_score: Option<f64>,
    sentiment_label: Option<String>,
    churn_risk: Option<f64>,
    health_score: Option<f64>,
    next_best_actions: Option<Vec<String>>,
    key_insights: Option<Vec<String>>,
    predicted_value: Option<f64>,
}

pub(crate) fn parse_customer_insight(
    response: &str,
    customer: &Customer,
) -> Result<CustomerInsight, AdvisoryError> {
    let raw: RawInsight = decode(response)?;

    let present = [
        raw.sentiment_score.is_some(),
        raw.sentiment_label.is_some(),
        raw.churn_risk.is_some(),
        raw.health_score.is_some(),
        raw.next_best_actions.is_some(),
        raw.key_insights.is_some(),
        raw.predicted_value.is_some(),
    ];
    if !present.iter().any(|p| *p) {
        return Err(AdvisoryError::Validation(
            "no expected customer-insight field present".into(),
        ));
    }

    let sentiment_score = clamp_unit(raw.sentiment_score.unwrap_or(0.0));
    let sentiment_label = raw
        .sentiment_label
        .as_deref()
        .and_then(parse_sentiment)
        .unwrap_or(SentimentLabel::Neutral);

    Ok(CustomerInsight {
        customer_id: customer.id.clone(),
        sentiment_score,
        sentiment_label,
        churn_risk: raw
            .churn_risk
            .map(clamp_score)
            .unwrap_or(fallback::DEFAULT_CHURN_RISK),
        health_score: raw
            .health_score
            .map(clamp_score)
            .unwrap_or(fallback::DEFAULT_HEALTH_SCORE),
        next_best_actions: raw
            .next_best_actions
            .filter(|v| !v.is_empty())
            .unwrap_or_else(fallback::default_next_actions),
        key_insights: raw
            .key_insights
            .filter(|v| !v.is_empty())
            .unwrap_or_else(fallback::default_key_insights),
        predicted_value: raw.predicted_value.unwrap_or(customer.value),
    })
}

fn parse_sentiment(label: &str) -> Option<SentimentLabel> {
    match label.to_ascii_lowercase().as_str() {
        "positive" => Some(SentimentLabel::Positive),
        "neutral" => Some(SentimentLabel::Neutral),
        "negative" => Some(SentimentLabel::Negative),
        _ => None,
    }
}

// --- Email ------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEmail {
    subject: Option<String>,
    body: Option<String>,
    tone: Option<String>,
    sentiment: Option<String>,
    improvements: Option<Vec<String>>,
}

pub(crate) fn parse_email(
    response: &str,
    request: &EmailRequest,
) -> Result<EmailSuggestion, AdvisoryError> {
    let raw: RawEmail = decode(response)?;

    let subject = raw.subject.filter(|s| !s.trim().is_empty());
    let body = raw.body.filter(|b| !b.trim().is_empty());
    if subject.is_none() && body.is_none() {
        return Err(AdvisoryError::Validation(
            "email response has neither subject nor body".into(),
        ));
    }

    let template = fallback::email(request);
    Ok(EmailSuggestion {
        subject: subject.unwrap_or(template.subject),
        body: body.unwrap_or(template.body),
        tone: raw
            .tone
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| request.tone.clone()),
        sentiment: raw
            .sentiment
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "neutral".into()),
        improvements: raw
            .improvements
            .filter(|v| !v.is_empty())
            .unwrap_or(template.improvements),
    })
}

// --- Predictive analytics ---------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPredictive {
    revenue_forecast: Option<RawForecast>,
    deal_probabilities: Option<Vec<RawDeal>>,
    trend_analysis: Option<RawTrend>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawForecast {
    #[serde(rename = "next30Days")]
    next_30_days: Option<f64>,
    #[serde(rename = "next60Days")]
    next_60_days: Option<f64>,
    #[serde(rename = "next90Days")]
    next_90_days: Option<f64>,
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeal {
    customer_id: Option<String>,
    customer_name: Option<String>,
    probability: Option<f64>,
    expected_value: Option<f64>,
    timeline: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrend {
    direction: Option<String>,
    growth_rate: Option<f64>,
    insights: Option<Vec<String>>,
}

pub(crate) fn parse_predictive(
    response: &str,
    customers: &[Customer],
) -> Result<PredictiveAnalytics, AdvisoryError> {
    let raw: RawPredictive = decode(response)?;

    if raw.revenue_forecast.is_none()
        && raw.deal_probabilities.is_none()
        && raw.trend_analysis.is_none()
    {
        return Err(AdvisoryError::Validation(
            "no expected analytics section present".into(),
        ));
    }

    let total_revenue: f64 = customers.iter().map(|c| c.value).sum();

    let revenue_forecast = match raw.revenue_forecast {
        Some(f) => RevenueForecast {
            next_30_days: f.next_30_days.unwrap_or(total_revenue * 1.05).max(0.0),
            next_60_days: f.next_60_days.unwrap_or(total_revenue * 1.12).max(0.0),
            next_90_days: f.next_90_days.unwrap_or(total_revenue * 1.20).max(0.0),
            confidence: f.confidence.map(clamp_score).unwrap_or(75),
        },
        None => fallback::revenue_forecast(total_revenue, 75),
    };

    let mut deal_probabilities: Vec<DealProbability> = raw
        .deal_probabilities
        .unwrap_or_default()
        .into_iter()
        .filter_map(|d| {
            let customer_id = d.customer_id?;
            let customer_name = d.customer_name.unwrap_or_else(|| {
                customers
                    .iter()
                    .find(|c| c.id == customer_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default()
            });
            Some(DealProbability {
                customer_id,
                customer_name,
                probability: d.probability.map(clamp_score).unwrap_or(65),
                expected_value: d.expected_value.unwrap_or(0.0).max(0.0),
                timeline: d
                    .timeline
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| fallback::DEFAULT_TIMELINE.into()),
            })
        })
        .collect();
    // Probability descending; stable, so equal entries keep model order
    deal_probabilities.sort_by(|a, b| b.probability.cmp(&a.probability));

    let trend_analysis = match raw.trend_analysis {
        Some(t) => TrendAnalysis {
            direction: t
                .direction
                .as_deref()
                .and_then(parse_direction)
                .unwrap_or(TrendDirection::Stable),
            growth_rate: t.growth_rate.unwrap_or(5.0),
            insights: t.insights.filter(|v| !v.is_empty()).unwrap_or_else(|| {
                vec![
                    "Steady growth pattern".into(),
                    "Strong customer retention".into(),
                ]
            }),
        },
        None => TrendAnalysis {
            direction: TrendDirection::Stable,
            growth_rate: 5.0,
            insights: vec![
                "Steady growth pattern".into(),
                "Strong customer retention".into(),
            ],
        },
    };

    Ok(PredictiveAnalytics {
        revenue_forecast,
        deal_probabilities,
        trend_analysis,
    })
}

fn parse_direction(direction: &str) -> Option<TrendDirection> {
    match direction.to_ascii_lowercase().as_str() {
        "up" => Some(TrendDirection::Up),
        "down" => Some(TrendDirection::Down),
        "stable" => Some(TrendDirection::Stable),
        _ => None,
    }
}

// --- Task prioritization ----------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTaskAdvice {
    task_id: Option<String>,
    priority_score: Option<f64>,
    urgency_reason: Option<String>,
    suggested_time: Option<String>,
    estimated_impact: Option<String>,
}

/// Parse per-task advice, keyed back to the input tasks.
///
/// Tasks the model skipped (or referenced with an unknown id) get their
/// deterministic fallback entry, so the output always covers every input
/// task in input order.
pub(crate) fn parse_task_advice(
    response: &str,
    tasks: &[Task],
) -> Result<Vec<TaskAdvice>, AdvisoryError> {
    let raw: Vec<RawTaskAdvice> = decode(response)?;
    if raw.is_empty() {
        return Err(AdvisoryError::Validation("empty task advice array".into()));
    }

    let mut by_id: std::collections::HashMap<String, RawTaskAdvice> = raw
        .into_iter()
        .filter_map(|r| r.task_id.clone().map(|id| (id, r)))
        .collect();

    Ok(tasks
        .iter()
        .map(|task| match by_id.remove(&task.id) {
            Some(r) => {
                let default = fallback::task_advice(task);
                TaskAdvice {
                    task_id: task.id.clone(),
                    priority_score: r
                        .priority_score
                        .map(clamp_score)
                        .unwrap_or(default.priority_score),
                    urgency_reason: r
                        .urgency_reason
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or(default.urgency_reason),
                    suggested_time: r
                        .suggested_time
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or(default.suggested_time),
                    estimated_impact: r
                        .estimated_impact
                        .as_deref()
                        .and_then(parse_impact)
                        .unwrap_or(default.estimated_impact),
                }
            }
            None => fallback::task_advice(task),
        })
        .collect())
}

fn parse_impact(impact: &str) -> Option<ImpactLevel> {
    match impact.to_ascii_lowercase().as_str() {
        "high" => Some(ImpactLevel::High),
        "medium" => Some(ImpactLevel::Medium),
        "low" => Some(ImpactLevel::Low),
        _ => None,
    }
}

// --- Dashboard insights -----------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDashboardInsight {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    description: Option<String>,
    action: Option<String>,
    priority: Option<f64>,
}

pub(crate) fn parse_dashboard_insights(
    response: &str,
) -> Result<Vec<DashboardInsight>, AdvisoryError> {
    let raw: Vec<RawDashboardInsight> = decode(response)?;

    let insights: Vec<DashboardInsight> = raw
        .into_iter()
        .filter_map(|r| {
            let title = r.title.filter(|t| !t.trim().is_empty())?;
            Some(DashboardInsight {
                kind: r
                    .kind
                    .as_deref()
                    .and_then(parse_insight_kind)
                    .unwrap_or(InsightKind::Info),
                title,
                description: r.description.unwrap_or_default(),
                action: r.action.filter(|a| !a.trim().is_empty()),
                priority: r.priority.map(clamp_insight_priority).unwrap_or(5),
            })
        })
        .collect();

    if insights.is_empty() {
        return Err(AdvisoryError::Validation(
            "no usable insight in response".into(),
        ));
    }
    Ok(insights)
}

fn parse_insight_kind(kind: &str) -> Option<InsightKind> {
    match kind.to_ascii_lowercase().as_str() {
        "warning" => Some(InsightKind::Warning),
        "success" => Some(InsightKind::Success),
        "info" => Some(InsightKind::Info),
        "alert" => Some(InsightKind::Alert),
        _ => None,
    }
}

// --- Meeting notes ----------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeeting {
    summary: Option<String>,
    action_items: Option<Vec<String>>,
    key_decisions: Option<Vec<String>>,
    follow_ups: Option<Vec<String>>,
}

pub(crate) fn parse_meeting_analysis(response: &str) -> Result<MeetingAnalysis, AdvisoryError> {
    let raw: RawMeeting = decode(response)?;

    if raw.summary.is_none()
        && raw.action_items.is_none()
        && raw.key_decisions.is_none()
        && raw.follow_ups.is_none()
    {
        return Err(AdvisoryError::Validation(
            "no expected meeting-analysis field present".into(),
        ));
    }

    Ok(MeetingAnalysis {
        summary: raw
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback::MEETING_SUMMARY.into()),
        action_items: raw.action_items.unwrap_or_default(),
        key_decisions: raw.key_decisions.unwrap_or_default(),
        follow_ups: raw.follow_ups.unwrap_or_default(),
    })
}
