//! End-to-end advisory behavior through the public API: degraded (no
//! credential) paths, bound enforcement on model output, and determinism.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use acumen::advisory::{
    AdvisoryService, EmailRequest, ImpactLevel, LeadProfile, Origin, SentimentLabel,
};
use acumen::{AdvisoryError, ChatModel, CompletionParams, CrmStore, GatewayConfig, GroqGateway};

/// Gateway stand-in with a canned completion and a call counter.
struct Stub {
    response: Option<String>,
    calls: AtomicU32,
}

impl Stub {
    fn ok(response: &str) -> Arc<Self> {
        Arc::new(Stub {
            response: Some(response.to_string()),
            calls: AtomicU32::new(0),
        })
    }

    fn unconfigured() -> Arc<Self> {
        Arc::new(Stub {
            response: None,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl ChatModel for Stub {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _params: CompletionParams,
    ) -> Result<String, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(AdvisoryError::Configuration),
        }
    }
}

fn unconfigured_service() -> AdvisoryService {
    // The real gateway with no key behaves identically to Stub::unconfigured;
    // use it so the Configuration path is exercised for real.
    AdvisoryService::new(Arc::new(GroqGateway::new(GatewayConfig::default())))
}

#[tokio::test]
async fn lead_score_base_only_without_credential() {
    let service = unconfigured_service();
    let lead = LeadProfile {
        name: "A".into(),
        email: "a@a.com".into(),
        company: None,
        industry: None,
        interactions: 0,
    };
    let advised = service.score_lead(&lead).await;
    assert_eq!(advised.value, 50);
    assert_eq!(advised.origin, Origin::Fallback);
}

#[tokio::test]
async fn lead_score_saturated_without_credential() {
    let service = unconfigured_service();
    let lead = LeadProfile {
        name: "A".into(),
        email: "a@a.com".into(),
        company: Some("X".into()),
        industry: Some("Y".into()),
        interactions: 20,
    };
    let advised = service.score_lead(&lead).await;
    assert_eq!(advised.value, 100);
}

#[tokio::test]
async fn customer_analysis_fallback_shape_in_bounds() {
    let service = unconfigured_service();
    let customer = &CrmStore::with_demo_data().list_customers()[0];
    let advised = service.analyze_customer(customer).await;

    assert!(advised.is_fallback());
    let insight = &advised.value;
    assert_eq!(insight.customer_id, customer.id);
    assert!((-1.0..=1.0).contains(&insight.sentiment_score));
    assert_eq!(insight.sentiment_label, SentimentLabel::Neutral);
    assert!(insight.churn_risk <= 100);
    assert!(insight.health_score <= 100);
    assert!(!insight.next_best_actions.is_empty());
    assert!(!insight.key_insights.is_empty());
    assert_eq!(insight.predicted_value, customer.value);
}

#[tokio::test]
async fn task_prioritization_fallback_high_maps_to_90() {
    let service = unconfigured_service();
    let tasks = CrmStore::with_demo_data().list_tasks();
    let advised = service.prioritize_tasks(&tasks[..1]).await;

    assert_eq!(advised.value.len(), 1);
    let advice = &advised.value[0];
    assert_eq!(advice.task_id, "1");
    assert_eq!(advice.priority_score, 90);
    assert_eq!(advice.estimated_impact, ImpactLevel::High);
    assert!(!advice.urgency_reason.is_empty());
    assert!(!advice.suggested_time.is_empty());
}

#[tokio::test]
async fn predictive_empty_input_never_calls_gateway() {
    let stub = Stub::ok("{\"should\": \"not be used\"}");
    let service = AdvisoryService::new(stub.clone());
    let advised = service.predictive_analytics(&[]).await;

    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    assert_eq!(advised.value.revenue_forecast.next_90_days, 0.0);
    assert_eq!(advised.value.revenue_forecast.confidence, 0);
    assert!(advised.value.deal_probabilities.is_empty());
}

#[tokio::test]
async fn predictive_fallback_multipliers() {
    let service = unconfigured_service();
    let customers = CrmStore::with_demo_data().list_customers();
    let advised = service.predictive_analytics(&customers).await;

    let forecast = &advised.value.revenue_forecast;
    let total = 450_000.0;
    assert_eq!(forecast.next_30_days, total * 1.05);
    assert_eq!(forecast.next_60_days, total * 1.12);
    assert_eq!(forecast.next_90_days, total * 1.20);
    assert_eq!(forecast.confidence, 70);

    for deal in &advised.value.deal_probabilities {
        assert_eq!(deal.probability, 65);
        assert!(deal.expected_value > 0.0);
    }
}

#[tokio::test]
async fn all_numeric_bounds_hold_on_hostile_model_output() {
    // Model returns wildly out-of-range numbers; everything must clamp.
    let stub = Stub::ok(
        r#"{"sentimentScore": -12, "sentimentLabel": "negative", "churnRisk": 9000,
            "healthScore": -5, "nextBestActions": ["Escalate"], "keyInsights": ["At risk"],
            "predictedValue": 1000}"#,
    );
    let service = AdvisoryService::new(stub);
    let customer = &CrmStore::with_demo_data().list_customers()[0];
    let advised = service.analyze_customer(customer).await;

    assert_eq!(advised.origin, Origin::Model);
    assert_eq!(advised.value.sentiment_score, -1.0);
    assert_eq!(advised.value.churn_risk, 100);
    assert_eq!(advised.value.health_score, 0);
}

#[tokio::test]
async fn malformed_json_degrades_to_fallback() {
    let stub = Stub::ok("Sorry, I can't help with that.");
    let service = AdvisoryService::new(stub);
    let customer = &CrmStore::with_demo_data().list_customers()[0];
    let advised = service.analyze_customer(customer).await;

    assert!(advised.is_fallback());
    assert_eq!(advised.value.churn_risk, 20);
    assert_eq!(advised.value.health_score, 75);
}

#[tokio::test]
async fn email_fallback_is_templated_from_inputs() {
    let service = unconfigured_service();
    let request = EmailRequest {
        recipient_name: "Dana".into(),
        purpose: "the onboarding plan".into(),
        tone: "friendly".into(),
        key_points: vec![],
    };
    let advised = service.generate_email(&request).await;

    assert!(advised.is_fallback());
    assert!(advised.value.subject.contains("Dana"));
    assert!(advised.value.body.contains("the onboarding plan"));
    assert!(!advised.value.improvements.is_empty());
}

#[tokio::test]
async fn dashboard_fallback_sorted_descending() {
    let service = unconfigured_service();
    let store = CrmStore::with_demo_data();
    let advised = service
        .dashboard_insights(&store.list_customers(), &store.list_tasks(), 450_000.0)
        .await;

    assert!(advised.is_fallback());
    let priorities: Vec<u8> = advised.value.iter().map(|i| i.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
    for insight in &advised.value {
        assert!((1..=10).contains(&insight.priority));
    }
}

#[tokio::test]
async fn meeting_notes_blank_input_is_no_op() {
    let stub = Stub::ok("{}");
    let service = AdvisoryService::new(stub.clone());
    let advised = service.analyze_meeting_notes("   ").await;

    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    assert!(advised.is_fallback());
    assert!(!advised.value.summary.is_empty());
    assert!(advised.value.action_items.is_empty());
}

#[tokio::test]
async fn stubbed_responses_are_deterministic() {
    let response = r#"[
        {"taskId": "1", "priorityScore": 88, "urgencyReason": "Renewal at risk",
         "suggestedTime": "Tomorrow morning", "estimatedImpact": "high"}
    ]"#;
    let tasks = CrmStore::with_demo_data().list_tasks();

    let first = AdvisoryService::new(Stub::ok(response))
        .prioritize_tasks(&tasks[..1])
        .await;
    let second = AdvisoryService::new(Stub::ok(response))
        .prioritize_tasks(&tasks[..1])
        .await;

    assert_eq!(
        serde_json::to_string(&first.value).expect("serialize"),
        serde_json::to_string(&second.value).expect("serialize"),
    );
    assert_eq!(first.value[0].priority_score, 88);
}

#[tokio::test]
async fn discarded_future_is_harmless() {
    // A caller may abandon interest in a pending result; dropping the
    // future must not panic or poison shared state.
    let service = unconfigured_service();
    let customer = CrmStore::with_demo_data().list_customers()[0].clone();
    {
        let fut = service.analyze_customer(&customer);
        drop(fut);
    }
    let advised = service.analyze_customer(&customer).await;
    assert!(advised.is_fallback());
}
