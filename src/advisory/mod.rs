//! Advisory functions — the model-backed intelligence layer.
//!
//! Each operation builds a prompt from its input entities, invokes the
//! gateway with a function-specific persona, parses the response into a
//! typed result, and substitutes a deterministic fallback on any failure.
//! Errors never propagate to the caller; the only visible signal is
//! [`Origin`] on the returned [`Advised`] wrapper. Root causes are logged
//! for diagnostics.
//!
//! The service is `Send + Sync` and shares nothing mutable between calls,
//! so callers may fire several advisory calls concurrently and abandon
//! pending ones freely.

mod fallback;
mod parse;
mod prompts;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::error::AdvisoryError;
use crate::gateway::{ChatModel, CompletionParams};
use crate::types::{Customer, Task};

pub use types::{
    Advised, CustomerInsight, DashboardInsight, DealProbability, EmailRequest, EmailSuggestion,
    ImpactLevel, InsightKind, LeadProfile, MeetingAnalysis, Origin, PredictiveAnalytics,
    RevenueForecast, SentimentLabel, TaskAdvice, TrendAnalysis, TrendDirection,
};

/// Total attempts per gateway call (1 initial + 1 bounded retry).
const MAX_ATTEMPTS: u32 = 2;

/// Pause before the retry attempt.
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// The advisory service. Cheap to clone; share one per application.
#[derive(Clone)]
pub struct AdvisoryService {
    model: Arc<dyn ChatModel>,
}

impl AdvisoryService {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        AdvisoryService { model }
    }

    /// One completion with a single bounded retry on retryable failures.
    async fn completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: CompletionParams,
    ) -> Result<String, AdvisoryError> {
        let mut attempt = 1;
        loop {
            match self.model.complete(system_prompt, user_prompt, params).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    log::debug!("model call failed (attempt {attempt}), retrying: {e}");
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Score a lead 0–100 on conversion likelihood.
    pub async fn score_lead(&self, lead: &LeadProfile) -> Advised<u8> {
        let prompt = prompts::lead_score_prompt(lead);
        let result = self
            .completion(prompts::LEAD_SCORE_SYSTEM, &prompt, prompts::LEAD_SCORE_PARAMS)
            .await
            .and_then(|response| parse::parse_lead_score(&response));
        match result {
            Ok(score) => Advised::model(score),
            Err(e) => {
                log::warn!("lead scoring degraded to heuristic: {e}");
                Advised::fallback(fallback::lead_score(lead))
            }
        }
    }

    /// Full customer analysis: sentiment, churn risk, health, next actions.
    pub async fn analyze_customer(&self, customer: &Customer) -> Advised<CustomerInsight> {
        let prompt = prompts::customer_analysis_prompt(customer);
        let result = self
            .completion(
                prompts::CUSTOMER_ANALYSIS_SYSTEM,
                &prompt,
                prompts::GENERATIVE_PARAMS,
            )
            .await
            .and_then(|response| parse::parse_customer_insight(&response, customer));
        match result {
            Ok(insight) => Advised::model(insight),
            Err(e) => {
                log::warn!(
                    "customer analysis for '{}' degraded to fallback: {e}",
                    customer.name
                );
                Advised::fallback(fallback::customer_insight(customer))
            }
        }
    }

    /// Analyze the top `n` customers by value, concurrently.
    ///
    /// Results come back in descending-value order, one per analyzed
    /// customer; a failure for one customer degrades only that entry.
    pub async fn analyze_top_customers(
        &self,
        customers: &[Customer],
        n: usize,
    ) -> Vec<Advised<CustomerInsight>> {
        let mut top: Vec<&Customer> = customers.iter().collect();
        top.sort_by(|a, b| b.value.total_cmp(&a.value));
        top.truncate(n);

        join_all(top.into_iter().map(|c| self.analyze_customer(c))).await
    }

    /// Draft an email for the given recipient, purpose, and tone.
    pub async fn generate_email(&self, request: &EmailRequest) -> Advised<EmailSuggestion> {
        let prompt = prompts::email_prompt(request);
        let result = self
            .completion(prompts::EMAIL_SYSTEM, &prompt, prompts::GENERATIVE_PARAMS)
            .await
            .and_then(|response| parse::parse_email(&response, request));
        match result {
            Ok(email) => Advised::model(email),
            Err(e) => {
                log::warn!("email generation degraded to template: {e}");
                Advised::fallback(fallback::email(request))
            }
        }
    }

    /// Revenue forecast, deal probabilities, and trend analysis for the
    /// whole pipeline. An empty customer list returns a zeroed result
    /// without touching the gateway.
    pub async fn predictive_analytics(
        &self,
        customers: &[Customer],
    ) -> Advised<PredictiveAnalytics> {
        if customers.is_empty() {
            return Advised::fallback(fallback::empty_predictive());
        }
        let prompt = prompts::predictive_prompt(customers);
        let result = self
            .completion(prompts::PREDICTIVE_SYSTEM, &prompt, prompts::GENERATIVE_PARAMS)
            .await
            .and_then(|response| parse::parse_predictive(&response, customers));
        match result {
            Ok(analytics) => Advised::model(analytics),
            Err(e) => {
                log::warn!("predictive analytics degraded to fallback: {e}");
                Advised::fallback(fallback::predictive(customers))
            }
        }
    }

    /// Per-task priority advice, one entry per input task in input order.
    /// An empty task list is a no-op.
    pub async fn prioritize_tasks(&self, tasks: &[Task]) -> Advised<Vec<TaskAdvice>> {
        if tasks.is_empty() {
            return Advised::fallback(Vec::new());
        }
        let prompt = prompts::task_priority_prompt(tasks);
        let result = self
            .completion(
                prompts::TASK_PRIORITY_SYSTEM,
                &prompt,
                prompts::GENERATIVE_PARAMS,
            )
            .await
            .and_then(|response| parse::parse_task_advice(&response, tasks));
        match result {
            Ok(advice) => Advised::model(advice),
            Err(e) => {
                log::warn!("task prioritization degraded to priority mapping: {e}");
                Advised::fallback(tasks.iter().map(fallback::task_advice).collect())
            }
        }
    }

    /// Actionable dashboard observations, sorted by priority descending
    /// (stable on ties).
    pub async fn dashboard_insights(
        &self,
        customers: &[Customer],
        tasks: &[Task],
        revenue: f64,
    ) -> Advised<Vec<DashboardInsight>> {
        if customers.is_empty() && tasks.is_empty() {
            return Advised::fallback(Vec::new());
        }
        let prompt = prompts::dashboard_prompt(customers, tasks, revenue);
        let result = self
            .completion(prompts::DASHBOARD_SYSTEM, &prompt, prompts::GENERATIVE_PARAMS)
            .await
            .and_then(|response| parse::parse_dashboard_insights(&response));
        let mut advised = match result {
            Ok(insights) => Advised::model(insights),
            Err(e) => {
                log::warn!("dashboard insights degraded to canned set: {e}");
                Advised::fallback(fallback::dashboard_insights(customers, tasks))
            }
        };
        advised.value.sort_by(|a, b| b.priority.cmp(&a.priority));
        advised
    }

    /// Extract summary, action items, decisions, and follow-ups from
    /// free-text meeting notes. Blank notes are a no-op.
    pub async fn analyze_meeting_notes(&self, notes: &str) -> Advised<MeetingAnalysis> {
        if notes.trim().is_empty() {
            return Advised::fallback(fallback::meeting_analysis());
        }
        let prompt = prompts::meeting_notes_prompt(notes);
        let result = self
            .completion(prompts::MEETING_SYSTEM, &prompt, prompts::GENERATIVE_PARAMS)
            .await
            .and_then(|response| parse::parse_meeting_analysis(&response));
        match result {
            Ok(analysis) => Advised::model(analysis),
            Err(e) => {
                log::warn!("meeting analysis degraded to fallback: {e}");
                Advised::fallback(fallback::meeting_analysis())
            }
        }
    }

    /// Free-form CRM assistant chat. No JSON contract — the raw completion
    /// is the answer, and failures map to fixed assistant replies.
    pub async fn chat(&self, message: &str, context: Option<&str>) -> String {
        let system = prompts::chat_system(context);
        match self
            .completion(&system, message, prompts::CHAT_PARAMS)
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => fallback::CHAT_UNAVAILABLE.to_string(),
            Err(AdvisoryError::Configuration) => fallback::CHAT_UNCONFIGURED.to_string(),
            Err(e) => {
                log::warn!("chat completion failed: {e}");
                fallback::CHAT_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CrmStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Stub model returning a fixed response (or error) and counting calls.
    struct StubModel {
        response: Result<String, fn() -> AdvisoryError>,
        calls: AtomicU32,
    }

    impl StubModel {
        fn ok(response: &str) -> Self {
            StubModel {
                response: Ok(response.to_string()),
                calls: AtomicU32::new(0),
            }
        }

        fn failing(make: fn() -> AdvisoryError) -> Self {
            StubModel {
                response: Err(make),
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for StubModel {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _params: CompletionParams,
        ) -> Result<String, AdvisoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn service_with(model: StubModel) -> (AdvisoryService, Arc<StubModel>) {
        let model = Arc::new(model);
        (AdvisoryService::new(model.clone()), model)
    }

    #[tokio::test]
    async fn score_lead_parses_model_response() {
        let (service, _) = service_with(StubModel::ok("87"));
        let lead = LeadProfile {
            name: "A".into(),
            email: "a@a.com".into(),
            company: None,
            industry: None,
            interactions: 0,
        };
        let advised = service.score_lead(&lead).await;
        assert_eq!(advised.value, 87);
        assert_eq!(advised.origin, Origin::Model);
    }

    #[tokio::test]
    async fn score_lead_unconfigured_uses_heuristic() {
        let (service, model) =
            service_with(StubModel::failing(|| AdvisoryError::Configuration));
        let lead = LeadProfile {
            name: "A".into(),
            email: "a@a.com".into(),
            company: Some("X".into()),
            industry: Some("Y".into()),
            interactions: 20,
        };
        let advised = service.score_lead(&lead).await;
        assert_eq!(advised.value, 100);
        assert_eq!(advised.origin, Origin::Fallback);
        // Configuration errors are not retryable
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn retryable_failure_is_retried_once() {
        let (service, model) = service_with(StubModel::failing(|| AdvisoryError::Timeout(30)));
        let advised = service.analyze_meeting_notes("Discussed renewal.").await;
        assert!(advised.is_fallback());
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_customer_list_skips_gateway() {
        let (service, model) = service_with(StubModel::ok("{}"));
        let advised = service.predictive_analytics(&[]).await;
        assert_eq!(model.call_count(), 0);
        assert!(advised.is_fallback());
        assert_eq!(advised.value.revenue_forecast.next_30_days, 0.0);
        assert!(advised.value.deal_probabilities.is_empty());
    }

    #[tokio::test]
    async fn empty_task_list_skips_gateway() {
        let (service, model) = service_with(StubModel::ok("[]"));
        let advised = service.prioritize_tasks(&[]).await;
        assert_eq!(model.call_count(), 0);
        assert!(advised.value.is_empty());
    }

    #[tokio::test]
    async fn prioritize_tasks_fallback_mapping() {
        let (service, _) = service_with(StubModel::failing(|| AdvisoryError::Configuration));
        let tasks = CrmStore::with_demo_data().list_tasks();
        let advised = service.prioritize_tasks(&tasks).await;
        assert!(advised.is_fallback());
        assert_eq!(advised.value.len(), 3);
        assert_eq!(advised.value[0].task_id, "1");
        assert_eq!(advised.value[0].priority_score, 90);
        assert_eq!(advised.value[0].estimated_impact, ImpactLevel::High);
    }

    #[tokio::test]
    async fn dashboard_insights_sorted_descending_stable() {
        let response = r#"[
            {"type": "info", "title": "B", "description": "", "priority": 5},
            {"type": "alert", "title": "A", "description": "", "priority": 9},
            {"type": "info", "title": "C", "description": "", "priority": 5}
        ]"#;
        let (service, _) = service_with(StubModel::ok(response));
        let store = CrmStore::with_demo_data();
        let advised = service
            .dashboard_insights(&store.list_customers(), &store.list_tasks(), 450_000.0)
            .await;
        assert_eq!(advised.origin, Origin::Model);
        let titles: Vec<&str> = advised.value.iter().map(|i| i.title.as_str()).collect();
        // Descending by priority; B before C preserved on the tie
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn identical_input_identical_output() {
        let response = r#"{"sentimentScore": 0.4, "churnRisk": 35, "healthScore": 80,
            "nextBestActions": ["Call"], "keyInsights": ["Stable"], "predictedValue": 100000}"#;
        let (service, _) = service_with(StubModel::ok(response));
        let customer = &CrmStore::with_demo_data().list_customers()[0];

        let first = service.analyze_customer(customer).await;
        let second = service.analyze_customer(customer).await;
        assert_eq!(
            serde_json::to_string(&first.value).expect("serialize"),
            serde_json::to_string(&second.value).expect("serialize"),
        );
    }

    #[tokio::test]
    async fn analyze_top_customers_orders_by_value() {
        let (service, model) = service_with(StubModel::failing(|| AdvisoryError::Configuration));
        let customers = CrmStore::with_demo_data().list_customers();
        let results = service.analyze_top_customers(&customers, 2).await;
        assert_eq!(results.len(), 2);
        // Michael Chen ($200k) then John Smith ($125k)
        assert_eq!(results[0].value.customer_id, "3");
        assert_eq!(results[1].value.customer_id, "1");
        assert!(results.iter().all(|r| r.is_fallback()));
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn chat_distinguishes_unconfigured_from_unavailable() {
        let (service, _) = service_with(StubModel::failing(|| AdvisoryError::Configuration));
        let reply = service.chat("hello", None).await;
        assert!(reply.contains("not configured"));

        let (service, _) = service_with(StubModel::failing(|| AdvisoryError::upstream("down")));
        let reply = service.chat("hello", Some("Viewing dashboard")).await;
        assert!(reply.contains("trouble connecting"));

        let (service, _) = service_with(StubModel::ok("Here are your top leads."));
        let reply = service.chat("who are my top leads?", None).await;
        assert_eq!(reply, "Here are your top leads.");
    }

    #[tokio::test]
    async fn fenced_response_handled_end_to_end() {
        let response = "```json\n{\"subject\": \"Q1 renewal\", \"body\": \"Hi John, ...\"}\n```";
        let (service, _) = service_with(StubModel::ok(response));
        let request = EmailRequest {
            recipient_name: "John".into(),
            purpose: "renewal".into(),
            tone: "friendly".into(),
            key_points: vec![],
        };
        let advised = service.generate_email(&request).await;
        assert_eq!(advised.origin, Origin::Model);
        assert_eq!(advised.value.subject, "Q1 renewal");
        // Field-level defaults kick in for what the model omitted
        assert_eq!(advised.value.tone, "friendly");
    }
}
