//! Demo driver: seeds the store, runs every advisory function against it,
//! and prints the results as JSON. Without `GROQ_API_KEY` set, everything
//! returns its deterministic fallback — useful for eyeballing the degraded
//! experience.

use std::sync::Arc;

use acumen::advisory::{AdvisoryService, EmailRequest, LeadProfile};
use acumen::{CrmStore, GroqGateway};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let gateway = GroqGateway::from_env();
    if !gateway.config().is_configured() {
        log::warn!("GROQ_API_KEY not set; advisory functions will use fallbacks");
    }

    let store = CrmStore::with_demo_data();
    let service = AdvisoryService::new(Arc::new(gateway));

    let customers = store.list_customers();
    let tasks = store.list_tasks();
    let stats = store.dashboard_stats();

    let lead = LeadProfile {
        name: "Sarah Johnson".into(),
        email: "sarah.j@techstart.io".into(),
        company: Some("TechStart".into()),
        industry: Some("SaaS".into()),
        interactions: 12,
    };
    let score = service.score_lead(&lead).await;
    println!("lead score ({:?}): {}", score.origin, score.value);

    let insight = service.analyze_customer(&customers[0]).await;
    print_json("customer insight", &insight);

    let email = service
        .generate_email(&EmailRequest {
            recipient_name: "John Smith".into(),
            purpose: "the Q1 renewal".into(),
            tone: "professional".into(),
            key_points: vec!["renewal date".into(), "upsell options".into()],
        })
        .await;
    print_json("email draft", &email);

    let analytics = service.predictive_analytics(&customers).await;
    print_json("predictive analytics", &analytics);

    let advice = service.prioritize_tasks(&tasks).await;
    print_json("task priorities", &advice);

    let insights = service
        .dashboard_insights(&customers, &tasks, stats.total_revenue)
        .await;
    print_json("dashboard insights", &insights);

    let meeting = service
        .analyze_meeting_notes(
            "Met with Acme. Agreed to renew for 12 months. \
             Need to send updated pricing by Friday.",
        )
        .await;
    print_json("meeting analysis", &meeting);
}

fn print_json<T: serde::Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("--- {label} ---\n{json}"),
        Err(e) => log::error!("failed to serialize {label}: {e}"),
    }
}
