//! Prompt construction for each advisory function.
//!
//! Every user prompt formats the input entities into labeled lines and ends
//! with an explicit JSON schema request, because the parser on the other
//! side expects ONLY a JSON payload (optionally fenced). System prompts set
//! the persona; completion parameters are tuned per function — scoring runs
//! cold with a tiny budget, generative functions run warmer with room to
//! write.

use crate::advisory::types::{EmailRequest, LeadProfile};
use crate::gateway::CompletionParams;
use crate::types::{Customer, CustomerStatus, Task, TaskStatus};

pub(crate) const LEAD_SCORE_PARAMS: CompletionParams = CompletionParams::new(0.3, 10);
pub(crate) const GENERATIVE_PARAMS: CompletionParams = CompletionParams::new(0.7, 2000);
pub(crate) const CHAT_PARAMS: CompletionParams = CompletionParams::new(0.7, 1024);

pub(crate) const LEAD_SCORE_SYSTEM: &str =
    "You are an expert CRM analyst. You score leads on conversion likelihood using \
     engagement and firmographic signals.";

pub(crate) const CUSTOMER_ANALYSIS_SYSTEM: &str =
    "You are an expert CRM analyst specializing in customer intelligence, churn \
     prediction, and revenue optimization. Provide data-driven insights based on \
     customer behavior patterns.";

pub(crate) const EMAIL_SYSTEM: &str =
    "You are an expert email copywriter specializing in business communication. \
     Create persuasive, personalized emails that drive engagement and action.";

pub(crate) const PREDICTIVE_SYSTEM: &str =
    "You are a data scientist specializing in revenue forecasting and predictive \
     analytics for CRM systems. Use statistical patterns and business intelligence.";

pub(crate) const TASK_PRIORITY_SYSTEM: &str =
    "You are a productivity expert specializing in task prioritization and time \
     management. Consider urgency, importance, and business impact.";

pub(crate) const DASHBOARD_SYSTEM: &str =
    "You are a business intelligence analyst specializing in CRM insights. Identify \
     patterns, anomalies, and opportunities that drive business growth.";

pub(crate) const MEETING_SYSTEM: &str =
    "You are an executive assistant specializing in meeting analysis and action \
     item extraction.";

pub(crate) fn chat_system(context: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are a helpful CRM assistant. You help users manage their customer \
         relationships, analyze data, and provide insights.",
    );
    if let Some(ctx) = context {
        prompt.push_str(" Context: ");
        prompt.push_str(ctx);
    }
    prompt
}

pub(crate) fn lead_score_prompt(lead: &LeadProfile) -> String {
    format!(
        "Based on the following lead data, provide a lead score from 0-100:\n\n\
         Name: {}\n\
         Email: {}\n\
         Company: {}\n\
         Industry: {}\n\
         Interactions: {}\n\n\
         Respond with ONLY a number between 0-100.",
        lead.name,
        lead.email,
        lead.company.as_deref().unwrap_or("N/A"),
        lead.industry.as_deref().unwrap_or("N/A"),
        lead.interactions
    )
}

pub(crate) fn customer_analysis_prompt(customer: &Customer) -> String {
    format!(
        "Analyze this customer data and provide insights:\n\n\
         Customer: {}\n\
         Email: {}\n\
         Status: {}\n\
         Revenue: ${:.0}\n\
         Company: {}\n\
         Interactions: {}\n\
         Last Contact: {}\n\n\
         Provide a JSON response with:\n\
         1. sentimentScore (-1 to 1): Based on status, engagement, and revenue\n\
         2. sentimentLabel: positive/neutral/negative\n\
         3. churnRisk (0-100): Likelihood of losing this customer\n\
         4. healthScore (0-100): Overall customer health\n\
         5. nextBestActions: Array of 3-4 specific actionable recommendations\n\
         6. keyInsights: Array of 2-3 important observations\n\
         7. predictedValue: Expected revenue in next 90 days\n\n\
         Return ONLY valid JSON, no markdown or explanation.",
        customer.name,
        customer.email,
        status_label(customer.status),
        customer.value,
        if customer.company.is_empty() {
            "N/A"
        } else {
            customer.company.as_str()
        },
        customer.interactions,
        customer.last_contact.format("%Y-%m-%d"),
    )
}

pub(crate) fn email_prompt(request: &EmailRequest) -> String {
    let key_points = if request.key_points.is_empty() {
        String::new()
    } else {
        format!("Key Points: {}\n", request.key_points.join(", "))
    };
    format!(
        "Generate a professional email with these details:\n\n\
         Recipient: {}\n\
         Purpose: {}\n\
         Desired Tone: {}\n\
         {}\n\
         Provide a JSON response with:\n\
         1. subject: Compelling email subject line\n\
         2. body: Complete email body (3-4 paragraphs)\n\
         3. tone: The actual tone used\n\
         4. sentiment: Overall sentiment analysis\n\
         5. improvements: 2-3 suggestions to enhance the email\n\n\
         Return ONLY valid JSON, no markdown.",
        request.recipient_name, request.purpose, request.tone, key_points
    )
}

pub(crate) fn predictive_prompt(customers: &[Customer]) -> String {
    let total_revenue: f64 = customers.iter().map(|c| c.value).sum();
    let active = customers
        .iter()
        .filter(|c| c.status == CustomerStatus::Active)
        .count();
    let top_customers = customers
        .iter()
        .take(5)
        .map(|c| format!("- {}: ${:.0}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this CRM data and provide predictive analytics:\n\n\
         Total Customers: {}\n\
         Active Customers: {}\n\
         Total Revenue: ${:.0}\n\
         Average Customer Value: ${:.2}\n\n\
         Top Customers:\n{}\n\n\
         Provide JSON with:\n\
         1. revenueForecast: {{next30Days, next60Days, next90Days, confidence (0-100)}}\n\
         2. dealProbabilities: Array of top 5 opportunities with {{customerId, \
         customerName, probability (0-100), expectedValue, timeline}}\n\
         3. trendAnalysis: {{direction (up/down/stable), growthRate (percentage), \
         insights (array of 3-4 key findings)}}\n\n\
         Return ONLY valid JSON.",
        customers.len(),
        active,
        total_revenue,
        total_revenue / customers.len() as f64,
        top_customers
    )
}

pub(crate) fn task_priority_prompt(tasks: &[Task]) -> String {
    let task_lines = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. [{}] {} (Status: {}, Priority: {:?})",
                i + 1,
                t.id,
                t.title,
                task_status_label(t.status),
                t.priority
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these tasks and prioritize them:\n\n{}\n\n\
         For each task, provide JSON array with:\n\
         - taskId: The task ID shown in brackets\n\
         - priorityScore: 0-100 (higher = more urgent)\n\
         - urgencyReason: Why this priority score\n\
         - suggestedTime: Best time to complete\n\
         - estimatedImpact: high/medium/low\n\n\
         Return ONLY valid JSON array.",
        task_lines
    )
}

pub(crate) fn dashboard_prompt(customers: &[Customer], tasks: &[Task], revenue: f64) -> String {
    let active = customers
        .iter()
        .filter(|c| c.status == CustomerStatus::Active)
        .count();
    let leads = customers
        .iter()
        .filter(|c| c.status == CustomerStatus::Lead)
        .count();
    let pending = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .count();

    format!(
        "Analyze this CRM dashboard data and provide actionable insights:\n\n\
         Total Customers: {}\n\
         Active: {}\n\
         Leads: {}\n\
         Total Revenue: ${:.0}\n\
         Pending Tasks: {}\n\n\
         Generate 5-7 insights as JSON array with:\n\
         - type: warning/success/info/alert\n\
         - title: Short headline\n\
         - description: Detailed insight\n\
         - action: Suggested action (optional)\n\
         - priority: 1-10 (higher = more important)\n\n\
         Focus on: opportunities, risks, trends, and actionable recommendations.\n\n\
         Return ONLY valid JSON array.",
        customers.len(),
        active,
        leads,
        revenue,
        pending
    )
}

pub(crate) fn meeting_notes_prompt(notes: &str) -> String {
    format!(
        "Analyze these meeting notes and extract key information:\n\n{}\n\n\
         Provide JSON with:\n\
         - summary: 2-3 sentence overview\n\
         - actionItems: Array of specific action items\n\
         - keyDecisions: Array of important decisions made\n\
         - followUps: Array of follow-up items needed\n\n\
         Return ONLY valid JSON.",
        notes
    )
}

fn status_label(status: CustomerStatus) -> &'static str {
    match status {
        CustomerStatus::Active => "active",
        CustomerStatus::Lead => "lead",
        CustomerStatus::Inactive => "inactive",
    }
}

fn task_status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in-progress",
        TaskStatus::Completed => "completed",
    }
}
