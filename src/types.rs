//! Core CRM entity types shared by the store and the advisory layer.
//!
//! Advisory functions read these records and never mutate them; any update
//! derived from an advisory result (e.g. attaching a lead score) goes back
//! through the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Lead,
    Inactive,
}

/// A customer record owned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    pub status: CustomerStatus,
    /// Annual contract value in dollars.
    pub value: f64,
    pub last_contact: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Total touchpoints recorded for this customer.
    #[serde(default)]
    pub interactions: u32,
}

impl Customer {
    /// New lead with a generated id and no engagement history.
    pub fn new_lead(name: &str, email: &str) -> Self {
        Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            company: String::new(),
            phone: String::new(),
            status: CustomerStatus::Lead,
            value: 0.0,
            last_contact: Utc::now(),
            lead_score: None,
            industry: None,
            interactions: 0,
        }
    }
}

/// Task priority as set by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Task completion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// A task record owned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Derived dashboard statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: usize,
    pub active_leads: usize,
    pub total_revenue: f64,
    pub tasks_completed: usize,
}
