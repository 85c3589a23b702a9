//! In-memory CRM entity store.
//!
//! An explicitly constructed state container owned by the application's
//! composition root — advisory functions never read it as ambient global
//! state; callers pass entity snapshots in and apply any resulting updates
//! back through the store. Supports an optional JSON snapshot on disk so a
//! desktop shell can persist between sessions.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::{Customer, CustomerStatus, DashboardStats, Task, TaskPriority, TaskStatus};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    customers: Vec<Customer>,
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Flat CRUD store over customers and tasks.
#[derive(Debug, Default)]
pub struct CrmStore {
    inner: RwLock<Snapshot>,
}

impl CrmStore {
    /// Empty store.
    pub fn new() -> Self {
        CrmStore::default()
    }

    /// Store pre-seeded with the demo dataset (first-run UX).
    pub fn with_demo_data() -> Self {
        let store = CrmStore::new();
        {
            let mut inner = store.inner.write();
            inner.customers = demo_customers();
            inner.tasks = demo_tasks();
        }
        store
    }

    // --- Customers ---

    pub fn list_customers(&self) -> Vec<Customer> {
        self.inner.read().customers.clone()
    }

    pub fn get_customer(&self, id: &str) -> Option<Customer> {
        self.inner.read().customers.iter().find(|c| c.id == id).cloned()
    }

    pub fn add_customer(&self, customer: Customer) {
        self.inner.write().customers.push(customer);
    }

    /// Apply a partial update to one customer. Returns false if the id is
    /// unknown.
    pub fn update_customer(&self, id: &str, f: impl FnOnce(&mut Customer)) -> bool {
        let mut inner = self.inner.write();
        match inner.customers.iter_mut().find(|c| c.id == id) {
            Some(customer) => {
                f(customer);
                true
            }
            None => false,
        }
    }

    pub fn delete_customer(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        let before = inner.customers.len();
        inner.customers.retain(|c| c.id != id);
        inner.customers.len() < before
    }

    // --- Tasks ---

    pub fn list_tasks(&self) -> Vec<Task> {
        self.inner.read().tasks.clone()
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.inner.read().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn add_task(&self, task: Task) {
        self.inner.write().tasks.push(task);
    }

    pub fn update_task(&self, id: &str, f: impl FnOnce(&mut Task)) -> bool {
        let mut inner = self.inner.write();
        match inner.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        }
    }

    pub fn delete_task(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        inner.tasks.len() < before
    }

    // --- Derived stats ---

    pub fn dashboard_stats(&self) -> DashboardStats {
        let inner = self.inner.read();
        DashboardStats {
            total_customers: inner.customers.len(),
            active_leads: inner
                .customers
                .iter()
                .filter(|c| c.status == CustomerStatus::Lead)
                .count(),
            total_revenue: inner.customers.iter().map(|c| c.value).sum(),
            tasks_completed: inner
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count(),
        }
    }

    // --- Persistence ---

    /// Load a snapshot from disk, replacing current contents.
    pub fn load_snapshot(&self, path: &Path) -> Result<(), String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
        *self.inner.write() = snapshot;
        Ok(())
    }

    /// Write the current contents to disk atomically (temp file + rename).
    pub fn save_snapshot(&self, path: &Path) -> Result<(), String> {
        let content = {
            let inner = self.inner.read();
            serde_json::to_string_pretty(&*inner).map_err(|e| format!("Serialize error: {e}"))?
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| format!("Failed to replace {}: {}", path.display(), e))?;
        Ok(())
    }
}

fn date(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn demo_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "1".into(),
            name: "John Smith".into(),
            email: "john.smith@acme.com".into(),
            company: "Acme Corp".into(),
            phone: "+1 (555) 123-4567".into(),
            status: CustomerStatus::Active,
            value: 125_000.0,
            last_contact: date("2024-12-28T00:00:00Z"),
            lead_score: Some(85),
            industry: Some("Technology".into()),
            interactions: 24,
        },
        Customer {
            id: "2".into(),
            name: "Sarah Johnson".into(),
            email: "sarah.j@techstart.io".into(),
            company: "TechStart".into(),
            phone: "+1 (555) 234-5678".into(),
            status: CustomerStatus::Lead,
            value: 75_000.0,
            last_contact: date("2024-12-30T00:00:00Z"),
            lead_score: Some(72),
            industry: Some("SaaS".into()),
            interactions: 12,
        },
        Customer {
            id: "3".into(),
            name: "Michael Chen".into(),
            email: "m.chen@globalinc.com".into(),
            company: "Global Inc".into(),
            phone: "+1 (555) 345-6789".into(),
            status: CustomerStatus::Active,
            value: 200_000.0,
            last_contact: date("2024-12-29T00:00:00Z"),
            lead_score: Some(92),
            industry: Some("Finance".into()),
            interactions: 38,
        },
        Customer {
            id: "4".into(),
            name: "Emily Rodriguez".into(),
            email: "emily.r@innovate.com".into(),
            company: "Innovate Labs".into(),
            phone: "+1 (555) 456-7890".into(),
            status: CustomerStatus::Lead,
            value: 50_000.0,
            last_contact: date("2024-12-27T00:00:00Z"),
            lead_score: Some(65),
            industry: Some("Healthcare".into()),
            interactions: 8,
        },
    ]
}

fn demo_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "1".into(),
            title: "Follow up with John Smith".into(),
            description: "Discuss Q1 renewal and upsell opportunities".into(),
            due_date: date("2025-01-02T00:00:00Z"),
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            assigned_to: "You".into(),
            customer_id: Some("1".into()),
        },
        Task {
            id: "2".into(),
            title: "Prepare proposal for TechStart".into(),
            description: "Create customized proposal for enterprise plan".into(),
            due_date: date("2025-01-05T00:00:00Z"),
            priority: TaskPriority::High,
            status: TaskStatus::InProgress,
            assigned_to: "You".into(),
            customer_id: Some("2".into()),
        },
        Task {
            id: "3".into(),
            title: "Schedule demo with Emily".into(),
            description: "Product demo for healthcare compliance features".into(),
            due_date: date("2025-01-03T00:00:00Z"),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            assigned_to: "You".into(),
            customer_id: Some("4".into()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_stats() {
        let store = CrmStore::with_demo_data();
        let stats = store.dashboard_stats();
        assert_eq!(stats.total_customers, 4);
        assert_eq!(stats.active_leads, 2);
        assert_eq!(stats.total_revenue, 450_000.0);
        assert_eq!(stats.tasks_completed, 0);
    }

    #[test]
    fn customer_crud() {
        let store = CrmStore::new();
        let customer = Customer::new_lead("New Lead", "lead@example.com");
        let id = customer.id.clone();
        store.add_customer(customer);

        assert!(store.update_customer(&id, |c| {
            c.lead_score = Some(77);
            c.status = CustomerStatus::Active;
        }));
        let updated = store.get_customer(&id).expect("exists");
        assert_eq!(updated.lead_score, Some(77));
        assert_eq!(updated.status, CustomerStatus::Active);

        assert!(store.delete_customer(&id));
        assert!(store.get_customer(&id).is_none());
        assert!(!store.delete_customer(&id));
    }

    #[test]
    fn task_update_unknown_id() {
        let store = CrmStore::with_demo_data();
        assert!(!store.update_task("no-such-task", |t| t.status = TaskStatus::Completed));
        assert!(store.update_task("1", |t| t.status = TaskStatus::Completed));
        assert_eq!(store.dashboard_stats().tasks_completed, 1);
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store/crm.json");

        let store = CrmStore::with_demo_data();
        store.update_customer("1", |c| c.lead_score = Some(99));
        store.save_snapshot(&path).expect("save");

        let restored = CrmStore::new();
        restored.load_snapshot(&path).expect("load");
        assert_eq!(restored.list_customers().len(), 4);
        assert_eq!(
            restored.get_customer("1").expect("exists").lead_score,
            Some(99)
        );
        assert_eq!(restored.list_tasks().len(), 3);
    }

    #[test]
    fn snapshot_missing_file_errors() {
        let store = CrmStore::new();
        let err = store
            .load_snapshot(Path::new("/nonexistent/crm.json"))
            .expect_err("should fail");
        assert!(err.contains("Failed to read"));
    }
}
