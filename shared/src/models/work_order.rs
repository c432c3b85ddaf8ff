//! Work order models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named grouping of rolls to be consumed for one customer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: Uuid,
    pub customer_name: String,
    /// Order identifier assigned by the customer, unique per work order.
    pub parent_pid: String,
    pub created_at: DateTime<Utc>,
    pub child_pids: Vec<ChildPid>,
}

/// One line of a work order: a child production id bound to exactly one roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPid {
    pub pid: String,
    pub roll_id: Uuid,
    /// Serial of the referenced roll, denormalized for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_serial_number: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl WorkOrder {
    /// Flip the completion flag of the child with the given pid.
    /// Returns false (and changes nothing) when the pid is unknown.
    pub fn toggle_child(&mut self, pid: &str) -> bool {
        match self.child_pids.iter_mut().find(|c| c.pid == pid) {
            Some(child) => {
                child.completed = !child.completed;
                true
            }
            None => false,
        }
    }

    pub fn roll_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.child_pids.iter().map(|c| c.roll_id)
    }
}
