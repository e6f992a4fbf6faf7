//! Nurse rosters and shift schedule generation.
//!
//! Each hospital has a roster of nurses (name + department) and at most one
//! generated schedule. Generation assigns the three daily shifts round-robin
//! over the roster sorted by name, skipping nurses reported absent, so the
//! same roster always produces the same table.
//!
//! Both maps are behind a single `RwLock`: roster reads and schedule fetches
//! take the read lock, registration and generation take the write lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Daily shifts, assigned in this order.
const SHIFTS: [&str; 3] = ["Morning", "Evening", "Night"];

/// A registered nurse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nurse {
    pub name: String,
    pub department: String,
}

/// One assigned shift in a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub shift: String,
    pub dept: String,
}

/// Generated schedule: nurse name to assigned shifts, ordered by name.
pub type Schedule = BTreeMap<String, Vec<ShiftAssignment>>;

#[derive(Default)]
struct DirectoryInner {
    rosters: HashMap<String, Vec<Nurse>>,
    schedules: HashMap<String, Schedule>,
}

/// Per-hospital rosters and schedules.
///
/// Cloneable — all clones share the same inner `Arc<RwLock<...>>`.
#[derive(Clone, Default)]
pub struct HospitalDirectory {
    inner: Arc<RwLock<DirectoryInner>>,
}

impl HospitalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a nurse. Returns `false` if the hospital already has a nurse
    /// with the same name.
    pub async fn add_nurse(&self, hospital_id: &str, nurse: Nurse) -> bool {
        let mut inner = self.inner.write().await;
        let roster = inner.rosters.entry(hospital_id.to_string()).or_default();
        if roster.iter().any(|n| n.name == nurse.name) {
            return false;
        }
        roster.push(nurse);
        true
    }

    /// List a hospital's roster, sorted by name. Empty if unknown.
    pub async fn list_nurses(&self, hospital_id: &str) -> Vec<Nurse> {
        let inner = self.inner.read().await;
        let mut roster = inner.rosters.get(hospital_id).cloned().unwrap_or_default();
        roster.sort_by(|a, b| a.name.cmp(&b.name));
        roster
    }

    /// Remove a nurse by name. Returns `true` if one was removed.
    pub async fn remove_nurse(&self, hospital_id: &str, name: &str) -> bool {
        let mut inner = self.inner.write().await;
        let Some(roster) = inner.rosters.get_mut(hospital_id) else {
            return false;
        };
        let before = roster.len();
        roster.retain(|n| n.name != name);
        roster.len() < before
    }

    /// Generate and store a schedule for the hospital's roster minus the
    /// absent nurses. Returns `None` when the effective roster is empty.
    pub async fn generate_schedule(
        &self,
        hospital_id: &str,
        absent_nurses: &[String],
    ) -> Option<Schedule> {
        let mut inner = self.inner.write().await;
        let mut present: Vec<Nurse> = inner
            .rosters
            .get(hospital_id)?
            .iter()
            .filter(|n| !absent_nurses.contains(&n.name))
            .cloned()
            .collect();
        if present.is_empty() {
            return None;
        }
        present.sort_by(|a, b| a.name.cmp(&b.name));

        let schedule = build_schedule(&present);
        inner
            .schedules
            .insert(hospital_id.to_string(), schedule.clone());
        Some(schedule)
    }

    /// Fetch the last generated schedule, or `None` if one was never made.
    pub async fn fetch_schedule(&self, hospital_id: &str) -> Option<Schedule> {
        self.inner.read().await.schedules.get(hospital_id).cloned()
    }
}

/// Assign shifts round-robin over a name-sorted roster.
fn build_schedule(nurses: &[Nurse]) -> Schedule {
    let mut schedule = Schedule::new();
    for (i, nurse) in nurses.iter().enumerate() {
        schedule
            .entry(nurse.name.clone())
            .or_default()
            .push(ShiftAssignment {
                shift: SHIFTS[i % SHIFTS.len()].to_string(),
                dept: nurse.department.clone(),
            });
    }
    schedule
}
