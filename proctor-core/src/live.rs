//! In-memory progress of a running simulation

use crate::run::{RecentAction, RECENT_ACTIONS_LIMIT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Aggregate timings for one action name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStats {
    pub count: u64,
    pub failures: u64,
    pub total_elapsed_ms: u64,
    pub max_elapsed_ms: u64,
}

impl ActionStats {
    pub fn avg_elapsed_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_elapsed_ms as f64 / self.count as f64
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "count": self.count,
            "failures": self.failures,
            "totalElapsedMs": self.total_elapsed_ms,
            "maxElapsedMs": self.max_elapsed_ms,
            "avgElapsedMs": self.avg_elapsed_ms(),
        })
    }
}

/// Ephemeral state of one run. Lost on restart; the run store is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSimulationState {
    pub run_id: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub actions: BTreeMap<String, ActionStats>,
    pub recent_actions: VecDeque<RecentAction>,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub last_flush_at: Option<DateTime<Utc>>,
    pub stop_requested: bool,
}

impl LiveSimulationState {
    pub fn new(run_id: impl Into<String>, started_at: DateTime<Utc>, duration: Duration) -> Self {
        let span = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        Self {
            run_id: run_id.into(),
            attempted: 0,
            succeeded: 0,
            failed: 0,
            actions: BTreeMap::new(),
            recent_actions: VecDeque::with_capacity(RECENT_ACTIONS_LIMIT),
            started_at,
            deadline: started_at + span,
            last_flush_at: None,
            stop_requested: false,
        }
    }

    /// Fold one completed action into the counters and the recent ring
    pub fn record(&mut self, action: RecentAction) {
        self.attempted += 1;
        if action.ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        let stats = self.actions.entry(action.name.clone()).or_default();
        stats.count += 1;
        if !action.ok {
            stats.failures += 1;
        }
        stats.total_elapsed_ms += action.elapsed_ms;
        stats.max_elapsed_ms = stats.max_elapsed_ms.max(action.elapsed_ms);

        if self.recent_actions.len() == RECENT_ACTIONS_LIMIT {
            self.recent_actions.pop_front();
        }
        self.recent_actions.push_back(action);
    }

    pub fn recent_actions(&self) -> Vec<RecentAction> {
        self.recent_actions.iter().cloned().collect()
    }

    fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_milliseconds().max(0) as u64
    }

    fn actions_json(&self) -> Value {
        Value::Object(
            self.actions
                .iter()
                .map(|(name, stats)| (name.clone(), stats.to_json()))
                .collect(),
        )
    }

    /// Snapshot persisted as `lastMetrics` while the run progresses
    pub fn metrics(&self, db_identity: &str, now: DateTime<Utc>) -> Value {
        json!({
            "dbIdentity": db_identity,
            "attempted": self.attempted,
            "succeeded": self.succeeded,
            "failed": self.failed,
            "actions": self.actions_json(),
            "elapsedMs": self.elapsed_ms(now),
            "updatedAt": now,
        })
    }

    /// Final result payload written once at finalization
    pub fn summary(&self, ended_at: DateTime<Utc>, stopped_early: bool) -> Value {
        let elapsed_ms = self.elapsed_ms(ended_at);
        let throughput = if elapsed_ms == 0 {
            0.0
        } else {
            self.attempted as f64 / (elapsed_ms as f64 / 1000.0)
        };

        json!({
            "attempted": self.attempted,
            "succeeded": self.succeeded,
            "failed": self.failed,
            "actions": self.actions_json(),
            "throughputPerSec": throughput,
            "elapsedMs": elapsed_ms,
            "stoppedEarly": stopped_early,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str, ok: bool, elapsed_ms: u64) -> RecentAction {
        RecentAction {
            name: name.to_string(),
            ok,
            elapsed_ms,
            http_status: Some(if ok { 200 } else { 500 }),
            error: None,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_record_updates_counters_and_aggregates() {
        let mut state = LiveSimulationState::new("r1", Utc::now(), Duration::from_secs(10));
        state.record(action("list_templates", true, 10));
        state.record(action("list_templates", false, 30));
        state.record(action("health", true, 5));

        assert_eq!(state.attempted, 3);
        assert_eq!(state.succeeded, 2);
        assert_eq!(state.failed, 1);

        let stats = &state.actions["list_templates"];
        assert_eq!(stats.count, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.max_elapsed_ms, 30);
        assert_eq!(stats.avg_elapsed_ms(), 20.0);
    }

    #[test]
    fn test_recent_actions_are_bounded_and_ordered() {
        let mut state = LiveSimulationState::new("r1", Utc::now(), Duration::from_secs(10));
        for i in 0..(RECENT_ACTIONS_LIMIT as u64 + 25) {
            state.record(action("health", true, i));
        }

        let recent = state.recent_actions();
        assert_eq!(recent.len(), RECENT_ACTIONS_LIMIT);
        assert_eq!(recent[0].elapsed_ms, 25);
        assert_eq!(recent.last().unwrap().elapsed_ms, RECENT_ACTIONS_LIMIT as u64 + 24);
        assert_eq!(state.attempted, RECENT_ACTIONS_LIMIT as u64 + 25);
    }

    #[test]
    fn test_summary_reports_throughput() {
        let started = Utc::now();
        let mut state = LiveSimulationState::new("r1", started, Duration::from_secs(2));
        assert_eq!(state.deadline - started, chrono::Duration::seconds(2));
        for _ in 0..4 {
            state.record(action("health", true, 1));
        }

        let summary = state.summary(started + chrono::Duration::seconds(2), true);
        assert_eq!(summary["attempted"], 4);
        assert_eq!(summary["elapsedMs"], 2000);
        assert_eq!(summary["throughputPerSec"], 2.0);
        assert_eq!(summary["stoppedEarly"], true);
        assert_eq!(summary["actions"]["health"]["count"], 4);

        let metrics = state.metrics("proctor_sandbox", started);
        assert_eq!(metrics["dbIdentity"], "proctor_sandbox");
    }
}
