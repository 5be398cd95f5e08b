//! Export attempt observability.
//!
//! A bounded ring buffer of recent export outcomes per document session.
//! Purely diagnostic — nothing reads it to make control-flow decisions.
#![allow(dead_code)]

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const OUTCOME_CAPACITY: usize = 10;

/// Record of one export attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub succeeded: bool,
    pub fixes_applied: u32,
    pub warning_count: u32,
    pub failure_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExportOutcome {
    pub fn success(fixes_applied: u32, warning_count: u32) -> Self {
        Self {
            succeeded: true,
            fixes_applied,
            warning_count,
            failure_reason: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(fixes_applied: u32, warning_count: u32, reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            fixes_applied,
            warning_count,
            failure_reason: Some(reason.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Last-N export outcomes, oldest evicted first.
#[derive(Debug, Clone, Default)]
pub struct OutcomeLog {
    entries: VecDeque<ExportOutcome>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: ExportOutcome) {
        if self.entries.len() == OUTCOME_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(outcome);
    }

    /// Outcomes in chronological order.
    pub fn recent(&self) -> Vec<ExportOutcome> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
