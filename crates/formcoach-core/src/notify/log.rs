//! Bounded operation log of every outbound notification.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeviceCommand;
use crate::session::SystemStatus;

pub const DEFAULT_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub status: SystemStatus,
    pub command_key: String,
    pub command_value: u8,
    pub voice_text: String,
}

impl LogEntry {
    pub fn new(now_ms: u64, status: SystemStatus, command: DeviceCommand, voice_text: &str) -> Self {
        Self {
            timestamp: DateTime::from_timestamp_millis(now_ms as i64).unwrap_or_default(),
            status,
            command_key: command.key().to_string(),
            command_value: command.code(),
            voice_text: voice_text.to_string(),
        }
    }
}

/// Ring of the most recent entries; the oldest is dropped once full.
#[derive(Debug, Clone)]
pub struct OperationLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl OperationLog {
    /// `capacity` is a retention bound; storage grows with the entries pushed.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
