//! 사용자 표시용 로그 훅.
//!
//! 커넥터는 사용자에게 보여줄 로그 한 줄마다 `LogSink::append`를 호출합니다.
//! 같은 내용은 `tracing`으로도 남습니다.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::info;

/// 사용자 표시용 로그 수신자.
pub trait LogSink: Send + Sync {
    fn append(&self, message: &str);
}

/// 메모리 로그 항목.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub message: String,
    /// UI에 이미 표시되었는지 여부
    pub displayed: bool,
    pub logged_at: DateTime<Utc>,
}

/// 기본 보관 항목 수.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// UI가 주기적으로 비우는 메모리 로그.
///
/// 최대 `capacity`개를 보관하며, 넘치면 가장 오래된 항목부터 버립니다.
#[derive(Debug)]
pub struct MemoryLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 보관 한도를 지정해 생성합니다. 0은 1로 취급합니다.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY))),
            capacity,
        }
    }

    /// 아직 표시되지 않은 항목을 반환하고 표시됨으로 표시합니다.
    pub fn take_undisplayed(&self) -> Vec<LogEntry> {
        let mut entries = self.entries.lock();
        entries
            .iter_mut()
            .filter(|e| !e.displayed)
            .map(|e| {
                e.displayed = true;
                e.clone()
            })
            .collect()
    }

    /// 전체 항목의 복사본.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }
}

impl LogSink for MemoryLog {
    fn append(&self, message: &str) {
        info!("{}", message);
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            message: message.to_string(),
            displayed: false,
            logged_at: Utc::now(),
        });
    }
}

/// 항목을 보관하지 않고 `tracing`으로만 남기는 수신자.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn append(&self, message: &str) {
        info!("{}", message);
    }
}
