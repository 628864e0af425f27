use super::level::Level;
use chrono::{DateTime, Utc};
use std::fmt;

/// Source location that produced an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// `dir/file.rs:line`, keeping only the last directory component.
    pub fn trimmed_path(&self) -> String {
        let file = self.file.replace('\\', "/");
        let mut parts = file.rsplitn(3, '/');
        let name = parts.next().unwrap_or_default();
        match parts.next() {
            Some(dir) => format!("{dir}/{name}:{}", self.line),
            None => format!("{name}:{}", self.line),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single log entry handed from the façade to its cores.
///
/// Context fields are not part of the entry; they travel separately so that each core can decide
/// how to accumulate and render them.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub logger_name: String,
    pub message: String,
    pub caller: Option<Caller>,
    pub stack: String,
}

impl Entry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            logger_name: String::new(),
            message: message.into(),
            caller: None,
            stack: String::new(),
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }
}
