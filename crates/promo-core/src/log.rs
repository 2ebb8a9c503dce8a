use crate::config::schema::LogConfig;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::VecDeque};

thread_local! {
    static LOG_BUFFER: RefCell<LogBuffer> = RefCell::new(LogBuffer::new(&LogConfig::default()));
}

///
/// Level
///

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Display, Serialize, Deserialize)]
pub enum Level {
    Debug, // least severe
    Info,
    Ok,
    Warn,
    Error, // most severe
}

///
/// Topic
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Topic {
    Activity,
    Config,
    Headers,
    Http,
    Init,
    Manager,
    PromoFile,
    Store,
    Timer,
}

#[macro_export]
macro_rules! log {
    // =========================================
    // (1) With topic (normal + trailing comma)
    // =========================================
    ($topic:expr, $level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner Some(&$topic.to_string()), $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // (2) No topic (normal + trailing comma)
    // =========================================
    ($level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner None::<&str>, $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // INTERNAL
    // =========================================
    (@inner $topic:expr, $level:expr, $fmt:expr $(, $arg:expr)*) => {{
        let level = $level;
        let topic_opt: Option<&str> = $topic;

        if $crate::log::__enabled(level) {
            let message = format!($fmt $(, $arg)*);

            // append entry
            $crate::log::__append(topic_opt, level, &message);

            let topic_centered = format!("{:^10}", topic_opt.unwrap_or("..."));

            let (color, reset) = match level {
                $crate::log::Level::Ok    => ("\x1b[32m", "\x1b[0m"),
                $crate::log::Level::Info  => ("\x1b[34m", "\x1b[0m"),
                $crate::log::Level::Warn  => ("\x1b[33m", "\x1b[0m"),
                $crate::log::Level::Error => ("\x1b[31m", "\x1b[0m"),
                $crate::log::Level::Debug => ("", ""),
            };

            let label = format!("{color}{:^5}{reset}", level.to_string().to_uppercase());
            eprintln!("{label}|{topic_centered}| {message}");
        }
    }};
}

///
/// LogEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEntry {
    pub level: Level,
    pub topic: Option<String>,
    pub message: String,
}

///
/// LogBuffer
/// Bounded in-process tail of recent log lines, one per thread.
///

pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
    min_level: Level,
}

impl LogBuffer {
    fn new(cfg: &LogConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: cfg.max_entries,
            min_level: cfg.min_level,
        }
    }

    /// Apply log settings for the current thread; existing entries are trimmed.
    pub fn configure(cfg: &LogConfig) {
        LOG_BUFFER.with_borrow_mut(|buf| {
            buf.max_entries = cfg.max_entries;
            buf.min_level = cfg.min_level;
            buf.trim();
        });
    }

    #[must_use]
    pub fn entries() -> Vec<LogEntry> {
        LOG_BUFFER.with_borrow(|buf| buf.entries.iter().cloned().collect())
    }

    /// Returns true if any retained entry at `level` contains `needle`.
    #[must_use]
    pub fn contains(level: Level, needle: &str) -> bool {
        LOG_BUFFER.with_borrow(|buf| {
            buf.entries
                .iter()
                .any(|e| e.level == level && e.message.contains(needle))
        })
    }

    pub fn clear() {
        LOG_BUFFER.with_borrow_mut(|buf| buf.entries.clear());
    }

    fn push(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}

///
/// Helpers
///

#[doc(hidden)]
#[must_use]
pub fn __enabled(level: Level) -> bool {
    LOG_BUFFER.with_borrow(|buf| level >= buf.min_level)
}

#[doc(hidden)]
pub fn __append(topic: Option<&str>, level: Level, message: &str) {
    LOG_BUFFER.with_borrow_mut(|buf| {
        buf.push(LogEntry {
            level,
            topic: topic.map(str::to_string),
            message: message.to_string(),
        });
    });
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_only_the_tail() {
        LogBuffer::configure(&LogConfig {
            max_entries: 2,
            min_level: Level::Debug,
        });
        LogBuffer::clear();

        crate::log!(Topic::Store, Info, "one");
        crate::log!(Topic::Store, Info, "two");
        crate::log!(Topic::Store, Warn, "three");

        let entries = LogBuffer::entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "two");
        assert_eq!(entries[1].topic.as_deref(), Some("Store"));
        assert!(LogBuffer::contains(Level::Warn, "three"));
    }

    #[test]
    fn below_min_level_is_dropped() {
        LogBuffer::configure(&LogConfig {
            max_entries: 10,
            min_level: Level::Warn,
        });
        LogBuffer::clear();

        crate::log!(Info, "quiet");
        crate::log!(Error, "loud");

        let entries = LogBuffer::entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "loud");
        assert_eq!(entries[0].topic, None);
    }
}
