use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

pub const EVENT_LOG_CAPACITY: usize = 10;
/// Entries shown by the presentation layer.
pub const RECENT_EVENT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Start,
    Stop,
    Pause,
    Resume,
    Mutation,
    Supernova,
    Config,
    Density,
    End,
}

impl EventKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
            Self::Mutation => "MUTATION",
            Self::Supernova => "SUPERNOVA",
            Self::Config => "CONFIG",
            Self::Density => "DENSITY",
            Self::End => "END",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub generation: u64,
    pub kind: EventKind,
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Gen {}] {}: {}", self.generation, self.kind, self.message)
    }
}

/// Bounded FIFO of the most recent events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(EVENT_LOG_CAPACITY + 1),
        }
    }

    /// Append an event, evicting the oldest past capacity. Returns a copy of
    /// the stored event.
    pub fn record(&mut self, generation: u64, kind: EventKind, message: impl Into<String>) -> Event {
        let event = Event {
            generation,
            kind,
            message: message.into(),
        };
        self.entries.push_back(event.clone());
        while self.entries.len() > EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        event
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    /// Up to `n` entries, most recent first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Event> {
        self.entries.iter().rev().take(n)
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.recent(RECENT_EVENT_COUNT).map(Event::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleventh_entry_evicts_the_first() {
        let mut log = EventLog::new();
        for g in 0..11 {
            log.record(g, EventKind::Mutation, "Genetic mutations detected");
        }
        assert_eq!(log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(log.iter().next().map(|e| e.generation), Some(1));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut log = EventLog::new();
        for g in 0..100 {
            log.record(g, EventKind::Density, "x");
            assert!(log.len() <= EVENT_LOG_CAPACITY);
        }
    }

    #[test]
    fn recent_is_most_recent_first() {
        let mut log = EventLog::new();
        log.record(0, EventKind::Start, "Simulation started");
        log.record(4, EventKind::Pause, "Simulation paused");
        log.record(4, EventKind::Resume, "Simulation resumed");
        log.record(9, EventKind::Stop, "Simulation stopped");
        let lines = log.recent_lines();
        assert_eq!(
            lines,
            vec![
                "[Gen 9] STOP: Simulation stopped",
                "[Gen 4] RESUME: Simulation resumed",
                "[Gen 4] PAUSE: Simulation paused",
            ]
        );
    }

    #[test]
    fn record_returns_stored_event() {
        let mut log = EventLog::new();
        let e = log.record(2, EventKind::End, "Maximum population reached");
        assert_eq!(log.iter().last(), Some(&e));
    }
}
