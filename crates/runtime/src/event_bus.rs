use std::collections::VecDeque;

use serde::Serialize;

use crate::frame::Frame;

/// Events kept when no explicit limit is given.
pub const DEFAULT_EVENT_LIMIT: usize = 1024;

/// Which part of the viewport produced an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Flight,
    Atmosphere,
    Overlay,
    Control,
}

/// A traceable engine decision, stamped with the frame it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Bounded event log, drained by whoever is recording the session.
///
/// Once `limit` events are buffered the oldest one is dropped for each new
/// event, so an embedding that never drains stays at a fixed size.
#[derive(Debug)]
pub struct EventBus {
    events: VecDeque<Event>,
    limit: usize,
    dropped: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_EVENT_LIMIT)
    }

    /// A zero limit keeps nothing; every emit is counted as dropped.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: VecDeque::new(),
            limit,
            dropped: 0,
        }
    }

    pub fn emit(&mut self, frame_index: u64, kind: EventKind, message: impl Into<String>) {
        if self.limit == 0 {
            self.dropped += 1;
            return;
        }
        while self.events.len() >= self.limit {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(Event {
            frame_index,
            kind,
            message: message.into(),
        });
    }

    pub fn emit_at(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.emit(frame.index, kind, message);
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
