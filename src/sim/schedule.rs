//! Deferred one-shot events keyed by simulation time
//!
//! Replaces wall-clock timeouts: entries live inside the run state, are polled
//! once per tick, and vanish with the run on reset, so a stale expiry can never
//! touch the next run.

/// What to do when an entry comes due
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledEvent {
    /// Clear the dialogue slot if it still shows this line
    ExpireDialogue { id: String },
    /// Clear the log slot if it still shows this log
    ExpireLog { serial: u64 },
    /// Ending flash delay elapsed
    EndTransition,
}

#[derive(Debug, Clone)]
struct Entry {
    due: f64,
    seq: u64,
    event: ScheduledEvent,
}

/// Time-ordered queue of pending one-shots
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Schedule {
    /// Queue `event` to fire once the simulation clock reaches `due`
    pub fn push(&mut self, due: f64, event: ScheduledEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { due, seq, event });
    }

    /// Remove and return everything due at `now`, earliest first
    pub fn drain_due(&mut self, now: f64) -> Vec<ScheduledEvent> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|entry| {
            if entry.due <= now {
                due.push(entry.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.event).collect()
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
