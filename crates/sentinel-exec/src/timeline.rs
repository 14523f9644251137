use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Timer<T> {
    item: T,
    every_ms: Option<u64>,
}

/// Pending timers ordered by due time, then by insertion order.
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    entries: BTreeMap<(u64, u64), Timer<T>>,
    next_seq: u64,
}

impl<T: Clone> Timeline<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 1,
        }
    }

    pub fn schedule_after(&mut self, now_ms: u64, delay_ms: u64, item: T) {
        self.insert(now_ms.saturating_add(delay_ms), item, None);
    }

    /// `interval_ms` of zero is treated as one millisecond.
    pub fn schedule_every(&mut self, now_ms: u64, interval_ms: u64, item: T) {
        let interval_ms = interval_ms.max(1);
        self.insert(now_ms.saturating_add(interval_ms), item, Some(interval_ms));
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    /// Repeating timers are re-armed one interval after their due time.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, T)> {
        let (&(due_ms, seq), _) = self.entries.first_key_value()?;
        if due_ms > now_ms {
            return None;
        }
        let timer = self.entries.remove(&(due_ms, seq))?;
        if let Some(every_ms) = timer.every_ms {
            self.insert(due_ms.saturating_add(every_ms), timer.item.clone(), Some(every_ms));
        }
        Some((due_ms, timer.item))
    }

    pub fn next_due(&self) -> Option<u64> {
        self.entries.keys().next().map(|(due_ms, _)| *due_ms)
    }

    /// Earliest due time among one-shot timers; repeating timers never drain.
    pub fn next_once_due(&self) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, timer)| timer.every_ms.is_none())
            .map(|((due_ms, _), _)| *due_ms)
    }

    pub fn pending_once(&self) -> usize {
        self.entries
            .values()
            .filter(|timer| timer.every_ms.is_none())
            .count()
    }

    fn insert(&mut self, due_ms: u64, item: T, every_ms: Option<u64>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((due_ms, seq), Timer { item, every_ms });
    }
}

impl<T: Clone> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
