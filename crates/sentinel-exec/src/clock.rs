use std::cell::Cell;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Blocks (or jumps, for simulated clocks) until `deadline_ms`.
    fn sleep_until(&self, deadline_ms: u64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }

    fn sleep_until(&self, deadline_ms: u64) {
        let now_ms = self.now_ms();
        if deadline_ms > now_ms {
            std::thread::sleep(Duration::from_millis(deadline_ms - now_ms));
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedClock {
    now_ms: Cell<u64>,
}

impl SimulatedClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(SystemClock.now_ms())
    }

    pub fn advance(&self, by_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(by_ms));
    }
}

impl Clock for SimulatedClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep_until(&self, deadline_ms: u64) {
        if deadline_ms > self.now_ms.get() {
            self.now_ms.set(deadline_ms);
        }
    }
}
