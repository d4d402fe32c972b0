//! Percentage and ETA logging for long runs

use std::time::{Duration, Instant};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Counts per-particle stage evaluations and logs progress at most once per second
#[derive(Debug)]
pub struct Progress {
    total: usize,
    done: usize,
    started: Instant,
    last_report: Instant,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        let now = Instant::now();
        log::info!("Status: in progress   0%");
        Self {
            total,
            done: 0,
            started: now,
            last_report: now,
        }
    }

    pub fn advance(&mut self, count: usize) {
        self.done = (self.done + count).min(self.total);

        let now = Instant::now();
        if now.duration_since(self.last_report) < REPORT_INTERVAL || self.done >= self.total {
            return;
        }
        self.last_report = now;

        log::info!(
            "Status: in progress {:>3}% - ETA {}",
            self.percent(),
            format_duration(self.eta())
        );
    }

    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (100 * self.done / self.total) as u32
    }

    pub fn done(&self) -> usize {
        self.done
    }

    /// Remaining time extrapolated from the mean time per evaluation so far
    pub fn eta(&self) -> Duration {
        if self.done == 0 {
            return Duration::ZERO;
        }
        let per_unit = self.started.elapsed().as_secs_f64() / self.done as f64;
        Duration::from_secs_f64(per_unit * (self.total - self.done) as f64)
    }

    pub fn finish(self) {
        log::info!(
            "Status: complete - total time elapsed {}",
            format_duration(self.started.elapsed())
        );
    }
}

/// `HH:MM:SS`, prefixed with `N day(s) + ` past 24 hours
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total / 3_600) % 24;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;

    let clock = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
    if days > 0 {
        format!("{} day(s) + {}", days, clock)
    } else {
        clock
    }
}

