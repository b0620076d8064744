use std::cell::Cell;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::debug;

use crate::config::PacingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Account,
    MatchList,
    MatchDetail,
}

/// Requests made through one pacer, per endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog {
    pub started: DateTime<Utc>,
    pub account: u32,
    pub match_list: u32,
    pub match_detail: u32,
}

impl RequestLog {
    pub fn new() -> Self {
        RequestLog {
            started: Utc::now(),
            account: 0,
            match_list: 0,
            match_detail: 0,
        }
    }

    pub fn record_request(&mut self, kind: RequestKind) {
        match kind {
            RequestKind::Account => self.account += 1,
            RequestKind::MatchList => self.match_list += 1,
            RequestKind::MatchDetail => self.match_detail += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.account + self.match_list + self.match_detail
    }

    pub fn display_status(&self) {
        let elapsed = Utc::now().signed_duration_since(self.started);

        println!("\n📊 API Usage");
        println!("   Account lookups: {}", self.account);
        println!("   Match lists:     {}", self.match_list);
        println!("   Match details:   {}", self.match_detail);
        println!(
            "   Total: {} requests in {}m {}s\n",
            self.total(),
            elapsed.num_minutes(),
            elapsed.num_seconds() % 60
        );
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocks before every remote call: first a fixed per-endpoint delay, then
/// until the long-window quota has room.
pub struct RequestPacer {
    config: PacingConfig,
    window: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    clock: DefaultClock,
    log: Cell<RequestLog>,
}

impl RequestPacer {
    pub fn new(config: PacingConfig) -> Self {
        let window = NonZeroU32::new(config.window_requests).and_then(|burst| {
            Quota::with_period(config.window / burst.get()).map(|quota| RateLimiter::direct(quota.allow_burst(burst)))
        });

        RequestPacer {
            config,
            window,
            clock: DefaultClock::default(),
            log: Cell::new(RequestLog::new()),
        }
    }

    pub fn delay_for(&self, kind: RequestKind) -> Duration {
        match kind {
            RequestKind::Account => self.config.account_delay,
            RequestKind::MatchList => self.config.match_list_delay,
            RequestKind::MatchDetail => self.config.match_detail_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    pub fn wait(&self, kind: RequestKind) {
        let delay = self.delay_for(kind);
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        if let Some(window) = &self.window {
            while let Err(not_until) = window.check() {
                let wait = not_until.wait_time_from(self.clock.now());
                debug!("Request window full, waiting {}ms", wait.as_millis());
                thread::sleep(wait);
            }
        }

        let mut log = self.log.get();
        log.record_request(kind);
        self.log.set(log);
    }

    pub fn usage(&self) -> RequestLog {
        self.log.get()
    }
}
