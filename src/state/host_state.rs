use std::time::{Duration, Instant};

/// Tracks request timing for the crawled host
///
/// Politeness is off by default (a zero delay); when a delay is configured
/// the scheduler waits out `time_until_next_request` before each fetch.
#[derive(Debug, Clone)]
pub struct HostState {
    /// Minimum spacing between two requests to the host
    pub delay: Duration,

    /// Number of requests made to the host in the current crawl
    pub request_count: u32,

    /// Timestamp of the last request to the host
    pub last_request_time: Option<Instant>,
}

impl HostState {
    /// Creates a new HostState with the given request spacing
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            request_count: 0,
            last_request_time: None,
        }
    }

    /// Checks if a request can be made to the host now
    ///
    /// # Arguments
    ///
    /// * `now` - The current time instant
    ///
    /// # Returns
    ///
    /// * `true` - If a request can be made now
    /// * `false` - If the request should be delayed
    pub fn can_request(&self, now: Instant) -> bool {
        self.time_until_next_request(now).is_none()
    }

    /// Records that a request was made to the host
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    /// The last request time may be a reserved slot in the future.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        if self.delay.is_zero() {
            return None;
        }
        let last = self.last_request_time?;
        let wait = (last + self.delay).saturating_duration_since(now);
        (!wait.is_zero()).then_some(wait)
    }

    /// Reserves the next request slot and returns how long to wait for it
    ///
    /// The slot is recorded immediately so concurrent workers queue up
    /// behind each other instead of all firing after the same wait.
    pub fn reserve(&mut self, now: Instant) -> Duration {
        let wait = self.time_until_next_request(now).unwrap_or(Duration::ZERO);
        self.record_request(now + wait);
        wait
    }
}

impl Default for HostState {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
