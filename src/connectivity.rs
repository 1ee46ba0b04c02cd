use crate::error::SyncError;
use log::{debug, error, warn};
use reqwest::blocking::Client;
use std::time::Duration;

pub trait Probe {
    fn is_reachable(&self) -> bool;
}

/// Reachability check against a fixed URL. Any HTTP response counts as
/// reachable; connect, DNS and timeout failures do not.
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl Probe for HttpProbe {
    fn is_reachable(&self) -> bool {
        match self.client.get(&self.url).send() {
            Ok(resp) => {
                debug!("Probe {} answered HTTP {}", self.url, resp.status());
                true
            }
            Err(err) => {
                debug!("Probe {} failed: {}", self.url, err);
                false
            }
        }
    }
}

pub struct ConnectivityGate {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl ConnectivityGate {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Runs `work` once the probe succeeds. Waits `delay` between failed
    /// checks, but not after the last one.
    pub fn run<P, S, W, T>(&self, probe: &P, mut sleep: S, work: W) -> Result<T, SyncError>
    where
        P: Probe + ?Sized,
        S: FnMut(Duration),
        W: FnOnce() -> T,
    {
        for attempt in 1..=self.max_attempts {
            if probe.is_reachable() {
                return Ok(work());
            }
            if attempt < self.max_attempts {
                warn!(
                    "No internet connection (attempt {attempt}/{}). Retrying in {} seconds...",
                    self.max_attempts,
                    self.delay.as_secs()
                );
                sleep(self.delay);
            }
        }

        let err = SyncError::Connectivity {
            attempts: self.max_attempts,
        };
        error!("{}", err.message());
        Err(err)
    }
}
