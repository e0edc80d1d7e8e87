use rand::Rng;
use std::time::Duration;

/// Artificial delay of a simulated call: `base` plus a uniform random share of `jitter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency {
    pub base: Duration,
    pub jitter: Duration,
}

impl Latency {
    pub const fn fixed(base: Duration) -> Self {
        Self {
            base,
            jitter: Duration::ZERO,
        }
    }

    pub const fn jittered(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub const fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn sample(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        self.base + Duration::from_millis(extra)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatencies {
    pub login: Latency,
    pub kyc: Latency,
    pub chat: Latency,
    pub biometric: Latency,
    pub funds: Latency,
    pub call_timeout: Duration,
}

impl Default for SimulatedLatencies {
    fn default() -> Self {
        Self {
            login: Latency::fixed(Duration::from_millis(1000)),
            kyc: Latency::fixed(Duration::from_millis(2000)),
            chat: Latency::jittered(Duration::from_millis(1500), Duration::from_millis(1000)),
            biometric: Latency::fixed(Duration::from_millis(3000)),
            funds: Latency::none(),
            call_timeout: Duration::from_secs(10),
        }
    }
}

impl SimulatedLatencies {
    pub fn none() -> Self {
        Self {
            login: Latency::none(),
            kyc: Latency::none(),
            chat: Latency::none(),
            biometric: Latency::none(),
            funds: Latency::none(),
            call_timeout: Duration::from_secs(10),
        }
    }
}
