use sanafi_services::{Latency, SimulatedLatencies};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_STORE_PATH: &str = "./data/sanafi-store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store_path: String,
    pub latencies: SimulatedLatencies,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: DEFAULT_STORE_PATH.to_owned(),
            latencies: SimulatedLatencies::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SimulatedLatencies::default();
        let millis = |key: &str, default: Duration| -> Duration {
            match lookup(key) {
                None => default,
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(ms) => Duration::from_millis(ms),
                    Err(err) => {
                        warn!(key, value = %raw, error = %err, "ignoring unparseable setting");
                        default
                    }
                },
            }
        };

        let store_path = lookup("SANAFI_STORE_PATH")
            .map(|path| path.trim().to_owned())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_owned());

        let latencies = SimulatedLatencies {
            login: Latency::fixed(millis("SANAFI_LOGIN_DELAY_MS", defaults.login.base)),
            kyc: Latency::fixed(millis("SANAFI_KYC_DELAY_MS", defaults.kyc.base)),
            chat: Latency::jittered(
                millis("SANAFI_CHAT_DELAY_MS", defaults.chat.base),
                millis("SANAFI_CHAT_JITTER_MS", defaults.chat.jitter),
            ),
            call_timeout: millis("SANAFI_CALL_TIMEOUT_MS", defaults.call_timeout),
            ..defaults
        };

        Self {
            store_path,
            latencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.latencies.login.base, Duration::from_millis(1000));
        assert_eq!(config.latencies.call_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_applied() {
        let config = config(&[
            ("SANAFI_STORE_PATH", "/tmp/sanafi"),
            ("SANAFI_LOGIN_DELAY_MS", "0"),
            ("SANAFI_CHAT_JITTER_MS", "250"),
            ("SANAFI_CALL_TIMEOUT_MS", "500"),
        ]);
        assert_eq!(config.store_path, "/tmp/sanafi");
        assert_eq!(config.latencies.login, Latency::none());
        assert_eq!(config.latencies.chat.jitter, Duration::from_millis(250));
        assert_eq!(config.latencies.chat.base, Duration::from_millis(1500));
        assert_eq!(config.latencies.call_timeout, Duration::from_millis(500));
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = config(&[("SANAFI_KYC_DELAY_MS", "soon"), ("SANAFI_STORE_PATH", "  ")]);
        assert_eq!(config.latencies.kyc.base, Duration::from_millis(2000));
        assert_eq!(config.store_path, DEFAULT_STORE_PATH);
    }
}
