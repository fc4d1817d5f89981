/// Environment variable holding a u64 seed for reproducible `rand`/`randbetween`.
pub const SEED_VAR: &str = "EQSOLVE_SEED";
/// Environment variable holding the worker count for batch evaluation.
pub const THREADS_VAR: &str = "EQSOLVE_THREADS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub seed: Option<u64>,
    pub threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { seed: None, threads: num_cpus::get() }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(SEED_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => tracing::warn!(var = SEED_VAR, value = %raw, "ignoring invalid seed"),
            }
        }

        if let Some(raw) = lookup(THREADS_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(threads) if threads > 0 => config.threads = threads,
                _ => tracing::warn!(var = THREADS_VAR, value = %raw, "ignoring invalid thread count"),
            }
        }

        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> EngineConfig {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EngineConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn reads_seed_and_threads() {
        let config = config_from(&[(SEED_VAR, "1234"), (THREADS_VAR, " 3 ")]);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.threads, 3);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = config_from(&[(SEED_VAR, "abc"), (THREADS_VAR, "0")]);
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn builders_override() {
        let config = EngineConfig::default().with_seed(5).with_threads(0);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.threads, 1);
    }
}
