use crate::config::EngineConfig;
use crate::error::EquationError;
use crate::lexer;
use crate::parser;
use crate::registry::Registry;
use crate::runtime;
use crate::token::Token;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

enum RandomSource {
    /// Per-thread generator, seeded from the OS.
    Thread,
    /// One shared, reproducible stream.
    Seeded(Mutex<StdRng>),
}

/// A registry plus the random source that `rand` and `randbetween` draw from.
///
/// Engines are `Send + Sync`; one instance can serve any number of threads.
pub struct Engine {
    registry: Arc<Registry>,
    random: RandomSource,
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        Self::with_shared_registry(Arc::new(registry))
    }

    pub fn with_shared_registry(registry: Arc<Registry>) -> Self {
        Self { registry, random: RandomSource::Thread }
    }

    /// An engine whose random functions replay the same sequence for the same seed.
    pub fn seeded(registry: Registry, seed: u64) -> Self {
        Self {
            registry: Arc::new(registry),
            random: RandomSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Built-in registry, seeded when the configuration carries a seed.
    pub fn from_config(config: &EngineConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(Registry::builtin(), seed),
            None => Self::new(Registry::builtin()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Solve a formula, e.g. `((3+5)/2)*pi`.
    pub fn solve(&self, equation: &str) -> Result<f64, EquationError> {
        self.with_rng(|rng| self.solve_with_rng(equation, rng))
    }

    /// Solve with a caller-supplied random source.
    #[tracing::instrument(level = "trace", skip(self, rng))]
    pub fn solve_with_rng(&self, equation: &str, rng: &mut dyn RngCore) -> Result<f64, EquationError> {
        let tokens = lexer::tokenize(equation, &self.registry, rng)?;
        let postfix = parser::to_postfix(tokens)?;
        tracing::debug!(postfix = %parser::render(&postfix), "converted to postfix");
        runtime::evaluate(&postfix, rng)
    }

    pub fn tokenize(&self, equation: &str) -> Result<Vec<Token<'_>>, EquationError> {
        self.with_rng(|rng| lexer::tokenize(equation, &self.registry, rng))
    }

    /// The postfix form of a formula as space-separated text.
    /// Functions called with other than one argument show their count (`max#3`).
    pub fn to_postfix(&self, equation: &str) -> Result<String, EquationError> {
        let postfix = parser::to_postfix(self.tokenize(equation)?)?;
        Ok(parser::render(&postfix))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match &self.random {
            RandomSource::Thread => f(&mut rand::thread_rng()),
            RandomSource::Seeded(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut *rng)
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Registry::builtin())
    }
}
