pub mod batch;
pub mod builtins;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod lexer;
pub mod params;
pub mod parser;
pub mod registry;
pub mod runtime;
pub mod token;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EquationError;
pub use format::{render_decimal, FormattedResult};
pub use params::Parameters;
pub use registry::{Associativity, CustomFunction, OperatorSpec, Registry, SymbolKind};
pub use token::{Token, TokenCategory, TokenKind};

use std::sync::Once;

// Process-wide engine over the built-in registry
lazy_static::lazy_static! {
    static ref DEFAULT_ENGINE: Engine = Engine::new(Registry::builtin());
}

static TRACING_INIT: Once = Once::new();

/// Solve an equation with the built-in operators, functions and constants.
pub fn solve(equation: &str) -> Result<f64, EquationError> {
    DEFAULT_ENGINE.solve(equation)
}

/// Substitute placeholders, then solve.
pub fn solve_with(equation: &str, params: &Parameters) -> Result<f64, EquationError> {
    DEFAULT_ENGINE.solve(&params.apply(equation))
}

/// Solve with placeholders given as a flat JSON object.
/// JSON format: {"@a": 2, "@b": "3.5"}
pub fn solve_with_json(equation: &str, json_params: &str) -> Result<f64, EquationError> {
    let params = Parameters::from_json(json_params)?;
    solve_with(equation, &params)
}

/// The engine behind [`solve`].
pub fn default_engine() -> &'static Engine {
    &DEFAULT_ENGINE
}

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=eqsolve=debug`
/// or `RUST_LOG=eqsolve=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .try_init();
        }
    });
}
