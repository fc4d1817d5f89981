use crate::builtins;
use crate::error::EquationError;
use crate::lexer::CleaningPatterns;
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Signature shared by every registry entry.
///
/// Operands arrive in stack order: `p[0]` is the operand written *last*,
/// `p[1]` the one before it, and so on. A binary `a - b` therefore sees
/// `p = [b, a]` and computes `p[1] - p[0]`.
pub type Calculation =
    dyn Fn(&[f64], &mut dyn RngCore) -> Result<f64, EquationError> + Send + Sync;

/// Precedence given to every function entry. Only unary negation binds tighter.
pub const FUNCTION_PRECEDENCE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Operator,
    Function,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// One immutable registry entry: an operator, function or constant.
#[derive(Clone)]
pub struct OperatorSpec {
    symbol: String,
    display_name: String,
    kind: SymbolKind,
    precedence: u8,
    associativity: Associativity,
    min_arity: usize,
    max_arity: Option<usize>,
    description: Option<String>,
    calculation: Arc<Calculation>,
}

impl OperatorSpec {
    /// An infix or prefix operator. Operators always consume exactly `arity`
    /// operands and carry no upper bound of their own.
    pub fn operator<F>(
        symbol: &str,
        display_name: &str,
        precedence: u8,
        arity: usize,
        associativity: Associativity,
        calculation: F,
    ) -> Self
    where
        F: Fn(&[f64], &mut dyn RngCore) -> Result<f64, EquationError> + Send + Sync + 'static,
    {
        Self {
            symbol: symbol.to_lowercase(),
            display_name: display_name.to_string(),
            kind: SymbolKind::Operator,
            precedence,
            associativity,
            min_arity: arity,
            max_arity: None,
            description: None,
            calculation: Arc::new(calculation),
        }
    }

    /// A named function taking between `min_arity` and `max_arity` arguments
    /// (`None` = unbounded).
    pub fn function<F>(symbol: &str, min_arity: usize, max_arity: Option<usize>, calculation: F) -> Self
    where
        F: Fn(&[f64], &mut dyn RngCore) -> Result<f64, EquationError> + Send + Sync + 'static,
    {
        Self {
            symbol: symbol.to_lowercase(),
            display_name: symbol.to_string(),
            kind: SymbolKind::Function,
            precedence: FUNCTION_PRECEDENCE,
            associativity: Associativity::Left,
            min_arity,
            max_arity,
            description: None,
            calculation: Arc::new(calculation),
        }
    }

    /// A zero-argument entry, evaluated afresh every time it is tokenized.
    pub fn constant<F>(symbol: &str, calculation: F) -> Self
    where
        F: Fn(&[f64], &mut dyn RngCore) -> Result<f64, EquationError> + Send + Sync + 'static,
    {
        Self {
            symbol: symbol.to_lowercase(),
            display_name: symbol.to_string(),
            kind: SymbolKind::Constant,
            precedence: 0,
            associativity: Associativity::Left,
            min_arity: 0,
            max_arity: Some(0),
            description: None,
            calculation: Arc::new(calculation),
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    pub fn is_left_associative(&self) -> bool {
        self.associativity == Associativity::Left
    }

    pub fn min_arity(&self) -> usize {
        self.min_arity
    }

    pub fn max_arity(&self) -> Option<usize> {
        self.max_arity
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Run the calculation. Over-supply is rejected here; checking for too few
    /// operands is left to the caller, which knows how many it popped.
    pub fn calculate(&self, operands: &[f64], rng: &mut dyn RngCore) -> Result<f64, EquationError> {
        if let Some(max) = self.max_arity {
            if operands.len() > max {
                return Err(self.arity_error(operands.len()));
            }
        }
        (self.calculation)(operands, rng)
    }

    pub(crate) fn arity_error(&self, supplied: usize) -> EquationError {
        EquationError::Arity {
            symbol: self.display_name.clone(),
            min: self.min_arity,
            max: self.max_arity,
            supplied,
        }
    }
}

impl fmt::Debug for OperatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSpec")
            .field("symbol", &self.symbol)
            .field("display_name", &self.display_name)
            .field("kind", &self.kind)
            .field("precedence", &self.precedence)
            .field("associativity", &self.associativity)
            .field("min_arity", &self.min_arity)
            .field("max_arity", &self.max_arity)
            .finish()
    }
}

/// Trait for plugging plain numeric functions into a registry.
///
/// Unlike raw [`OperatorSpec`] calculations, `execute` receives its arguments
/// in the order they were written.
///
/// # Example
/// ```rust
/// use eqsolve::{CustomFunction, EquationError, Engine, Registry};
///
/// struct Double;
///
/// impl CustomFunction for Double {
///     fn name(&self) -> &str { "double" }
///     fn min_args(&self) -> usize { 1 }
///     fn max_args(&self) -> Option<usize> { Some(1) }
///
///     fn execute(&self, args: &[f64]) -> Result<f64, EquationError> {
///         Ok(args[0] * 2.0)
///     }
/// }
///
/// let mut registry = Registry::builtin();
/// registry.register_function(Box::new(Double)).unwrap();
/// let engine = Engine::new(registry);
/// assert_eq!(engine.solve("double(21)").unwrap(), 42.0);
/// ```
pub trait CustomFunction: Send + Sync {
    /// The name of the function (case-insensitive)
    fn name(&self) -> &str;

    /// Minimum number of arguments required
    fn min_args(&self) -> usize;

    /// Maximum number of arguments allowed (None = unlimited)
    fn max_args(&self) -> Option<usize>;

    fn execute(&self, args: &[f64]) -> Result<f64, EquationError>;

    /// Optional: Description of the function for listings
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Symbol table consulted by the tokenizer and the evaluator.
///
/// Build it, register whatever extra entries you need, then share it
/// (usually through an [`Engine`](crate::Engine)). Lookups never mutate.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, OperatorSpec>,
    patterns: OnceLock<CleaningPatterns>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            patterns: OnceLock::new(),
        }
    }

    /// Create a registry holding the built-in operators, functions and constants.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in builtins::builtin_specs() {
            registry.entries.insert(spec.symbol.clone(), spec);
        }
        registry
    }

    /// Register an entry, replacing any entry with the same symbol.
    pub fn register(&mut self, spec: OperatorSpec) -> Result<(), EquationError> {
        validate_symbol(&spec.symbol)?;
        if spec.min_arity > spec.max_arity.unwrap_or(usize::MAX) {
            return Err(EquationError::registration(format!(
                "{}: min_arity cannot be greater than max_arity",
                spec.symbol
            )));
        }

        self.entries.insert(spec.symbol.clone(), spec);
        // Cleaning patterns embed the symbol list
        self.patterns = OnceLock::new();
        Ok(())
    }

    /// Register a [`CustomFunction`] as a function entry.
    pub fn register_function(&mut self, function: Box<dyn CustomFunction>) -> Result<(), EquationError> {
        let function: Arc<dyn CustomFunction> = Arc::from(function);
        let name = function.name().to_string();
        let description = function.description().map(str::to_string);

        let callee = Arc::clone(&function);
        let mut spec = OperatorSpec::function(&name, function.min_args(), function.max_args(), move |p, _| {
            let written_order: Vec<f64> = p.iter().rev().copied().collect();
            callee.execute(&written_order)
        });
        spec.description = description;
        self.register(spec)
    }

    /// Remove an entry by symbol
    pub fn unregister(&mut self, symbol: &str) -> bool {
        let removed = self.entries.remove(&symbol.to_lowercase()).is_some();
        if removed {
            self.patterns = OnceLock::new();
        }
        removed
    }

    /// Case-insensitive exact lookup.
    pub fn lookup(&self, symbol: &str) -> Option<&OperatorSpec> {
        match self.entries.get(symbol) {
            Some(spec) => Some(spec),
            None => self.entries.get(&symbol.to_lowercase()),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_some()
    }

    /// All registered symbols, sorted.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn specs(&self) -> impl Iterator<Item = &OperatorSpec> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cleaning patterns for this symbol set, built on first use.
    pub(crate) fn patterns(&self) -> Result<&CleaningPatterns, EquationError> {
        if let Some(patterns) = self.patterns.get() {
            return Ok(patterns);
        }
        let built = CleaningPatterns::build(self)?;
        Ok(self.patterns.get_or_init(|| built))
    }
}

fn validate_symbol(symbol: &str) -> Result<(), EquationError> {
    if symbol.is_empty() {
        return Err(EquationError::registration("symbol cannot be empty"));
    }
    if symbol.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(EquationError::registration(format!("{}: symbol cannot start with a digit", symbol)));
    }
    if symbol.chars().any(|c| c.is_whitespace() || matches!(c, '(' | ')' | ',')) {
        return Err(EquationError::registration(format!(
            "{}: symbol cannot contain whitespace, parentheses or commas",
            symbol
        )));
    }
    Ok(())
}
