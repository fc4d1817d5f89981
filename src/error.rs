use thiserror::Error;

/// Everything that can go wrong between raw formula text and a numeric answer.
///
/// The messages are shown verbatim to whoever typed the formula, so they
/// describe the input problem rather than the parser state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquationError {
    /// An operator or function was handed more (or fewer) operands than it accepts.
    #[error("{symbol} supports {}, got {supplied}", arity_range(.min, .max))]
    Arity {
        symbol: String,
        min: usize,
        max: Option<usize>,
        supplied: usize,
    },

    /// An integer-only function received a value with a fractional part.
    #[error("{symbol} parameters must be integers (whole numbers), got {value}")]
    NonIntegerOperand { symbol: String, value: f64 },

    /// A value could not be narrowed to the 32-bit integer an operation works with.
    #[error("{symbol}: {value} is outside the supported range")]
    OutOfRange { symbol: String, value: f64 },

    #[error("Arguments specified not in a function")]
    MisplacedSeparator,

    #[error("Unbalanced parenthesis in formula")]
    UnbalancedParentheses,

    /// Evaluation finished with more than one value on the stack.
    #[error("Invalid formula: {remaining} values left without an operator")]
    InvalidFormula { remaining: usize },

    #[error("Empty expression")]
    EmptyExpression,

    #[error("Invalid registry entry: {0}")]
    Registration(String),

    #[error("Invalid parameters: {0}")]
    Parameters(String),

    /// A batch worker went away without reporting a result.
    #[error("Evaluation aborted before producing a result")]
    Aborted,
}

fn arity_range(min: &usize, max: &Option<usize>) -> String {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    match *max {
        Some(max) if max == *min => format!("exactly {} argument{}", max, plural(max)),
        Some(max) => format!("{} to {} arguments", min, max),
        None => format!("at least {} argument{}", min, plural(*min)),
    }
}

impl EquationError {
    pub(crate) fn registration<M: Into<String>>(message: M) -> Self {
        EquationError::Registration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_messages() {
        let err = EquationError::Arity { symbol: "sqrt".into(), min: 1, max: Some(1), supplied: 2 };
        assert_eq!(err.to_string(), "sqrt supports exactly 1 argument, got 2");

        let err = EquationError::Arity { symbol: "min".into(), min: 2, max: Some(20), supplied: 21 };
        assert_eq!(err.to_string(), "min supports 2 to 20 arguments, got 21");

        let err = EquationError::Arity { symbol: "sum".into(), min: 1, max: None, supplied: 0 };
        assert_eq!(err.to_string(), "sum supports at least 1 argument, got 0");
    }

    #[test]
    fn structural_messages() {
        assert_eq!(EquationError::UnbalancedParentheses.to_string(), "Unbalanced parenthesis in formula");
        assert_eq!(EquationError::InvalidFormula { remaining: 2 }.to_string(), "Invalid formula: 2 values left without an operator");
    }
}
