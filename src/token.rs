use crate::error::EquationError;
use crate::format::render_decimal;
use crate::registry::{OperatorSpec, Registry, SymbolKind};
use rand::RngCore;
use std::fmt;

/// Coarse classification of a token, mirroring [`TokenKind`] without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Invalid,
    Number,
    /// Never produced: constants fold into numbers during construction.
    Constant,
    Function,
    ArgumentSeparator,
    Operator,
    LeftParen,
    RightParen,
}

#[derive(Debug, Clone, Copy)]
pub enum TokenKind<'r> {
    Number(f64),
    Operator(&'r OperatorSpec),
    Function(&'r OperatorSpec),
    ArgumentSeparator,
    LeftParen,
    RightParen,
    /// Unrecognized text. Dropped by the converter.
    Invalid,
}

/// One classified piece of a cleaned formula.
///
/// Tokens borrow their operator entry from the registry they were built
/// against and live for a single solve.
#[derive(Debug, Clone)]
pub struct Token<'r> {
    pub kind: TokenKind<'r>,
    pub text: String,
    /// Arguments seen so far for a function. Starts at 1 and is bumped by the
    /// converter for every separator inside the function's argument list.
    pub operand_count: usize,
}

impl<'r> Token<'r> {
    /// Classify one whitespace-free piece of cleaned text.
    ///
    /// Constants are evaluated here, so each occurrence of `rand` draws its own value.
    pub fn from_text(text: &str, registry: &'r Registry, rng: &mut dyn RngCore) -> Result<Self, EquationError> {
        if let Some(value) = parse_number(text) {
            return Ok(Self::number(value));
        }

        let kind = match text {
            "," => TokenKind::ArgumentSeparator,
            "(" => TokenKind::LeftParen,
            ")" => TokenKind::RightParen,
            _ => match registry.lookup(text) {
                Some(spec) => match spec.kind() {
                    SymbolKind::Constant => return Ok(Self::number(spec.calculate(&[], rng)?)),
                    SymbolKind::Operator => TokenKind::Operator(spec),
                    SymbolKind::Function => TokenKind::Function(spec),
                },
                None => TokenKind::Invalid,
            },
        };

        let operand_count = match kind {
            TokenKind::Operator(_) | TokenKind::Function(_) => 1,
            _ => 0,
        };
        Ok(Self { kind, text: text.to_string(), operand_count })
    }

    pub fn number(value: f64) -> Self {
        Self {
            kind: TokenKind::Number(value),
            text: render_decimal(value),
            operand_count: 0,
        }
    }

    pub fn category(&self) -> TokenCategory {
        match self.kind {
            TokenKind::Number(_) => TokenCategory::Number,
            TokenKind::Operator(_) => TokenCategory::Operator,
            TokenKind::Function(_) => TokenCategory::Function,
            TokenKind::ArgumentSeparator => TokenCategory::ArgumentSeparator,
            TokenKind::LeftParen => TokenCategory::LeftParen,
            TokenKind::RightParen => TokenCategory::RightParen,
            TokenKind::Invalid => TokenCategory::Invalid,
        }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        match self.kind {
            TokenKind::Number(value) => Some(value),
            _ => None,
        }
    }

    /// The registry entry behind an operator or function token.
    pub fn spec(&self) -> Option<&'r OperatorSpec> {
        match self.kind {
            TokenKind::Operator(spec) | TokenKind::Function(spec) => Some(spec),
            _ => None,
        }
    }

    /// True for the synthetic unary-minus marker inserted by the cleaner.
    pub fn is_negation(&self) -> bool {
        matches!(self.kind, TokenKind::Operator(spec) if spec.symbol() == "neg")
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Function(_) if self.operand_count != 1 => write!(f, "{}#{}", self.text, self.operand_count),
            _ => f.write_str(&self.text),
        }
    }
}

/// Plain decimal literals only; `inf`, `nan` and exponent forms stay symbols.
fn parse_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let starts_numeric = bytes.first().is_some_and(|b| b.is_ascii_digit() || *b == b'.');
    if !starts_numeric || !bytes.iter().all(|b| b.is_ascii_digit() || *b == b'.') {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn token<'r>(text: &str, registry: &'r Registry) -> Token<'r> {
        let mut rng = StepRng::new(0, 1);
        Token::from_text(text, registry, &mut rng).unwrap()
    }

    #[test]
    fn classifies_pieces() {
        let registry = Registry::builtin();
        assert_eq!(token("42", &registry).category(), TokenCategory::Number);
        assert_eq!(token("4.25", &registry).numeric_value(), Some(4.25));
        assert_eq!(token(",", &registry).category(), TokenCategory::ArgumentSeparator);
        assert_eq!(token("(", &registry).category(), TokenCategory::LeftParen);
        assert_eq!(token(")", &registry).category(), TokenCategory::RightParen);
        assert_eq!(token("+", &registry).category(), TokenCategory::Operator);
        assert_eq!(token("max", &registry).category(), TokenCategory::Function);
        assert_eq!(token("@a", &registry).category(), TokenCategory::Invalid);
        assert_eq!(token("nan", &registry).category(), TokenCategory::Invalid);
        assert_eq!(token("1.2.3", &registry).category(), TokenCategory::Invalid);
    }

    #[test]
    fn operand_counts_start_at_one_for_callables() {
        let registry = Registry::builtin();
        assert_eq!(token("sin", &registry).operand_count, 1);
        assert_eq!(token("*", &registry).operand_count, 1);
        assert_eq!(token("7", &registry).operand_count, 0);
    }

    #[test]
    fn constants_fold_into_numbers() {
        let registry = Registry::builtin();
        let pi = token("pi", &registry);
        assert_eq!(pi.category(), TokenCategory::Number);
        assert_eq!(pi.numeric_value(), Some(std::f64::consts::PI));
        assert_eq!(pi.text, "3.141593");
        assert!(pi.spec().is_none());
    }

    #[test]
    fn numbers_are_rerendered() {
        let registry = Registry::builtin();
        assert_eq!(token("3", &registry).text, "3.0");
        assert_eq!(token("0.1250000", &registry).text, "0.125");
    }

    #[test]
    fn negation_marker() {
        let registry = Registry::builtin();
        assert!(token("neg", &registry).is_negation());
        assert!(!token("-", &registry).is_negation());
    }
}
