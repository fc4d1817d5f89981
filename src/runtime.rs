use crate::error::EquationError;
use crate::token::{Token, TokenKind};
use rand::RngCore;

/// Evaluate a postfix sequence down to a single value.
///
/// Operators consume exactly their declared arity; functions consume the
/// operand count the converter recorded for them. An operator or function
/// reached while the value stack is empty is skipped.
pub fn evaluate(postfix: &[Token<'_>], rng: &mut dyn RngCore) -> Result<f64, EquationError> {
    let mut stack: Vec<f64> = Vec::with_capacity(postfix.len());
    let mut operands: Vec<f64> = Vec::new();

    for token in postfix {
        let (spec, count) = match token.kind {
            TokenKind::Number(value) => {
                stack.push(value);
                continue;
            }
            TokenKind::Operator(spec) => (spec, spec.min_arity()),
            TokenKind::Function(spec) => {
                if token.operand_count < spec.min_arity() {
                    return Err(spec.arity_error(token.operand_count));
                }
                (spec, token.operand_count)
            }
            // Never emitted by the converter
            TokenKind::ArgumentSeparator | TokenKind::LeftParen | TokenKind::RightParen | TokenKind::Invalid => continue,
        };

        if stack.is_empty() {
            tracing::trace!(symbol = spec.symbol(), "no operands on the stack, skipping");
            continue;
        }
        if stack.len() < count {
            return Err(EquationError::EmptyExpression);
        }

        // Most recent first: p[0] is the operand written last
        operands.clear();
        operands.extend(stack.drain(stack.len() - count..).rev());
        stack.push(spec.calculate(&operands, rng)?);
    }

    if stack.len() > 1 {
        return Err(EquationError::InvalidFormula { remaining: stack.len() });
    }
    stack.pop().ok_or(EquationError::EmptyExpression)
}
