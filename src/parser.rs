use crate::error::EquationError;
use crate::token::{Token, TokenKind};

/// Infix to postfix conversion (shunting-yard).
///
/// `functions` holds indices into `stack` for every function whose argument
/// list is still open, innermost last, so separators can bump the right
/// token's operand count in place.
pub struct Parser<'r> {
    output: Vec<Token<'r>>,
    stack: Vec<Token<'r>>,
    functions: Vec<usize>,
}

impl<'r> Parser<'r> {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            stack: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn parse(mut self, tokens: Vec<Token<'r>>) -> Result<Vec<Token<'r>>, EquationError> {
        for token in tokens {
            match token.kind {
                TokenKind::Invalid => {
                    tracing::trace!(text = %token.text, "dropping unrecognized token");
                }
                TokenKind::Number(_) => self.output.push(token),
                TokenKind::Function(_) => {
                    self.functions.push(self.stack.len());
                    self.stack.push(token);
                }
                TokenKind::ArgumentSeparator => self.separator()?,
                TokenKind::Operator(spec) => {
                    while let Some(top) = self.stack.last() {
                        let top_precedence = match top.kind {
                            TokenKind::Operator(s) | TokenKind::Function(s) => s.precedence(),
                            _ => break,
                        };
                        let yields = if spec.is_left_associative() {
                            spec.precedence() <= top_precedence
                        } else {
                            spec.precedence() < top_precedence
                        };
                        if !yields {
                            break;
                        }
                        self.pop_to_output();
                    }
                    self.stack.push(token);
                }
                TokenKind::LeftParen => self.stack.push(token),
                TokenKind::RightParen => self.right_paren()?,
            }
        }

        while let Some(top) = self.stack.last() {
            if matches!(top.kind, TokenKind::LeftParen) {
                return Err(EquationError::UnbalancedParentheses);
            }
            self.pop_to_output();
        }
        Ok(self.output)
    }

    /// `,` closes one argument of the innermost open function.
    ///
    /// Operators still pending inside that argument are flushed to the output
    /// first. This matters most for `neg`, which has no closing delimiter of
    /// its own: in `max(-1, 2)` the marker must be emitted before `2` is read.
    fn separator(&mut self) -> Result<(), EquationError> {
        let Some(&function) = self.functions.last() else {
            return Err(EquationError::MisplacedSeparator);
        };
        self.stack[function].operand_count += 1;

        while let Some(top) = self.stack.last() {
            if matches!(top.kind, TokenKind::LeftParen) || self.stack.len() - 1 == function {
                break;
            }
            self.pop_to_output();
        }
        Ok(())
    }

    fn right_paren(&mut self) -> Result<(), EquationError> {
        // A stray `)` before anything was opened is tolerated
        if self.stack.is_empty() {
            return Ok(());
        }

        loop {
            match self.stack.last() {
                None => return Err(EquationError::UnbalancedParentheses),
                Some(top) if matches!(top.kind, TokenKind::LeftParen) => break,
                Some(_) => self.pop_to_output(),
            }
        }
        self.stack.pop();

        // The group was an argument list: its function is complete
        if matches!(self.stack.last().map(|t| t.kind), Some(TokenKind::Function(_))) {
            self.pop_to_output();
        }
        Ok(())
    }

    /// Move the top of the operator stack to the output, closing its
    /// argument list if it was a function.
    fn pop_to_output(&mut self) {
        if let Some(token) = self.stack.pop() {
            while self.functions.last().is_some_and(|&i| i >= self.stack.len()) {
                self.functions.pop();
            }
            self.output.push(token);
        }
    }
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a tokenized infix formula to postfix order.
pub fn to_postfix(tokens: Vec<Token<'_>>) -> Result<Vec<Token<'_>>, EquationError> {
    Parser::new().parse(tokens)
}

/// Space-joined rendering of a postfix sequence, for diagnostics.
pub fn render(postfix: &[Token<'_>]) -> String {
    postfix.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
}
