use crate::error::EquationError;
use crate::registry::{Registry, SymbolKind};
use crate::token::Token;
use lazy_static::lazy_static;
use rand::RngCore;
use regex::Regex;

const NUMBER: &str = r"[0-9]+(?:\.[0-9]+)?";

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Regexes derived from a registry's symbol set.
pub(crate) struct CleaningPatterns {
    /// Numbers, parentheses and every registered symbol, longest symbol first.
    pub(crate) spacer: Regex,
    /// A value-producing token followed by a `neg` marker.
    pub(crate) negative: Regex,
}

impl CleaningPatterns {
    pub(crate) fn build(registry: &Registry) -> Result<Self, EquationError> {
        // Longest first so `sign` wins over `sin` and `log10` over `log`
        let mut symbols = registry.symbols();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let all: Vec<String> = symbols.iter().map(|s| regex::escape(s)).collect();
        let values: Vec<String> = symbols
            .iter()
            .filter(|s| {
                registry
                    .lookup(s)
                    .is_some_and(|spec| matches!(spec.kind(), SymbolKind::Function | SymbolKind::Constant))
            })
            .map(|s| regex::escape(s))
            .collect();

        let mut spacer = format!(r"(?P<m>{}|[()]", NUMBER);
        for symbol in &all {
            spacer.push('|');
            spacer.push_str(symbol);
        }
        spacer.push(')');

        let mut value = format!(r"\b(?:{}", NUMBER);
        for symbol in &values {
            value.push('|');
            value.push_str(symbol);
        }
        value.push(')');
        let negative = format!(r"(?P<v>{}|\))\sneg", value);

        Ok(Self {
            spacer: compile(&spacer)?,
            negative: compile(&negative)?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, EquationError> {
    Regex::new(pattern).map_err(|e| EquationError::registration(format!("cannot build cleaning pattern: {}", e)))
}

/// Normalize raw formula text into a single-space-delimited token stream.
///
/// Every `-` becomes the unary marker `neg`, then markers that directly follow
/// a number, function, constant or `)` turn back into binary `-`:
///
/// ```text
/// -4 - 5 + -6   →   neg 4 - 5 + neg 6
/// ```
pub fn clean(raw: &str, registry: &Registry) -> Result<String, EquationError> {
    let patterns = registry.patterns()?;
    let lowered = raw.to_lowercase();

    let spaced = patterns.spacer.replace_all(&lowered, " ${m} ");
    let collapsed = WHITESPACE.replace_all(&spaced, " ");
    let marked = collapsed.trim().replace('-', "neg");
    Ok(patterns.negative.replace_all(&marked, "${v} -").into_owned())
}

/// Clean `raw` and classify each piece.
pub fn tokenize<'r>(raw: &str, registry: &'r Registry, rng: &mut dyn RngCore) -> Result<Vec<Token<'r>>, EquationError> {
    let cleaned = clean(raw, registry)?;
    tracing::debug!(%cleaned, "cleaned formula");
    cleaned
        .split(' ')
        .filter(|piece| !piece.is_empty())
        .map(|piece| Token::from_text(piece, registry, rng))
        .collect()
}
