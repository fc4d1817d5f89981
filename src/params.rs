use crate::error::EquationError;

/// Named placeholders (such as `@a`) substituted into formula text before solving.
///
/// Only numeric values are kept. A placeholder with a blank or non-numeric
/// value is left in the formula, where it tokenizes as unrecognized text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: Vec<(String, f64)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Parse and store `raw`; returns false (and stores nothing) when it is not a number.
    pub fn set(&mut self, placeholder: &str, raw: &str) -> bool {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.set_value(placeholder, value);
                true
            }
            _ => false,
        }
    }

    pub fn set_value(&mut self, placeholder: &str, value: f64) {
        match self.values.iter_mut().find(|(name, _)| name == placeholder) {
            Some(entry) => entry.1 = value,
            None => self.values.push((placeholder.to_string(), value)),
        }
    }

    pub fn get(&self, placeholder: &str) -> Option<f64> {
        self.values.iter().find(|(name, _)| name == placeholder).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameters from a flat JSON object: `{"@a": 2, "@b": "3.5"}`.
    /// Nulls and non-numeric strings are skipped like blank inputs.
    pub fn from_json(json: &str) -> Result<Self, EquationError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| EquationError::Parameters(format!("invalid JSON: {}", e)))?;
        let serde_json::Value::Object(map) = value else {
            return Err(EquationError::Parameters("JSON must be an object with placeholder keys".into()));
        };

        let mut params = Self::new();
        for (name, value) in map {
            match value {
                serde_json::Value::Number(n) => {
                    if let Some(v) = n.as_f64() {
                        params.set_value(&name, v);
                    }
                }
                serde_json::Value::String(s) => {
                    params.set(&name, &s);
                }
                serde_json::Value::Null => {}
                other => {
                    return Err(EquationError::Parameters(format!("{} must be a number, got {}", name, other)));
                }
            }
        }
        Ok(params)
    }

    /// Replace every placeholder with its value padded by spaces.
    /// Longer placeholders go first so `@ab` is not split by `@a`.
    pub fn apply(&self, formula: &str) -> String {
        let mut ordered: Vec<&(String, f64)> = self.values.iter().filter(|(name, _)| !name.is_empty()).collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut text = formula.to_string();
        for (name, value) in ordered {
            text = text.replace(name.as_str(), &format!(" {} ", value));
        }
        text
    }
}
