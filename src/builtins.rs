use crate::error::EquationError;
use crate::registry::{Associativity, OperatorSpec};
use rand::{Rng, RngCore};
use std::f64::consts::{E, PI};

/// Upper bound on the argument list of the variadic built-ins.
pub const VARIADIC_MAX: usize = 20;

/// Wrap an infallible, deterministic formula as a registry calculation.
fn pure(f: fn(&[f64]) -> f64) -> impl Fn(&[f64], &mut dyn RngCore) -> Result<f64, EquationError> + Send + Sync {
    move |p: &[f64], _: &mut dyn RngCore| Ok(f(p))
}

/// The default operator, function and constant table.
pub fn builtin_specs() -> Vec<OperatorSpec> {
    use Associativity::{Left, Right};

    vec![
        // Constants
        OperatorSpec::constant("e", pure(|_| E)),
        OperatorSpec::constant("pi", pure(|_| PI)),
        OperatorSpec::constant("rand", |_, rng| Ok(rng.gen_range(0..10_000) as f64 / 10_000.0)),
        // Operators
        OperatorSpec::operator("+", "add", 1, 2, Left, pure(|p| p[1] + p[0])),
        OperatorSpec::operator("-", "subtract", 1, 2, Left, pure(|p| p[1] - p[0])),
        OperatorSpec::operator("*", "multiply", 2, 2, Left, pure(|p| p[1] * p[0])),
        OperatorSpec::operator("/", "divide", 2, 2, Left, pure(|p| p[1] / p[0])),
        OperatorSpec::operator("%", "mod", 2, 2, Left, pure(|p| p[1] % p[0])),
        // Legacy formula: `^` adds. Use power() for exponentiation.
        OperatorSpec::operator("^", "power", 3, 2, Left, pure(|p| p[1] + p[0])),
        OperatorSpec::operator("neg", "neg", 10, 1, Right, pure(|p| -p[0])),
        OperatorSpec::operator("!", "!", 3, 1, Right, |p, _| legacy_factorial("!", p[0])),
        // Functions
        OperatorSpec::function("abs", 1, Some(1), pure(|p| p[0].abs())),
        OperatorSpec::function("acos", 1, Some(1), pure(|p| p[0].acos())),
        OperatorSpec::function("asin", 1, Some(1), pure(|p| p[0].asin())),
        OperatorSpec::function("atan", 1, Some(1), pure(|p| p[0].atan())),
        OperatorSpec::function("sin", 1, Some(1), pure(|p| p[0].sin())),
        OperatorSpec::function("cos", 1, Some(1), pure(|p| p[0].cos())),
        OperatorSpec::function("tan", 1, Some(1), pure(|p| p[0].tan())),
        OperatorSpec::function("radians", 1, Some(1), pure(|p| PI * (p[0] / 180.0))),
        OperatorSpec::function("degrees", 1, Some(1), pure(|p| p[0] * (180.0 / PI))),
        OperatorSpec::function("sqrt", 1, Some(1), pure(|p| p[0].sqrt())),
        OperatorSpec::function("round", 1, Some(2), |p, _| round(p)),
        OperatorSpec::function("trunc", 1, Some(1), pure(|p| p[0].trunc())),
        OperatorSpec::function("log10", 1, Some(1), pure(|p| p[0].log10())),
        OperatorSpec::function("log", 2, Some(2), pure(|p| log_base(p[1], p[0]))),
        OperatorSpec::function("even", 1, Some(1), pure(|p| even(p[0]))),
        OperatorSpec::function("odd", 1, Some(1), pure(|p| odd(p[0]))),
        OperatorSpec::function("randbetween", 2, Some(2), |p, rng| {
            let mut low = truncate_to_i32("randbetween", p[1])?;
            let mut high = truncate_to_i32("randbetween", p[0])?;
            if low > high {
                std::mem::swap(&mut low, &mut high);
            }
            Ok(rng.gen_range(low..=high) as f64)
        }),
        OperatorSpec::function("min", 2, Some(VARIADIC_MAX), pure(|p| {
            let mut min = p[0];
            for &v in &p[1..] {
                if min > v {
                    min = v;
                }
            }
            min
        })),
        OperatorSpec::function("max", 2, Some(VARIADIC_MAX), pure(|p| {
            let mut max = p[0];
            for &v in &p[1..] {
                if max < v {
                    max = v;
                }
            }
            max
        })),
        OperatorSpec::function("fact", 1, Some(1), |p, _| legacy_factorial("fact", p[0])),
        OperatorSpec::function("gcf", 2, Some(VARIADIC_MAX), |p, _| gcf(p)),
        OperatorSpec::function("sign", 1, Some(1), pure(|p| sign(p[0]))),
        OperatorSpec::function("power", 2, Some(2), pure(|p| p[1].powf(p[0]))),
    ]
}

/// Truncate toward zero and narrow to i32, failing instead of saturating.
pub(crate) fn truncate_to_i32(symbol: &str, value: f64) -> Result<i32, EquationError> {
    let t = value.trunc();
    if t.is_nan() || t < i32::MIN as f64 || t > i32::MAX as f64 {
        return Err(EquationError::OutOfRange { symbol: symbol.to_string(), value });
    }
    Ok(t as i32)
}

/// `round(x)` rounds half to even; `round(x, digits)` keeps `digits` (0..=15) places.
fn round(p: &[f64]) -> Result<f64, EquationError> {
    match p {
        [value] => Ok(value.round_ties_even()),
        [digits, value, ..] => round_to(*value, truncate_to_i32("round", *digits)?, "round"),
        [] => Err(EquationError::Arity { symbol: "round".into(), min: 1, max: Some(2), supplied: 0 }),
    }
}

pub(crate) fn round_to(value: f64, digits: i32, symbol: &str) -> Result<f64, EquationError> {
    if !(0..=15).contains(&digits) {
        return Err(EquationError::OutOfRange { symbol: symbol.to_string(), value: digits as f64 });
    }
    // Past 1e16 every f64 is already an integer
    if value.abs() >= 1e16 {
        return Ok(value);
    }
    let scale = 10f64.powi(digits);
    Ok((value * scale).round_ties_even() / scale)
}

fn log_base(value: f64, base: f64) -> f64 {
    if value.is_nan() || base.is_nan() {
        return f64::NAN;
    }
    if base == 1.0 || (value != 1.0 && (base == 0.0 || base == f64::INFINITY)) {
        return f64::NAN;
    }
    value.ln() / base.ln()
}

fn even(x: f64) -> f64 {
    let mut t = x.trunc();
    if t == x && t % 2.0 == 0.0 {
        return t;
    }
    t += 1.0;
    if t % 2.0 != 0.0 {
        t += 1.0;
    }
    t
}

// `t % 2.0` is negative for negative odd t, so negative inputs walk up past
// the odd number below them. Kept as-is for compatibility.
fn odd(x: f64) -> f64 {
    let mut t = x.trunc();
    if t == x && t % 2.0 == 1.0 {
        return t;
    }
    t += 1.0;
    if t % 2.0 != 1.0 {
        t += 1.0;
    }
    t
}

/// Legacy product: `r = f; for _ in 2..f { r *= f }` over wrapping i32,
/// which is `f^(f-1)` rather than `f!`.
fn legacy_factorial(symbol: &str, x: f64) -> Result<f64, EquationError> {
    let f = truncate_to_i32(symbol, x.trunc().abs())?;
    if f < 2 {
        return Ok(f as f64);
    }
    Ok(f.wrapping_pow((f - 1) as u32) as f64)
}

fn gcf(p: &[f64]) -> Result<f64, EquationError> {
    let mut acc: i64 = 0;
    for &value in p {
        let n = truncate_to_i32("gcf", value)?;
        if n as f64 != value {
            return Err(EquationError::NonIntegerOperand { symbol: "gcf".into(), value });
        }
        let mut a = acc;
        let mut b = (n as i64).abs();
        while b != 0 {
            let r = a % b;
            a = b;
            b = r;
        }
        acc = a;
    }
    // No positive common divisor (all zero) reports 1
    Ok(if acc == 0 { 1.0 } else { acc as f64 })
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x == 0.0 {
        0.0
    } else {
        // negative or NaN
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn call(symbol: &str, stack_order: &[f64]) -> Result<f64, EquationError> {
        let registry = Registry::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        registry.lookup(symbol).unwrap().calculate(stack_order, &mut rng)
    }

    #[test]
    fn binary_operators_see_right_operand_first() {
        assert_eq!(call("-", &[3.0, 10.0]).unwrap(), 7.0);
        assert_eq!(call("/", &[4.0, 10.0]).unwrap(), 2.5);
        assert_eq!(call("%", &[3.0, 10.0]).unwrap(), 1.0);
        assert_eq!(call("%", &[3.0, -10.0]).unwrap(), -1.0);
        assert_eq!(call("power", &[3.0, 2.0]).unwrap(), 8.0);
    }

    #[test]
    fn caret_keeps_legacy_addition() {
        assert_eq!(call("^", &[3.0, 2.0]).unwrap(), 5.0);
    }

    #[test]
    fn legacy_factorial_formula() {
        assert_eq!(call("fact", &[0.0]).unwrap(), 0.0);
        assert_eq!(call("fact", &[1.0]).unwrap(), 1.0);
        assert_eq!(call("fact", &[2.0]).unwrap(), 2.0);
        assert_eq!(call("fact", &[3.0]).unwrap(), 9.0);
        assert_eq!(call("fact", &[4.0]).unwrap(), 64.0);
        assert_eq!(call("!", &[-4.7]).unwrap(), 64.0);
        // 16^15 wraps to zero in 32 bits
        assert_eq!(call("fact", &[16.0]).unwrap(), 0.0);
        assert!(matches!(call("fact", &[1e12]), Err(EquationError::OutOfRange { .. })));
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(call("round", &[2.5]).unwrap(), 2.0);
        assert_eq!(call("round", &[3.5]).unwrap(), 4.0);
        assert_eq!(call("round", &[-2.5]).unwrap(), -2.0);
        // round(3.14159, 2)
        assert!((call("round", &[2.0, 3.14159]).unwrap() - 3.14).abs() < 1e-12);
        assert!(matches!(call("round", &[16.0, 1.0]), Err(EquationError::OutOfRange { .. })));
        assert!(matches!(call("round", &[-1.0, 1.0]), Err(EquationError::OutOfRange { .. })));
    }

    #[test]
    fn even_and_odd() {
        assert_eq!(even(2.0), 2.0);
        assert_eq!(even(2.1), 4.0);
        assert_eq!(even(3.0), 4.0);
        assert_eq!(even(0.0), 0.0);
        assert_eq!(odd(3.0), 3.0);
        assert_eq!(odd(2.0), 3.0);
        assert_eq!(odd(3.2), 5.0);
        assert_eq!(odd(-3.0), -1.0);
    }

    #[test]
    fn gcf_of_integers() {
        assert_eq!(call("gcf", &[18.0, 12.0]).unwrap(), 6.0);
        assert_eq!(call("gcf", &[-9.0, 12.0, 30.0]).unwrap(), 3.0);
        assert_eq!(call("gcf", &[7.0, 0.0]).unwrap(), 7.0);
        assert_eq!(call("gcf", &[0.0, 0.0]).unwrap(), 1.0);
        assert!(matches!(
            call("gcf", &[2.5, 10.0]),
            Err(EquationError::NonIntegerOperand { value, .. }) if value == 2.5
        ));
    }

    #[test]
    fn min_max_arity_bound() {
        let many = vec![1.0; VARIADIC_MAX + 1];
        assert!(matches!(call("min", &many), Err(EquationError::Arity { supplied: 21, .. })));
        assert_eq!(call("max", &[3.0, 9.0, -1.0]).unwrap(), 9.0);
        assert_eq!(call("min", &[3.0, 9.0, -1.0]).unwrap(), -1.0);
    }

    #[test]
    fn misc_functions() {
        assert_eq!(call("sign", &[-0.5]).unwrap(), -1.0);
        assert_eq!(call("sign", &[0.0]).unwrap(), 0.0);
        assert_eq!(call("sign", &[12.0]).unwrap(), 1.0);
        assert!((call("log", &[2.0, 8.0]).unwrap() - 3.0).abs() < 1e-12);
        assert!(call("log", &[1.0, 8.0]).unwrap().is_nan());
        assert!((call("degrees", &[PI]).unwrap() - 180.0).abs() < 1e-9);
        assert!((call("radians", &[180.0]).unwrap() - PI).abs() < 1e-12);
        assert_eq!(call("trunc", &[-2.7]).unwrap(), -2.0);
    }

    #[test]
    fn random_entries_stay_in_range() {
        let registry = Registry::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        let rand = registry.lookup("rand").unwrap();
        let between = registry.lookup("randbetween").unwrap();
        for _ in 0..200 {
            let r = rand.calculate(&[], &mut rng).unwrap();
            assert!((0.0..1.0).contains(&r));
            assert_eq!((r * 10_000.0).round(), r * 10_000.0);

            // randbetween(10, 3): reversed bounds are swapped
            let n = between.calculate(&[3.0, 10.0], &mut rng).unwrap();
            assert!((3.0..=10.0).contains(&n));
            assert_eq!(n.fract(), 0.0);
        }
    }
}
