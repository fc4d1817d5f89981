use eqsolve::{solve, solve_with, Parameters};
use std::f64::consts::PI;

fn approx(v: f64, b: f64) -> bool { (v - b).abs() < 1e-9 }

#[test]
fn precedence_and_parentheses() {
    assert!(approx(solve("2 + 3").unwrap(), 5.0));
    assert!(approx(solve("2 + 3 * 4").unwrap(), 14.0));
    assert!(approx(solve("(2 + 3) * 4").unwrap(), 20.0));
    assert!(approx(solve("(3+5)/2").unwrap(), 4.0));
    assert!(approx(solve("((3+5)/2)*pi").unwrap(), 4.0 * PI));
}

#[test]
fn left_associative_chains() {
    assert!(approx(solve("10 - 4 - 3").unwrap(), 3.0));
    assert!(approx(solve("100 / 10 / 5").unwrap(), 2.0));
    assert!(approx(solve("10 / 4").unwrap(), 2.5));
    assert!(approx(solve("17 % 5").unwrap(), 2.0));
}

#[test]
fn caret_adds() {
    assert!(approx(solve("2^3").unwrap(), 5.0));
    assert!(approx(solve("2 * 3 ^ 4").unwrap(), 14.0));
}

#[test]
fn unary_minus() {
    assert!(approx(solve("-4 - 5 + -6").unwrap(), -15.0));
    assert!(approx(solve("5--3").unwrap(), 8.0));
    assert!(approx(solve("2 * -3").unwrap(), -6.0));
    assert!(approx(solve("-(2 + 3)").unwrap(), -5.0));
    assert!(approx(solve("(1 + 2) - 3").unwrap(), 0.0));
    assert!(approx(solve("- - 6").unwrap(), 6.0));
    assert!(approx(solve("pi - 1").unwrap(), PI - 1.0));
}

#[test]
fn constants() {
    assert!(approx(solve("e").unwrap(), std::f64::consts::E));
    assert!(approx(solve("2 * pi").unwrap(), 2.0 * PI));
    let r = solve("rand").unwrap();
    assert!((0.0..1.0).contains(&r));
}

#[test]
fn case_and_spacing_do_not_matter() {
    assert_eq!(solve("MAX(1, 2)").unwrap(), solve("max(1,2)").unwrap());
    assert_eq!(solve("  Sqrt ( 16 )  ").unwrap(), 4.0);
    assert_eq!(solve("PI").unwrap(), PI);
}

#[test]
fn repeated_solves_agree() {
    let formula = "min(3, 1, 4) + max(1, 5, 9) * sqrt(2)";
    let first = solve(formula).unwrap();
    for _ in 0..10 {
        assert_eq!(solve(formula).unwrap(), first);
    }
}

#[test]
fn nested_calls() {
    assert!(approx(solve("max(min(4, 8), abs(-6), 2)").unwrap(), 6.0));
    assert!(approx(solve("max(1+2, 3*3, 4)").unwrap(), 9.0));
    assert!(approx(solve("sqrt(abs(-16)) + round(2.5)").unwrap(), 6.0));
}

#[test]
fn placeholder_substitution() {
    let mut params = Parameters::new();
    params.set("@a", "2");
    params.set("@ab", "10");
    assert!(approx(solve_with("((3+5)/@a)*pi", &params).unwrap(), 4.0 * PI));
    assert!(approx(solve_with("@ab - @a", &params).unwrap(), 8.0));
    assert!(approx(solve_with("-@a", &params).unwrap(), -2.0));
}
