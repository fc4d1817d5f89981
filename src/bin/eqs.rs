use eqsolve::{batch, render_decimal, Engine, EngineConfig, FormattedResult, Parameters, SymbolKind};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

fn print_usage() {
    eprintln!("Usage: eqs \"formula\" [options] [@name=value ...]");
    eprintln!("       eqs --file PATH [options] [@name=value ...]");
    eprintln!("");
    eprintln!("Options:");
    eprintln!("  --output-json    Output result in JSON format with every output and timing");
    eprintln!("  --json JSON      Use JSON object for placeholder values");
    eprintln!("  --seed N         Seed rand/randbetween for reproducible results");
    eprintln!("  --file PATH      Solve one formula per line, in parallel");
    eprintln!("  --threads N      Worker threads for --file (default: CPU count)");
    eprintln!("  --list           List operators, functions and constants");
    eprintln!("");
    eprintln!("Examples:");
    eprintln!("  eqs \"((3+5)/@a)*pi\" @a=2");
    eprintln!("  eqs \"min(3,1,4,1,5)\" --output-json");
    eprintln!("  eqs \"@x * @y\" --json '{{\"@x\": 19.99, \"@y\": 3}}'");
    eprintln!("  eqs --file formulas.txt --threads 4");
    eprintln!("");
    eprintln!("Environment: EQSOLVE_SEED, EQSOLVE_THREADS, RUST_LOG");
}

fn exit_usage(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Run `eqs` without arguments for usage.");
    std::process::exit(1);
}

fn main() {
    eqsolve::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }

    let mut config = EngineConfig::from_env();
    let mut formula: Option<String> = None;
    let mut file: Option<String> = None;
    let mut params = Parameters::new();
    let mut output_json = false;
    let mut list = false;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--output-json" => output_json = true,
            "--list" => list = true,
            "--json" | "--seed" | "--threads" | "--file" => {
                let Some(value) = args.get(i + 1) else {
                    exit_usage(&format!("{} requires a value", arg));
                };
                match arg.as_str() {
                    "--json" => match Parameters::from_json(value) {
                        Ok(parsed) => {
                            for (name, v) in parsed.iter() {
                                params.set_value(name, v);
                            }
                        }
                        Err(e) => exit_usage(&e.to_string()),
                    },
                    "--seed" => match value.parse::<u64>() {
                        Ok(seed) => config = config.with_seed(seed),
                        Err(_) => exit_usage("--seed expects an unsigned integer"),
                    },
                    "--threads" => match value.parse::<usize>() {
                        Ok(threads) => config = config.with_threads(threads),
                        Err(_) => exit_usage("--threads expects a positive integer"),
                    },
                    _ => file = Some(value.clone()),
                }
                i += 1;
            }
            _ if formula.is_none() && file.is_none() && !arg.starts_with("--") && !is_assignment(arg) => {
                formula = Some(arg.clone());
            }
            _ => match arg.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    if !params.set(name, value) {
                        eprintln!("Warning: ignoring non-numeric value for {}: '{}'", name, value);
                    }
                }
                _ => exit_usage(&format!("invalid argument '{}'. Use format: @name=value", arg)),
            },
        }
        i += 1;
    }

    let engine = Engine::from_config(&config);

    if list {
        list_symbols(&engine);
        return;
    }

    if let Some(path) = file {
        std::process::exit(run_file(engine, &path, &params, config.threads));
    }

    let Some(formula) = formula else {
        exit_usage("no formula given");
    };

    let start_time = Instant::now();
    let result = engine.solve(&params.apply(&formula));
    let execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(value) => {
            if output_json {
                match FormattedResult::new(value) {
                    Ok(formatted) => println!("{}", format_json_output(&formatted, execution_time_ms)),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(2);
                    }
                }
            } else {
                println!("{}", render_decimal(value));
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

/// An argument shaped like `@a=2` rather than a formula.
fn is_assignment(arg: &str) -> bool {
    match arg.split_once('=') {
        Some((name, _)) => !name.is_empty() && !name.contains(|c: char| "()+-*/%^!,".contains(c)),
        None => false,
    }
}

fn run_file(engine: Engine, path: &str, params: &Parameters, threads: usize) -> i32 {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", path, e);
            return 1;
        }
    };

    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    let equations = lines.iter().map(|line| params.apply(line)).collect();

    let results = batch::solve_all(Arc::new(engine), equations, threads);

    let mut code = 0;
    for (line, result) in lines.iter().zip(results) {
        match result {
            Ok(value) => println!("{}: {}", line, render_decimal(value)),
            Err(e) => {
                println!("{}: Error: {}", line, e);
                code = 2;
            }
        }
    }
    code
}

fn list_symbols(engine: &Engine) {
    let registry = engine.registry();
    for symbol in registry.symbols() {
        let Some(spec) = registry.lookup(symbol) else { continue };
        let arity = match (spec.kind(), spec.max_arity()) {
            (SymbolKind::Constant, _) => "constant".to_string(),
            (SymbolKind::Operator, _) => format!("operator, {} operand(s), precedence {}", spec.min_arity(), spec.precedence()),
            (SymbolKind::Function, Some(max)) if max == spec.min_arity() => format!("function, {} argument(s)", max),
            (SymbolKind::Function, Some(max)) => format!("function, {}..{} arguments", spec.min_arity(), max),
            (SymbolKind::Function, None) => format!("function, {}+ arguments", spec.min_arity()),
        };
        match spec.description() {
            Some(description) => println!("{:<12} {} - {}", symbol, arity, description),
            None => println!("{:<12} {}", symbol, arity),
        }
    }
}

fn format_json_output(formatted: &FormattedResult, execution_time_ms: f64) -> String {
    let output = json!({
        "result": formatted.float,
        "text": formatted.text,
        "money": formatted.money,
        "truncated": formatted.truncated,
        "rounded": formatted.rounded,
        "execution_time": format!("{:.2} ms", execution_time_ms)
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
