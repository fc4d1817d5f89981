use crate::engine::Engine;
use crate::error::EquationError;
use std::sync::mpsc;
use std::sync::Arc;
use threadpool::ThreadPool;

/// Solve independent equations on a pool of `threads` workers.
///
/// Results come back in input order.
pub fn solve_all(engine: Arc<Engine>, equations: Vec<String>, threads: usize) -> Vec<Result<f64, EquationError>> {
    let count = equations.len();
    if count == 0 {
        return Vec::new();
    }

    let pool = ThreadPool::new(threads.clamp(1, count));
    let (tx, rx) = mpsc::channel();

    for (index, equation) in equations.into_iter().enumerate() {
        let engine = Arc::clone(&engine);
        let tx = tx.clone();
        pool.execute(move || {
            let result = engine.solve(&equation);
            let _ = tx.send((index, result));
        });
    }
    drop(tx);

    let mut results: Vec<Option<Result<f64, EquationError>>> = vec![None; count];
    for (index, result) in rx {
        results[index] = Some(result);
    }

    tracing::debug!(count, workers = pool.max_count(), "batch complete");
    results
        .into_iter()
        .map(|r| r.unwrap_or(Err(EquationError::Aborted)))
        .collect()
}
