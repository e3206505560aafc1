#[cfg(unix)]
mod evaluator;
mod feasibility;
