use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use crate::cache_spec::CacheSpec;
use crate::error::EvalError;
use crate::evaluator::{parse_aat, Evaluator, SimulatorEvaluator};
use crate::interrupt::Interrupt;
use crate::io::Trace;

/// A simulator stand in: `sh -c <script> sim <flags...>`
fn shell(script: &str, trace: Trace) -> SimulatorEvaluator {
    SimulatorEvaluator::new("sh", trace).with_args(vec!["-c".to_string(), script.to_string(), "sim".to_string()])
}

fn trace_file(dir: &Path, contents: &str) -> Trace {
    let path = dir.join("bench.trace");
    fs::write(&path, contents).unwrap();
    Trace::open(&path).unwrap()
}

#[test]
fn parses_the_last_token_of_the_last_line() {
    assert_eq!(parse_aat("Running\nL1 misses: 12\nAAT: 4.25\n").unwrap(), 4.25);
    assert_eq!(parse_aat("7").unwrap(), 7.0);
    assert_eq!(parse_aat("avg access time 1e1  \n").unwrap(), 10.0);
}

#[test]
fn rejects_output_without_a_trailing_number() {
    for output in ["", "\n", "AAT: 4.25\ndone\n", "AAT: NaN", "AAT: inf", "AAT: 4.25\n\n"] {
        assert!(matches!(parse_aat(output), Err(EvalError::Parse { .. })), "{output:?}");
    }
}

#[test]
fn passes_the_spec_as_flags() {
    let dir = tempdir().unwrap();
    let script = r#"cat > /dev/null; if [ "$*" = "-c 12 -b 5 -s 3 -C 15 -B 6 -S 5 -k 2" ]; then echo "AAT: 3.5"; else echo "unexpected $*"; fi"#;
    let mut evaluator = shell(script, trace_file(dir.path(), "r 1000\n"));
    assert_eq!(evaluator.evaluate(&CacheSpec::default()).unwrap(), 3.5);
}

#[test]
fn relays_trimmed_trace_lines_then_closes_stdin() {
    let dir = tempdir().unwrap();
    let received = dir.path().join("received");
    let script = format!("cat > '{}'; echo done 1.25", received.display());
    let mut evaluator = shell(&script, trace_file(dir.path(), "r 0x1000  \n  w 0x2000\r\nr 0x3000"));
    assert_eq!(evaluator.evaluate(&CacheSpec::default()).unwrap(), 1.25);
    assert_eq!(fs::read_to_string(&received).unwrap(), "r 0x1000\nw 0x2000\nr 0x3000\n");
}

#[test]
fn empty_traces_still_close_stdin() {
    let dir = tempdir().unwrap();
    let mut evaluator = shell("wc -l | awk '{ print \"lines\", $1 }'", trace_file(dir.path(), ""));
    assert_eq!(evaluator.evaluate(&CacheSpec::default()).unwrap(), 0.0);
}

#[test]
fn large_traces_do_not_deadlock() {
    // Far more than a pipe buffer each way
    let lines = "r 0123456789abcdef 004\n".repeat(50_000);
    let mut evaluator = shell("cat; echo 2.5", Trace::from_bytes("big.trace", lines.into_bytes()));
    assert_eq!(evaluator.evaluate(&CacheSpec::default()).unwrap(), 2.5);
}

#[test]
fn simulator_that_ignores_its_input_is_fine() {
    let mut evaluator = shell("echo 6.5", Trace::from_bytes("big.trace", "r 1\n".repeat(100_000).into_bytes()));
    assert_eq!(evaluator.evaluate(&CacheSpec::default()).unwrap(), 6.5);
}

#[test]
fn non_zero_exit_is_a_failure() {
    let mut evaluator = shell("cat > /dev/null; echo 1.0; exit 3", Trace::from_bytes("t", b"r 1\n".to_vec()));
    match evaluator.evaluate(&CacheSpec::default()) {
        Err(EvalError::Exit { status }) => assert_eq!(status.code(), Some(3)),
        other => panic!("expected an exit failure, got {other:?}"),
    }
}

#[test]
fn non_numeric_output_is_a_failure() {
    let mut evaluator = shell("cat > /dev/null; echo segfault", Trace::from_bytes("t", b"r 1\n".to_vec()));
    assert!(matches!(evaluator.evaluate(&CacheSpec::default()), Err(EvalError::Parse { .. })));
}

#[test]
fn missing_simulator_is_a_failure() {
    let mut evaluator = SimulatorEvaluator::new("./definitely-not-a-simulator", Trace::from_bytes("t", Vec::new()));
    assert!(matches!(evaluator.evaluate(&CacheSpec::default()), Err(EvalError::Spawn { .. })));
}

#[test]
fn hung_simulator_times_out() {
    let mut evaluator = shell("sleep 10; echo 1.0", Trace::from_bytes("t", Vec::new()))
        .with_timeout(Some(Duration::from_millis(200)));
    let start = Instant::now();
    assert!(matches!(evaluator.evaluate(&CacheSpec::default()), Err(EvalError::Timeout(_))));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn raised_interrupt_stops_a_running_simulator() {
    let interrupt = Interrupt::new();
    let mut evaluator = shell("sleep 10; echo 1.0", Trace::from_bytes("t", Vec::new())).with_interrupt(interrupt.clone());
    interrupt.raise();
    let start = Instant::now();
    assert!(matches!(evaluator.evaluate(&CacheSpec::default()), Err(EvalError::Interrupted)));
    assert!(start.elapsed() < Duration::from_secs(5));
}
