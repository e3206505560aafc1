use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use crate::cache_spec::CacheSpec;
use crate::config::SimulatorConfig;
use crate::error::EvalError;
use crate::interrupt::Interrupt;
use crate::io::Trace;

// How often a running simulator is checked for completion when it can be cut short
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Measures the average access time of a cache configuration. Lower is better.
///
/// Implementations are called once per candidate, sequentially
pub trait Evaluator {
    /// Returns the AAT of the configuration, or why it couldn't be measured
    ///
    /// # Arguments
    ///
    /// * `spec`: A spec which has already passed the feasibility check
    ///
    /// returns: Result<f64, EvalError>
    fn evaluate(&mut self, spec: &CacheSpec) -> Result<f64, EvalError>;
}

impl<F> Evaluator for F
where
    F: FnMut(&CacheSpec) -> Result<f64, EvalError>,
{
    fn evaluate(&mut self, spec: &CacheSpec) -> Result<f64, EvalError> {
        self(spec)
    }
}

/// Runs the external simulator once per evaluation
///
/// The configuration is passed as `-c -b -s -C -B -S -k` flags, the trace is written to its stdin a line
/// at a time, and the AAT is the last token of the last line it prints
pub struct SimulatorEvaluator {
    program: PathBuf,
    args: Vec<String>,
    trace: Trace,
    timeout: Option<Duration>,
    interrupt: Option<Interrupt>,
}

impl SimulatorEvaluator {
    pub fn new(program: impl Into<PathBuf>, trace: Trace) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            trace,
            timeout: None,
            interrupt: None,
        }
    }

    pub fn from_config(config: &SimulatorConfig, trace: Trace) -> Self {
        Self::new(config.program.clone(), trace)
            .with_args(config.args.clone())
            .with_timeout(config.timeout())
    }

    /// Arguments placed before the cache flags
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kills the simulator early if the interrupt is raised while it's running
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, spec: &CacheSpec) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(spec.to_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());
        // Its own process group, so a terminal interrupt reaches only us and we decide what
        // happens to the run in flight
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, EvalError> {
        if self.timeout.is_none() && self.interrupt.is_none() {
            return Ok(child.wait()?);
        }
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if let Some(timeout) = self.timeout.filter(|t| start.elapsed() >= *t) {
                kill(child);
                return Err(EvalError::Timeout(timeout));
            }
            if self.interrupt.as_ref().is_some_and(Interrupt::is_raised) {
                kill(child);
                return Err(EvalError::Interrupted);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Evaluator for SimulatorEvaluator {
    fn evaluate(&mut self, spec: &CacheSpec) -> Result<f64, EvalError> {
        let mut child = self
            .command(spec)
            .spawn()
            .map_err(|source| EvalError::Spawn { program: self.program.clone(), source })?;
        let stdin = child.stdin.take().ok_or_else(|| io::Error::other("simulator stdin wasn't captured"))?;
        let mut stdout = child.stdout.take().ok_or_else(|| io::Error::other("simulator stdout wasn't captured"))?;
        debug!(pid = child.id(), args = ?spec.to_args(), "Simulator started");

        let trace = &self.trace;
        // Feed and drain concurrently, the simulator may block on a full stdout pipe before it
        // has read the whole trace
        let (status, written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || relay_trace(trace, stdin));
            let reader = scope.spawn(move || {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf).map(|_| buf)
            });
            let status = self.wait(&mut child);
            let written = writer.join().unwrap_or_else(|_| Err(io::Error::other("trace writer panicked")));
            let output = reader.join().unwrap_or_else(|_| Err(io::Error::other("output reader panicked")));
            (status, written, output)
        });

        let status = status?;
        if !status.success() {
            return Err(EvalError::Exit { status });
        }
        match written {
            // The simulator is allowed to stop reading once it has what it needs
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }
        parse_aat(&String::from_utf8_lossy(&output?))
    }
}

/// Extracts the AAT from simulator output: the last whitespace separated token of the last line
pub fn parse_aat(output: &str) -> Result<f64, EvalError> {
    let line = output.lines().next_back().unwrap_or_default();
    line.split_whitespace()
        .next_back()
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|aat| aat.is_finite())
        .ok_or_else(|| EvalError::Parse { line: line.to_string() })
}

fn relay_trace(trace: &Trace, stdin: ChildStdin) -> io::Result<()> {
    let mut writer = BufWriter::new(stdin);
    for line in trace.lines() {
        writer.write_all(line)?;
        writer.write_all(b"\n")?;
    }
    // Dropping the writer closes stdin, which is the simulator's end of input
    writer.flush()
}

fn kill(child: &mut Child) {
    // Take the whole group down, the simulator may be a wrapper script with children holding the
    // pipes open
    #[cfg(unix)]
    unsafe {
        libc::kill(-(child.id() as libc::pid_t), libc::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}
