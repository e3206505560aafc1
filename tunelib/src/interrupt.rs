use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

// The flag signal handlers write to. Only ever read with an atomic load from the handler.
static SIGNAL_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn on_signal(_signal: libc::c_int) {
    if let Some(flag) = SIGNAL_FLAG.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// A cooperative stop request, shared between the driver, the evaluator, and the signal handler
///
/// Nothing is ever preempted: the driver looks at the flag between iterations, and the evaluator
/// while it waits on the simulator
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// A flag nothing but [`Interrupt::raise`] will set
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes SIGINT and SIGTERM to a new flag. Can only be done once per process.
    pub fn install() -> io::Result<Self> {
        let interrupt = Self::new();
        SIGNAL_FLAG
            .set(Arc::clone(&interrupt.flag))
            .map_err(|_| io::Error::new(io::ErrorKind::AlreadyExists, "signal handlers are already installed"))?;
        for signal in [libc::SIGINT, libc::SIGTERM] {
            // The handler only performs an atomic store
            let previous = unsafe { libc::signal(signal, on_signal as libc::sighandler_t) };
            if previous == libc::SIG_ERR {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(interrupt)
    }

    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
