use std::io;
use std::process;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Conventional status for a process ended by SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptAction {
    Stop,
    Exit(i32),
}

/// Cloneable stop flag that can also interrupt a pending sleep.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        if let Ok(mut stopped) = lock.lock() {
            *stopped = true;
        }
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        let (lock, _) = &*self.inner;
        lock.lock().map(|stopped| *stopped).unwrap_or(true)
    }

    /// The first interrupt asks the loop to stop. Another one while it is
    /// still winding down (for example stuck in a request) ends the process.
    pub fn on_interrupt(&self) -> InterruptAction {
        if self.is_triggered() {
            return InterruptAction::Exit(INTERRUPTED_EXIT_CODE);
        }
        self.trigger();
        InterruptAction::Stop
    }

    /// Sleeps up to `timeout`. Returns `true` when woken by `trigger`.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut stopped = match lock.lock() {
            Ok(guard) => guard,
            Err(_) => return true,
        };
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            stopped = match cvar.wait_timeout(stopped, deadline - now) {
                Ok((guard, _)) => guard,
                Err(_) => return true,
            };
        }
        true
    }
}

/// Spawns a listener thread that stays registered for the life of the
/// process: Ctrl-C triggers `signal`, a second Ctrl-C exits with 130.
pub fn install_ctrl_c(signal: ShutdownSignal) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                loop {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        warn!(error = %err, "cannot listen for ctrl-c");
                        return;
                    }
                    match signal.on_interrupt() {
                        InterruptAction::Stop => {
                            info!("interrupt received, stopping after the current step (ctrl-c again to quit now)")
                        }
                        InterruptAction::Exit(code) => {
                            warn!("second interrupt, exiting");
                            process::exit(code);
                        }
                    }
                }
            });
        })?;
    Ok(())
}
