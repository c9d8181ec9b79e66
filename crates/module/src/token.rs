use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Lifecycle of a module.
///
/// ```text
/// Constructed ──start──▶ Running ──stop──▶ Stopping ──▶ Stopped
///      │                    │                  │
///      └───────halt─────────┴──────halt────────┴──▶ Halted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Constructed,
    Running,
    Stopping,
    Stopped,
    Halted,
}

impl ModuleState {
    /// `Stopped` and `Halted` are final.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Halted)
    }
}

/// Lock a mutex, recovering the data if a widget panicked while holding it.
/// Panics are already turned into a halt by the module, so the state behind
/// the lock is still the best information available.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Control {
    state:   ModuleState,
    /// Bumped by every `wakeup()`; sleepers compare against the value they
    /// started with.
    wakeups: u64,
    reason:  Option<String>,
}

/// Cancellation token shared by every thread of one module.
///
/// Holds the lifecycle state behind the sleep lock so that a state change and
/// the wakeup of all sleepers happen in one critical section. Cloning is cheap
/// and every clone observes the same state.
#[derive(Debug, Clone)]
pub struct CancelToken {
    shared: Arc<(Mutex<Control>, Condvar)>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let control = Control {
            state:   ModuleState::Constructed,
            wakeups: 0,
            reason:  None,
        };
        Self {
            shared: Arc::new((Mutex::new(control), Condvar::new())),
        }
    }

    pub fn state(&self) -> ModuleState {
        lock(&self.shared.0).state
    }

    pub fn is_running(&self) -> bool {
        self.state() == ModuleState::Running
    }

    /// Reason recorded by [`CancelToken::halt`].
    pub fn reason(&self) -> Option<String> {
        lock(&self.shared.0).reason.clone()
    }

    /// Change state under the sleep lock and wake every sleeper if `f`
    /// reports a transition.
    fn transition(&self, f: impl FnOnce(&mut Control) -> bool) -> bool {
        let (mutex, condvar) = &*self.shared;
        let changed = f(&mut lock(mutex));
        if changed {
            condvar.notify_all();
        }
        changed
    }

    /// `Constructed → Running`. Returns `false` in any other state.
    pub(crate) fn begin(&self) -> bool {
        self.transition(|c| {
            if c.state != ModuleState::Constructed {
                return false;
            }
            c.state = ModuleState::Running;
            true
        })
    }

    /// `Running → Stopping`, or `Constructed → Stopped` for a module that
    /// never started. Returns `false` if there was nothing to stop.
    pub(crate) fn cancel(&self) -> bool {
        self.transition(|c| match c.state {
            ModuleState::Running => {
                c.state = ModuleState::Stopping;
                true
            }
            ModuleState::Constructed => {
                c.state = ModuleState::Stopped;
                true
            }
            _ => false,
        })
    }

    /// `Stopping → Stopped`, once all threads are joined.
    pub(crate) fn finish(&self) -> bool {
        self.transition(|c| {
            if c.state != ModuleState::Stopping {
                return false;
            }
            c.state = ModuleState::Stopped;
            true
        })
    }

    /// Move to `Halted` from any non-terminal state and keep `reason`.
    /// Returns `false` if the module already stopped or halted.
    pub(crate) fn halt(&self, reason: String) -> bool {
        self.transition(|c| {
            if c.state.is_terminal() {
                return false;
            }
            c.state = ModuleState::Halted;
            c.reason = Some(reason);
            true
        })
    }

    /// Interrupt every thread currently blocked in [`CancelToken::sleep`].
    pub fn wakeup(&self) {
        self.transition(|c| {
            c.wakeups = c.wakeups.wrapping_add(1);
            true
        });
    }

    /// Block for `duration` unless woken or cancelled first.
    ///
    /// Returns `true` when the full duration elapsed and the module is still
    /// running, `false` when the sleep was cut short by [`CancelToken::wakeup`]
    /// or because the module is no longer running. Spurious condvar wakeups
    /// are absorbed.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let (mutex, condvar) = &*self.shared;
        let mut control = lock(mutex);
        let generation = control.wakeups;

        loop {
            if control.state != ModuleState::Running || control.wakeups != generation {
                return false;
            }
            control = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    condvar
                        .wait_timeout(control, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => condvar.wait(control).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}
