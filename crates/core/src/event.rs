use tokio::sync::mpsc::UnboundedSender;

/// Notifications a module sends to its host.
///
/// Sources:
/// - `broadcast()` on any module thread → `Changed`
/// - `stop()` reaching the stopped state → `Stopped`
/// - a caught widget or render failure   → `Halted`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Module content may differ from what the host last pulled.
    Changed { module: String },
    /// Module finished stopping; all of its threads have been joined.
    Stopped { module: String },
    /// Module was halted and will not produce new content.
    Halted { module: String, reason: String },
}

impl Signal {
    /// Name of the module the signal originates from.
    pub fn module(&self) -> &str {
        match self {
            Self::Changed { module } | Self::Stopped { module } | Self::Halted { module, .. } => {
                module
            }
        }
    }
}

/// Observer notified by modules. Implementations must not block: emitters are
/// called from worker threads, sometimes while a module lock is held.
pub trait SignalEmitter: Send + Sync {
    fn emit(&self, signal: Signal);
}

impl SignalEmitter for UnboundedSender<Signal> {
    fn emit(&self, signal: Signal) {
        // Receiver gone means the host is shutting down.
        let _ = self.send(signal);
    }
}

/// Emitter that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmitter;

impl SignalEmitter for NullEmitter {
    fn emit(&self, _signal: Signal) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_sender_forwards_signals() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.emit(Signal::Changed { module: "module/clock".into() });
        let got = rx.try_recv().expect("signal delivered");
        assert_eq!(got.module(), "module/clock");
    }

    #[test]
    fn emitting_after_receiver_dropped_is_harmless() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Signal>();
        drop(rx);
        tx.emit(Signal::Stopped { module: "module/x".into() });
    }
}
