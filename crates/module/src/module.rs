use crate::token::{lock, CancelToken, ModuleState};
use crate::widget::{ModuleSetup, Schedule, Widget};
use bar_config::Config;
use bar_core::{InputHandler, ModuleError, ModuleInterface, Signal, SignalEmitter};
use bar_format::FormatRegistry;
use bar_renderer::{Builder, MarkupBuilder};
use bar_theme::BarSettings;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Shared collaborators every module is constructed with.
#[derive(Clone)]
pub struct ModuleContext {
    pub bar:     Arc<BarSettings>,
    pub config:  Arc<Config>,
    pub emitter: Arc<dyn SignalEmitter>,
}

/// State guarded by the build lock: the widget and the builder it writes to.
struct Build<W> {
    widget:  W,
    builder: Box<dyn Builder>,
}

/// State guarded by the update lock.
struct Cache {
    value:   String,
    changed: bool,
}

struct Shared<W> {
    name:          String,
    name_raw:      String,
    formats:       FormatRegistry,
    emitter:       Arc<dyn SignalEmitter>,
    handle_events: bool,
    token:         CancelToken,
    build:         Mutex<Build<W>>,
    cache:         Mutex<Cache>,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

impl<W: Widget> Shared<W> {
    fn broadcast(&self) {
        lock(&self.cache).changed = true;
        self.emitter.emit(Signal::Changed {
            module: self.name.clone(),
        });
    }

    fn contents(&self) -> String {
        {
            let cache = lock(&self.cache);
            if !cache.changed || self.token.state() == ModuleState::Halted {
                return cache.value.clone();
            }
        }

        let mut build = lock(&self.build);
        {
            // Another caller may have rendered while we waited for the lock.
            // Clearing the flag before rendering keeps a broadcast that lands
            // mid-render from being lost.
            let mut cache = lock(&self.cache);
            if !cache.changed {
                return cache.value.clone();
            }
            cache.changed = false;
        }

        match self.render(&mut build) {
            Ok(output) => {
                lock(&self.cache).value = output.clone();
                output
            }
            Err(e) => {
                drop(build);
                self.fail(e);
                lock(&self.cache).value.clone()
            }
        }
    }

    fn render(&self, build: &mut Build<W>) -> Result<String, ModuleError> {
        let Build { widget, builder } = build;
        let template = self.formats.get(widget.format())?;
        catch_unwind(AssertUnwindSafe(|| {
            template.render(&mut **builder, |b, tag| widget.build(b, tag))
        }))
        .map_err(|payload| ModuleError::Panicked(panic_message(payload)))
    }

    /// Log a caught error and halt the module.
    fn fail(&self, err: ModuleError) {
        error!(module = %self.name, "{err}");
        self.halt(err.to_string());
    }

    fn halt(&self, reason: String) {
        if self.token.halt(reason.clone()) {
            warn!(module = %self.name, %reason, "module halted");
            self.emitter.emit(Signal::Halted {
                module: self.name.clone(),
                reason,
            });
        }
    }

    fn update(&self) -> Result<bool, ModuleError> {
        lock(&self.build).widget.update()
    }

    /// Body of the main thread.
    fn run(&self) -> Result<(), ModuleError> {
        let schedule = lock(&self.build).widget.schedule();
        debug!(module = %self.name, ?schedule, "main thread started");

        match schedule {
            Schedule::Static => {
                self.update()?;
                self.broadcast();
            }
            Schedule::Interval(interval) => {
                while self.token.is_running() {
                    if self.update()? {
                        self.broadcast();
                    }
                    self.token.sleep(interval);
                }
            }
            Schedule::Event { idle } => {
                while self.token.is_running() {
                    self.token.sleep(idle);
                    if !self.token.is_running() {
                        break;
                    }
                    let changed = {
                        let mut build = lock(&self.build);
                        if !build.widget.has_event() {
                            continue;
                        }
                        build.widget.update()?
                    };
                    if changed {
                        self.broadcast();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Cloneable handle given to worker threads.
pub struct ModuleHandle<W> {
    shared: Arc<Shared<W>>,
}

impl<W> Clone for ModuleHandle<W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<W: Widget> ModuleHandle<W> {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn running(&self) -> bool {
        self.shared.token.is_running()
    }

    /// Mark the content as changed and notify the host. Rendering happens on
    /// the next `contents()` call.
    pub fn broadcast(&self) {
        self.shared.broadcast();
    }

    /// See [`CancelToken::sleep`].
    pub fn sleep(&self, duration: Duration) -> bool {
        self.shared.token.sleep(duration)
    }

    /// Short pause for polling loops.
    pub fn idle(&self) -> bool {
        self.sleep(IDLE)
    }

    pub fn wakeup(&self) {
        self.shared.token.wakeup();
    }

    /// Run `f` on the widget under the build lock. Keep it short: rendering
    /// waits for it.
    pub fn update_with<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut lock(&self.shared.build).widget)
    }

    /// Halt the module from a worker thread. The host's next `stop()` joins
    /// the threads.
    pub fn halt(&self, reason: impl Into<String>) {
        self.shared.fail(ModuleError::Failed(reason.into()));
    }
}

/// Pause used by [`ModuleHandle::idle`].
pub const IDLE: Duration = Duration::from_millis(25);

/// A running instance of widget `W`: threads, locks, the output cache and the
/// host contract around it.
pub struct Module<W: Widget> {
    shared:  Arc<Shared<W>>,
    main:    Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl<W: Widget> Module<W> {
    /// Construct the widget from section `module/<name_raw>` and register its
    /// formats. Format validation errors are returned to the caller.
    pub fn new(ctx: &ModuleContext, name_raw: &str) -> Result<Self, ModuleError> {
        let name = format!("module/{name_raw}");
        let mut formats = FormatRegistry::new(Arc::clone(&ctx.config), name.clone());
        let handle_events = ctx.config.get_or(&name, "handle-events", true)?;

        let widget = W::new(&mut ModuleSetup {
            name:    name_raw,
            section: &name,
            config:  &ctx.config,
            bar:     &ctx.bar,
            formats: &mut formats,
        })?;

        debug!(module = %name, kind = W::TYPE, "module constructed");

        Ok(Self {
            shared: Arc::new(Shared {
                name,
                name_raw: name_raw.to_string(),
                formats,
                emitter: Arc::clone(&ctx.emitter),
                handle_events,
                token: CancelToken::new(),
                build: Mutex::new(Build {
                    widget,
                    builder: Box::new(MarkupBuilder::for_bar(&ctx.bar)),
                }),
                cache: Mutex::new(Cache {
                    value:   String::new(),
                    changed: true,
                }),
            }),
            main:    None,
            workers: Vec::new(),
        })
    }

    pub fn handle(&self) -> ModuleHandle<W> {
        ModuleHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn state(&self) -> ModuleState {
        self.shared.token.state()
    }

    /// Message given to the halt, if the module halted.
    pub fn halt_reason(&self) -> Option<String> {
        self.shared.token.reason()
    }

    pub fn broadcast(&self) {
        self.shared.broadcast();
    }

    pub fn wakeup(&self) {
        self.shared.token.wakeup();
    }

    /// Start an auxiliary thread running `f`. It is joined by `stop()` along
    /// with the main thread and should loop only while
    /// [`ModuleHandle::running`] holds. A panic in `f` halts the module.
    pub fn spawn<F>(&mut self, name: &str, f: F) -> Result<(), ModuleError>
    where
        F: FnOnce(ModuleHandle<W>) + Send + 'static,
    {
        let handle = self.handle();
        let thread = thread::Builder::new()
            .name(format!("{}:{name}", self.shared.name_raw))
            .spawn(move || {
                let shared = Arc::clone(&handle.shared);
                if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(handle))) {
                    shared.fail(ModuleError::Panicked(panic_message(payload)));
                }
            })
            .map_err(|e| ModuleError::failed(format!("cannot spawn worker '{name}': {e}")))?;

        self.workers.push(thread);
        Ok(())
    }

    fn join_all(&mut self) {
        for thread in self.main.take().into_iter().chain(self.workers.drain(..)) {
            if thread.join().is_err() {
                // Worker bodies catch their own panics; this only triggers if
                // the halt path itself panicked.
                error!(module = %self.shared.name, "module thread panicked while exiting");
            }
        }
    }
}

impl<W: Widget> ModuleInterface for Module<W> {
    fn kind(&self) -> &str {
        W::TYPE
    }

    fn name_raw(&self) -> &str {
        &self.shared.name_raw
    }

    fn name(&self) -> &str {
        &self.shared.name
    }

    fn running(&self) -> bool {
        self.shared.token.is_running()
    }

    fn start(&mut self) {
        if !self.shared.token.begin() {
            debug!(module = %self.shared.name, state = ?self.state(), "start ignored");
            return;
        }
        info!(module = %self.shared.name, kind = W::TYPE, "starting module");

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(self.shared.name_raw.clone())
            .spawn(move || {
                let err = match catch_unwind(AssertUnwindSafe(|| shared.run())) {
                    Ok(Ok(())) => return,
                    Ok(Err(e)) => e,
                    Err(payload) => ModuleError::Panicked(panic_message(payload)),
                };
                shared.fail(err);
            });

        match spawned {
            Ok(thread) => self.main = Some(thread),
            Err(e) => self
                .shared
                .fail(ModuleError::failed(format!("cannot spawn main thread: {e}"))),
        }
    }

    fn stop(&mut self) {
        let stopping = self.shared.token.cancel();
        self.join_all();

        if stopping && self.shared.token.finish() {
            info!(module = %self.shared.name, "module stopped");
        }
        // A halt that lands while joining wins; only a real stop is signalled.
        if stopping && self.state() == ModuleState::Stopped {
            self.shared.emitter.emit(Signal::Stopped {
                module: self.shared.name.clone(),
            });
        }
    }

    fn halt(&mut self, message: String) {
        self.shared.fail(ModuleError::Failed(message));
        self.stop();
    }

    fn contents(&self) -> String {
        self.shared.contents()
    }
}

impl<W: Widget> InputHandler for Module<W> {
    fn input_handler_name(&self) -> &str {
        &self.shared.name_raw
    }

    /// Recognised actions mark the module as changed.
    fn input(&self, action: &str, data: &str) -> bool {
        if !self.shared.handle_events || self.state() == ModuleState::Halted {
            return false;
        }
        let recognised = lock(&self.shared.build).widget.input(action, data);
        if recognised {
            self.shared.broadcast();
        }
        recognised
    }
}

impl<W: Widget> Drop for Module<W> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bar_core::NullEmitter;
    use bar_format::DEFAULT_FORMAT;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    /// Test widget whose behaviour is driven by its config section.
    struct Probe {
        text:     String,
        mode:     String,
        interval: Duration,
        format:   String,
        events:   usize,
        updates:  usize,
        renders:  Arc<AtomicUsize>,
    }

    impl Widget for Probe {
        const TYPE: &'static str = "test/probe";

        fn new(setup: &mut ModuleSetup<'_>) -> Result<Self, ModuleError> {
            setup.formats.add(DEFAULT_FORMAT, "<label>", &["label", "extra"], &[])?;
            Ok(Self {
                text:     setup.get_or("text", "hello".to_string())?,
                mode:     setup.get_or("mode", "static".to_string())?,
                interval: Duration::from_millis(setup.get_or("interval-ms", 1000)?),
                format:   setup.get_or("use-format", DEFAULT_FORMAT.to_string())?,
                events:   setup.get_or("events", 0)?,
                updates:  0,
                renders:  Arc::new(AtomicUsize::new(0)),
            })
        }

        fn build(&self, builder: &mut dyn Builder, tag: &str) -> bool {
            match tag {
                "label" => {
                    self.renders.fetch_add(1, Ordering::SeqCst);
                    if self.text == "boom" {
                        panic!("render bug");
                    }
                    builder.append(&self.text);
                    true
                }
                _ => false,
            }
        }

        fn format(&self) -> &str {
            &self.format
        }

        fn schedule(&self) -> Schedule {
            match self.mode.as_str() {
                "interval" | "fail" | "panic" => Schedule::Interval(self.interval),
                "event" => Schedule::Event { idle: Duration::from_millis(1) },
                _ => Schedule::Static,
            }
        }

        fn update(&mut self) -> Result<bool, ModuleError> {
            self.updates += 1;
            match self.mode.as_str() {
                "fail" => Err(ModuleError::failed("sensor unplugged")),
                "panic" => panic!("widget bug"),
                _ => Ok(true),
            }
        }

        fn has_event(&mut self) -> bool {
            if self.events == 0 {
                return false;
            }
            self.events -= 1;
            true
        }

        fn input(&mut self, action: &str, data: &str) -> bool {
            if action != "set" {
                return false;
            }
            self.text = data.to_string();
            true
        }
    }

    fn context(section: &str, emitter: Arc<dyn SignalEmitter>) -> ModuleContext {
        let config: Config = format!("[module.probe]\n{section}").parse().unwrap();
        ModuleContext {
            bar: Arc::new(BarSettings::default()),
            config: Arc::new(config),
            emitter,
        }
    }

    fn probe(section: &str) -> Module<Probe> {
        Module::new(&context(section, Arc::new(NullEmitter)), "probe").unwrap()
    }

    fn probe_with_signals(section: &str) -> (Module<Probe>, UnboundedReceiver<Signal>) {
        let (tx, rx) = unbounded_channel();
        (Module::new(&context(section, Arc::new(tx)), "probe").unwrap(), rx)
    }

    fn renders(module: &Module<Probe>) -> usize {
        module.handle().update_with(|w| w.renders.load(Ordering::SeqCst))
    }

    fn wait_for(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    fn drain(rx: &mut UnboundedReceiver<Signal>) -> Vec<Signal> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn identity_comes_from_name_and_widget_type() {
        let module = probe("");
        assert_eq!(module.name(), "module/probe");
        assert_eq!(module.handle().name(), "module/probe");
        assert_eq!(module.name_raw(), "probe");
        assert_eq!(module.kind(), "test/probe");
        assert_eq!(module.input_handler_name(), "probe");
        assert_eq!(module.state(), ModuleState::Constructed);
        assert!(!module.running());
    }

    #[test]
    fn contents_is_cached_until_broadcast() {
        let module = probe("");
        assert_eq!(module.contents(), "hello");
        assert_eq!(module.contents(), "hello");
        assert_eq!(renders(&module), 1);

        module.handle().update_with(|w| w.text = "world".into());
        assert_eq!(module.contents(), "hello");
        assert_eq!(renders(&module), 1);

        module.broadcast();
        assert_eq!(module.contents(), "world");
        assert_eq!(module.contents(), "world");
        assert_eq!(renders(&module), 2);
    }

    #[test]
    fn broadcast_notifies_the_host() {
        let (module, mut rx) = probe_with_signals("");
        module.broadcast();
        assert_eq!(
            drain(&mut rx),
            vec![Signal::Changed { module: "module/probe".into() }]
        );
    }

    #[test]
    fn static_module_renders_once_started() {
        let (mut module, mut rx) = probe_with_signals("");
        module.start();
        assert!(wait_for(|| module.handle().update_with(|w| w.updates) == 1));
        assert_eq!(module.contents(), "hello");
        module.stop();
        let signals = drain(&mut rx);
        assert!(signals.contains(&Signal::Changed { module: "module/probe".into() }));
        assert_eq!(signals.last(), Some(&Signal::Stopped { module: "module/probe".into() }));
    }

    #[test]
    fn stop_joins_threads_and_is_idempotent() {
        let (mut module, mut rx) = probe_with_signals("mode = \"interval\"\ninterval-ms = 10000\n");
        module.start();
        assert!(module.running());
        assert!(wait_for(|| module.handle().update_with(|w| w.updates) >= 1));

        let started = Instant::now();
        module.stop();
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(!module.running());
        assert_eq!(module.state(), ModuleState::Stopped);
        assert!(module.main.is_none());

        module.stop();
        let stops = drain(&mut rx)
            .into_iter()
            .filter(|s| matches!(s, Signal::Stopped { .. }))
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn repeated_start_stop_leaves_nothing_running() {
        for _ in 0..20 {
            let mut module = probe("mode = \"interval\"\ninterval-ms = 10000\n");
            module.start();
            module.stop();
            assert!(!module.running());
            assert!(module.main.is_none() && module.workers.is_empty());
        }
    }

    #[test]
    fn stop_cancels_a_long_sleep_in_a_worker() {
        let mut module = probe("mode = \"interval\"\ninterval-ms = 10000\n");
        module.start();

        let (tx, rx) = std::sync::mpsc::channel();
        for i in 0..3 {
            let tx = tx.clone();
            module
                .spawn(&format!("sleeper-{i}"), move |handle| {
                    let elapsed = handle.sleep(Duration::from_secs(10));
                    let _ = tx.send(elapsed);
                })
                .unwrap();
        }

        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        module.stop();
        assert!(started.elapsed() < Duration::from_millis(500));
        let results: Vec<bool> = rx.try_iter().collect();
        assert_eq!(results, vec![false, false, false]);
    }

    #[test]
    fn wakeup_interrupts_sleep_without_stopping() {
        let mut module = probe("mode = \"interval\"\ninterval-ms = 10000\n");
        module.start();

        let (tx, rx) = std::sync::mpsc::channel();
        module
            .spawn("waiter", move |handle| {
                let _ = tx.send(handle.sleep(Duration::from_secs(10)));
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let woke = loop {
            module.wakeup();
            if let Ok(elapsed) = rx.recv_timeout(Duration::from_millis(10)) {
                break Some(elapsed);
            }
            if Instant::now() > deadline {
                break None;
            }
        };
        assert_eq!(woke, Some(false));
        assert!(module.running());
        module.stop();
    }

    #[test]
    fn update_error_halts_the_module() {
        let (mut module, mut rx) = probe_with_signals("mode = \"fail\"\n");
        module.start();
        assert!(wait_for(|| module.state() == ModuleState::Halted));
        assert!(!module.running());
        assert_eq!(module.halt_reason().as_deref(), Some("sensor unplugged"));
        module.stop();
        assert_eq!(module.state(), ModuleState::Halted);

        let signals = drain(&mut rx);
        assert!(signals.contains(&Signal::Halted {
            module: "module/probe".into(),
            reason: "sensor unplugged".into(),
        }));
        assert!(!signals.iter().any(|s| matches!(s, Signal::Stopped { .. })));
    }

    #[test]
    fn panic_in_widget_halts_instead_of_unwinding() {
        let mut module = probe("mode = \"panic\"\n");
        module.start();
        assert!(wait_for(|| module.state() == ModuleState::Halted));
        assert_eq!(module.halt_reason().as_deref(), Some("panicked: widget bug"));
        module.stop();
    }

    #[test]
    fn undefined_format_at_render_halts() {
        let module = probe("use-format = \"format-missing\"\n");
        assert_eq!(module.contents(), "");
        assert_eq!(module.state(), ModuleState::Halted);
        assert_eq!(
            module.halt_reason().as_deref(),
            Some("undefined format \"format-missing\"")
        );
        module.broadcast();
        assert_eq!(module.contents(), "");
        assert_eq!(renders(&module), 0);
    }

    #[test]
    fn halt_during_stop_is_not_reported_as_stopped() {
        let (mut module, mut rx) = probe_with_signals("mode = \"interval\"\ninterval-ms = 10000\n");
        module.start();
        module
            .spawn("flusher", |handle| {
                if !handle.sleep(Duration::from_secs(10)) {
                    handle.halt("flush failed on shutdown");
                }
            })
            .unwrap();

        module.stop();
        assert_eq!(module.state(), ModuleState::Halted);
        assert_eq!(module.halt_reason().as_deref(), Some("flush failed on shutdown"));
        let signals = drain(&mut rx);
        assert!(signals.iter().any(|s| matches!(s, Signal::Halted { .. })));
        assert!(!signals.iter().any(|s| matches!(s, Signal::Stopped { .. })));
    }

    #[test]
    fn never_started_module_reports_stopped() {
        let (mut module, mut rx) = probe_with_signals("");
        module.stop();
        assert_eq!(
            drain(&mut rx),
            vec![Signal::Stopped { module: "module/probe".into() }]
        );
    }

    #[test]
    fn panic_while_rendering_halts_and_keeps_last_output() {
        let (module, mut rx) = probe_with_signals("");
        assert_eq!(module.contents(), "hello");

        module.handle().update_with(|w| w.text = "boom".into());
        module.broadcast();
        assert_eq!(module.contents(), "hello");
        assert_eq!(module.state(), ModuleState::Halted);
        assert_eq!(module.halt_reason().as_deref(), Some("panicked: render bug"));
        assert!(drain(&mut rx).contains(&Signal::Halted {
            module: "module/probe".into(),
            reason: "panicked: render bug".into(),
        }));
    }

    #[test]
    fn idle_loop_worker_exits_on_stop() {
        let mut module = probe("mode = \"interval\"\ninterval-ms = 10000\n");
        module.start();

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        module
            .spawn("poller", move |handle| {
                while handle.running() {
                    counter.fetch_add(1, Ordering::SeqCst);
                    handle.idle();
                }
            })
            .unwrap();

        assert!(wait_for(|| ticks.load(Ordering::SeqCst) >= 2));
        let started = Instant::now();
        module.stop();
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(module.workers.is_empty());
        let after_stop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(3 * IDLE.as_millis() as u64));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn halted_module_keeps_last_output_and_ignores_start() {
        let mut module = probe("");
        assert_eq!(module.contents(), "hello");
        module.halt("removed from config".into());
        assert_eq!(module.state(), ModuleState::Halted);
        module.start();
        assert_eq!(module.state(), ModuleState::Halted);
        assert!(module.main.is_none());
        module.broadcast();
        assert_eq!(module.contents(), "hello");
    }

    #[test]
    fn start_after_stop_is_a_no_op() {
        let mut module = probe("");
        module.stop();
        assert_eq!(module.state(), ModuleState::Stopped);
        module.start();
        assert_eq!(module.state(), ModuleState::Stopped);
        assert!(module.main.is_none());
    }

    #[test]
    fn event_schedule_updates_only_on_events() {
        let mut module = probe("mode = \"event\"\nevents = 2\n");
        module.start();
        assert!(wait_for(|| module.handle().update_with(|w| w.events == 0)));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(module.handle().update_with(|w| w.updates), 2);
        module.stop();
    }

    #[test]
    fn input_is_forwarded_and_broadcasts() {
        let module = probe("");
        assert_eq!(module.contents(), "hello");
        assert!(module.input("set", "clicked"));
        assert!(!module.input("scroll", ""));
        assert_eq!(module.contents(), "clicked");
    }

    #[test]
    fn input_is_ignored_when_events_are_disabled() {
        let module = probe("handle-events = false\n");
        assert!(!module.input("set", "clicked"));
        assert_eq!(module.contents(), "hello");
    }

    #[test]
    fn invalid_format_fails_construction() {
        let ctx = context("format = \"<label> <ramp>\"\n", Arc::new(NullEmitter));
        let err = Module::<Probe>::new(&ctx, "probe").err().unwrap();
        assert!(matches!(err, ModuleError::UndefinedFormatTag { ref tag, .. } if tag == "ramp"));
    }

    #[test]
    fn worker_panic_halts_the_module() {
        let mut module = probe("mode = \"interval\"\ninterval-ms = 10000\n");
        module.start();
        module.spawn("crasher", |_| panic!("worker bug")).unwrap();
        assert!(wait_for(|| module.state() == ModuleState::Halted));
        module.stop();
        assert!(module.workers.is_empty());
    }

    #[test]
    fn concurrent_broadcasts_and_reads_render_latest_state() {
        let mut module = probe("mode = \"interval\"\ninterval-ms = 10000\n");
        module.start();

        let writer = module.handle();
        module
            .spawn("writer", move |handle| {
                for i in 0..200 {
                    if !handle.running() {
                        break;
                    }
                    writer.update_with(|w| w.text = i.to_string());
                    handle.broadcast();
                }
            })
            .unwrap();

        for _ in 0..200 {
            let _ = module.contents();
        }
        assert!(wait_for(|| module.contents() == "199"));
        module.stop();
    }
}
