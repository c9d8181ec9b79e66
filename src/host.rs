use bar_config::Config;
use bar_core::{ModuleInterface, SignalEmitter};
use bar_module::ModuleContext;
use bar_theme::BarSettings;
use std::sync::Arc;
use tracing::{info, warn};

/// The ordered set of modules named by the top-level `modules` list.
pub struct Bar {
    modules:   Vec<Box<dyn ModuleInterface>>,
    separator: String,
    last:      Option<String>,
}

impl Bar {
    /// Construct every listed module. Modules that fail to build are kept as
    /// inert placeholders so the order stays stable.
    pub fn build(config: Config, emitter: Arc<dyn SignalEmitter>) -> Self {
        let order = match config.bar_config() {
            Ok(cfg) => cfg.modules,
            Err(e) => {
                warn!("invalid bar configuration, starting without modules: {e}");
                Vec::new()
            }
        };
        let bar = BarSettings::from_config(&config).unwrap_or_default();
        let separator = bar.separator.clone();

        let ctx = ModuleContext {
            bar:     Arc::new(bar),
            config:  Arc::new(config),
            emitter,
        };
        let modules = order.iter().map(|name| bar_widgets::create(&ctx, name)).collect();

        Self { modules, separator, last: None }
    }

    pub fn start(&mut self) {
        for module in &mut self.modules {
            module.start();
        }
        info!("started {} module(s)", self.len());
    }

    pub fn stop(&mut self) {
        for module in &mut self.modules {
            module.stop();
        }
    }

    /// [`Bar::stop`] from async code. Joining module threads blocks, so the
    /// runtime is told to move other tasks off this worker first.
    pub fn stop_blocking(&mut self) {
        tokio::task::block_in_place(|| self.stop());
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Join the non-empty module outputs. Returns `None` when the line is the
    /// same as the previous call.
    pub fn redraw(&mut self) -> Option<String> {
        let line = self
            .modules
            .iter()
            .map(|m| m.contents())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(&self.separator);

        if self.last.as_deref() == Some(line.as_str()) {
            return None;
        }
        self.last = Some(line.clone());
        Some(line)
    }

    /// Route an input action to the module whose handler name matches.
    pub fn input(&self, target: &str, action: &str, data: &str) -> bool {
        self.modules
            .iter()
            .filter(|m| m.input_handler_name() == target)
            .any(|m| m.input(action, data))
    }
}

impl Drop for Bar {
    fn drop(&mut self) {
        self.stop();
    }
}
