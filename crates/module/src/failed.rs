use bar_core::{InputHandler, ModuleInterface};
use tracing::debug;

/// Stand-in for a module whose construction failed.
///
/// Keeps the bar's module list intact: it reports its name and the reason,
/// never runs, and contributes no output.
#[derive(Debug, Clone)]
pub struct FailedModule {
    name:     String,
    name_raw: String,
    kind:     String,
    reason:   String,
}

impl FailedModule {
    pub fn new(name_raw: &str, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name:     format!("module/{name_raw}"),
            name_raw: name_raw.to_string(),
            kind:     kind.into(),
            reason:   reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl ModuleInterface for FailedModule {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn name_raw(&self) -> &str {
        &self.name_raw
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn running(&self) -> bool {
        false
    }

    fn start(&mut self) {
        debug!(module = %self.name, reason = %self.reason, "not starting failed module");
    }

    fn stop(&mut self) {}

    fn halt(&mut self, _message: String) {}

    fn contents(&self) -> String {
        String::new()
    }
}

impl InputHandler for FailedModule {
    fn input_handler_name(&self) -> &str {
        &self.name_raw
    }

    fn input(&self, _action: &str, _data: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_module_is_inert() {
        let mut module = FailedModule::new("cpu", "internal/cpu", "undefined format \"format\"");
        module.start();
        assert!(!module.running());
        assert_eq!(module.contents(), "");
        assert_eq!(module.name(), "module/cpu");
        assert!(!module.input("click", ""));
        assert_eq!(module.reason(), "undefined format \"format\"");
    }
}
