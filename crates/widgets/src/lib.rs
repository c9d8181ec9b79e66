pub mod clock;
pub mod custom;

pub use clock::ClockWidget;
pub use custom::TextWidget;

use bar_core::{ModuleError, ModuleInterface};
use bar_module::{FailedModule, Module, ModuleContext, Widget};

/// Construct the module configured in `[module.<name>]`.
///
/// Never fails: a module that can't be built is logged and replaced by an
/// inert [`FailedModule`], so one broken section doesn't take the bar down.
pub fn create(ctx: &ModuleContext, name: &str) -> Box<dyn ModuleInterface> {
    let section = format!("module/{name}");
    let kind = ctx
        .config
        .get::<String>(&section, "type")
        .unwrap_or_default();

    match try_create(ctx, name, &kind) {
        Ok(module) => module,
        Err(e) => {
            tracing::error!(module = %section, "disabling module: {e}");
            Box::new(FailedModule::new(name, kind, e.to_string()))
        }
    }
}

fn try_create(ctx: &ModuleContext, name: &str, kind: &str) -> Result<Box<dyn ModuleInterface>, ModuleError> {
    let section = format!("module/{name}");
    if !ctx.config.has_section(&section) {
        return Err(ModuleError::failed(format!("no [module.{name}] section")));
    }

    match kind {
        k if k == ClockWidget::TYPE => Ok(Box::new(Module::<ClockWidget>::new(ctx, name)?)),
        k if k == TextWidget::TYPE => Ok(Box::new(Module::<TextWidget>::new(ctx, name)?)),
        "" => Err(ctx.config.get::<String>(&section, "type").err().map_or_else(
            || ModuleError::failed("empty module type"),
            ModuleError::from,
        )),
        other => Err(ModuleError::failed(format!("unknown module type \"{other}\""))),
    }
}
