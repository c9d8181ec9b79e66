pub mod error;
pub mod event;
pub mod widget;

pub use error::{BarError, ConfigError, ModuleError, Result};
pub use event::{NullEmitter, Signal, SignalEmitter};
pub use widget::{InputHandler, ModuleInterface};
