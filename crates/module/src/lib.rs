//! Lifecycle base shared by every bar module.
//!
//! A [`Module`] pairs a [`Widget`] (state + output) with the generic
//! machinery: a main thread driven by the widget's [`Schedule`], optional
//! worker threads, a [`CancelToken`] for cooperative sleep and shutdown, and
//! a pull-based output cache refreshed on `contents()` after a broadcast.

pub mod failed;
pub mod module;
pub mod token;
pub mod widget;

pub use failed::FailedModule;
pub use module::{Module, ModuleContext, ModuleHandle, IDLE};
pub use token::{CancelToken, ModuleState};
pub use widget::{ModuleSetup, Schedule, Widget};
