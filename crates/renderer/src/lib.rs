//! Output construction for modules.
//!
//! Modules never produce pixels: they describe styled text through the
//! [`Builder`] trait, and the bar decides how to draw it. [`MarkupBuilder`] is
//! the stock implementation and emits lemonbar-compatible inline tags.

pub mod builder;
pub mod label;

pub use builder::{Builder, MarkupBuilder};
pub use label::Label;
