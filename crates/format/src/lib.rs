//! Named output templates and their per-module registry.
//!
//! A format value such as `"<icon> <label>"` is parsed once into literal text
//! and tags. At render time each tag is handed to the widget, which emits the
//! matching content (or nothing), and the result is wrapped in the format's
//! decorations.

pub mod registry;
pub mod template;

pub use registry::FormatRegistry;
pub use template::{FormatTemplate, Segment, DEFAULT_FORMAT};
