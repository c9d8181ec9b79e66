/// Contract between the bar host and every module instance.
///
/// The host owns modules as `Box<dyn ModuleInterface>` and only ever talks to
/// them through this trait; widget specifics stay behind it.
pub trait ModuleInterface: InputHandler + Send {
    /// The kind users write in the module section `type` key,
    /// e.g. `"internal/date"`.
    fn kind(&self) -> &str;

    /// Module name without the `module/` prefix.
    fn name_raw(&self) -> &str;

    /// Fully qualified module name, e.g. `"module/clock"`.
    fn name(&self) -> &str;

    fn running(&self) -> bool;

    fn start(&mut self);

    /// Stop all module threads and wait for them. Safe to call repeatedly.
    fn stop(&mut self);

    /// Stop the module and record `message` as the reason.
    fn halt(&mut self, message: String);

    /// Current decorated output. Re-renders only when the module broadcast a
    /// change since the last call.
    fn contents(&self) -> String;
}

/// Optional capability: modules that react to click/scroll actions.
pub trait InputHandler {
    /// Name used to route actions to this handler.
    fn input_handler_name(&self) -> &str;

    /// Returns `true` when the action was recognised.
    fn input(&self, action: &str, data: &str) -> bool;
}
