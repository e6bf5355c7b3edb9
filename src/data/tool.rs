/// Capability shared by every tool a step can invoke.
///
/// Tools are deterministic and run locally; they never call a model.
pub trait Tool {
    /// Type tag the tool was instantiated from (e.g. `calculator`)
    fn name(&self) -> &'static str;

    /// Runs the tool on the current context.
    ///
    /// # Arguments
    /// * `input` - The context produced by the previous step
    ///
    /// # Returns
    /// The tool output. Failures are reported inside the returned string,
    /// never as a panic or an error value.
    fn run(&self, input: &str) -> String;
}
