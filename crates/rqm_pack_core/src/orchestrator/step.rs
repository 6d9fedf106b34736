//! Pipeline step trait definition.

use super::errors::StepResult;
use super::types::{BuildState, Context, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// `validate_input` must not touch the filesystem beyond reading, so a
/// failing precondition leaves the repository as it was.
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context, state: &BuildState) -> StepResult<()>;

    /// Execute the step's main work and record results in `state`.
    fn execute(&self, ctx: &Context, state: &mut BuildState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Only called when `execute` returned `Success`.
    fn validate_output(&self, ctx: &Context, state: &BuildState) -> StepResult<()>;

    /// Whether this step can be skipped.
    fn is_optional(&self) -> bool {
        false
    }

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStep {
        name: &'static str,
    }

    impl PipelineStep for MockStep {
        fn name(&self) -> &str {
            self.name
        }

        fn validate_input(&self, _ctx: &Context, _state: &BuildState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut BuildState) -> StepResult<StepOutcome> {
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &BuildState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep> = Box::new(MockStep { name: "TestStep" });

        assert_eq!(step.name(), "TestStep");
        assert_eq!(step.description(), "TestStep");
        assert!(!step.is_optional());
    }
}
