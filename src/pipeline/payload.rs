use std::fmt::Debug;

/// Capability set required of anything flowing through a pipeline.
///
/// `clone_payload` allows defensive duplication, reporting "no copy" by
/// returning `None` when not applicable. `mark_processed` signals
/// end-of-life; a pooled implementation would
/// return itself to a pool and zero its fields here, a simple owned
/// implementation can leave it a no-op.
pub trait Payload: Debug + Send + 'static {
    fn clone_payload(&self) -> Option<Box<dyn Payload>> {
        None
    }

    fn mark_processed(self: Box<Self>) {}

    /// Downcast hook. Stage processors use this to recover the concrete
    /// payload variant they expect; a mismatch there is a programming error
    /// and should panic rather than silently misbehave.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Mutable counterpart of `as_any`, for processors that decode into a
    /// field on the same payload in place rather than building a new one.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
