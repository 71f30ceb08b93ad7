use crate::error::ChartResult;
use crate::interaction::{InteractionEvent, InteractionState};

/// Observer of pointer-driven interaction.
///
/// Listeners see every hover, unhover and click together with the state the
/// controller settled on; they cannot mutate it. A failing listener is logged
/// and skipped, the remaining listeners still run.
pub trait InteractionListener {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &InteractionEvent, state: &InteractionState) -> ChartResult<()>;
}
