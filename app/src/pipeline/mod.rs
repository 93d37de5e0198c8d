mod orchestrator;
mod state;

pub use orchestrator::{
    needs_compression, CompressionMode, CompressionOutcome, Pipeline, PipelineError,
    PipelineInput, PipelineOutcome,
};
pub use state::{PipelineEvent, PipelineState, PipelineTracker, TransitionRejection};
