use crate::pipeline::CallPipeline;

pub struct AppState {
    pub pipeline: CallPipeline,
}
