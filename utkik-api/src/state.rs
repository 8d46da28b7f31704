use utkik_engine::CaptureController;

/// Shared state handed to every handler.
pub struct ApiState {
    pub controller: CaptureController,
}

impl ApiState {
    pub fn new(controller: CaptureController) -> Self {
        Self { controller }
    }
}
