use std::sync::Arc;

use coach_core::CoachApi;

#[derive(Clone)]
pub struct CoachAxumState {
    pub api: Arc<dyn CoachApi>,
}

impl CoachAxumState {
    pub fn new(api: Arc<dyn CoachApi>) -> Self {
        Self { api }
    }
}
