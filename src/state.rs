use crate::engine::Engine;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<Engine>>,
    pub allow_day_skip: bool,
}

impl AppState {
    pub fn new(engine: Engine, allow_day_skip: bool) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            allow_day_skip,
        }
    }
}
