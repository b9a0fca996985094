pub mod app;
pub mod clock;
pub mod completed;
pub mod config;
pub mod day_key;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod streak;
pub mod tracker;
pub mod week;

pub use app::router;
pub use config::Config;
pub use engine::Engine;
pub use state::AppState;
