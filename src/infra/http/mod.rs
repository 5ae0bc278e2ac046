mod middleware;
mod public;

pub use public::{AppState, build_router};
