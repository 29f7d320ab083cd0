//! Terminal client: local game state, backend API client, and the
//! interactive play loop.

mod http;
mod repl;
mod state;

pub use http::{ApiClient, ClientError};
pub use repl::run_repl;
pub use state::GameState;
