mod session;
mod state;

pub use session::{Selection, Session};
pub use state::*;
