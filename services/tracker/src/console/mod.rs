//! services/tracker/src/console/mod.rs
//!
//! The interactive console: prompting, rendering, the menu session and the
//! all-days history listing.

pub mod history;
pub mod prompter;
pub mod render;
pub mod session;

pub use history::write_history;
pub use prompter::Prompter;
pub use session::Session;
