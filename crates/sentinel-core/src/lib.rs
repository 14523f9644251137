pub mod actions;
pub mod catalog;
pub mod config;
pub mod persistence;
pub mod quarantine;
pub mod reducer;
pub mod router;
pub mod state;

pub use actions::*;
pub use config::*;
pub use reducer::*;
pub use router::*;
pub use state::*;

pub use persistence::*;
