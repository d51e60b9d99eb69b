pub mod admin;
pub mod initialize_bounty;
pub mod process_ai_decision;
pub mod submit_entry;

pub use admin::*;
pub use initialize_bounty::*;
pub use process_ai_decision::*;
pub use submit_entry::*;
