//! Parser plugins shipped with the engine.
//!
//! None of them are registered by default; hosts pick the ones they want.

mod blacklist;
mod json;
mod table;

pub use blacklist::BlacklistPlugin;
pub use json::JsonPlugin;
pub use table::TablePlugin;
