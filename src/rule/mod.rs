pub mod filter;
pub mod modifier;
pub mod ruleset;
pub mod selector;

pub use filter::*;
pub use modifier::*;
pub use ruleset::*;
pub use selector::*;
