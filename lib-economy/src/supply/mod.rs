//! Supply management and token economics

pub mod management;
pub mod total_supply;

pub use management::*;
pub use total_supply::*;
