//! Pricing mechanisms and algorithms

pub mod dynamic_pricing;
pub mod market_pricing;

pub use dynamic_pricing::*;
pub use market_pricing::*;
