//! Parameterized SQL for the device table.

mod builder;
pub mod params;
pub use builder::*;
pub use params::BindValue;
