pub mod engine;
pub mod error;
pub mod store;
pub mod sun_chance;
