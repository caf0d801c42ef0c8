pub mod aemet;
pub mod air_quality;
pub mod cache;
pub mod error;
pub mod open_meteo;
pub mod pipeline;
pub mod source;
