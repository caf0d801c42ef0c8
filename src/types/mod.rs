pub mod attribution;
pub mod daily_record;
pub mod snapshot;
pub mod station;
pub mod sun_chance;
pub mod weather_condition;
