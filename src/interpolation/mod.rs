pub mod blend;
pub mod math;
