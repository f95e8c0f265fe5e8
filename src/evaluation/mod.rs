pub mod cost;
pub mod spend;
