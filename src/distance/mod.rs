pub mod geo;
pub mod matrix;
