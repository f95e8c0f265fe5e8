pub mod allocation;
pub mod pipeline;
pub mod route;
