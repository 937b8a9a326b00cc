pub mod args;
pub mod constants;
pub mod logic;
