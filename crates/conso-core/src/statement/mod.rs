pub mod aggregate;
pub mod lines;
