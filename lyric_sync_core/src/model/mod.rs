pub mod line;
pub mod word;
