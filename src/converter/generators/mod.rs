pub mod lrc_generator;
pub mod txt_generator;
