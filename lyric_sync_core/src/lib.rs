pub mod converter;
pub mod error;
pub mod model;
pub mod time;

pub use converter::config::*;
pub use converter::types::*;
pub use error::*;
pub use model::line::*;
pub use model::word::*;
