pub mod collada;
pub mod error;
pub mod math;

pub use error::DaeError;
