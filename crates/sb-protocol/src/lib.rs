pub mod errors;
pub mod intent;
pub mod operations;
pub mod params;

pub use errors::*;
pub use intent::*;
pub use operations::*;
pub use params::*;
