pub mod error;
pub mod instance;
pub mod markup;
pub mod property;
pub mod types;

pub use error::ElixirError;
pub use instance::*;
pub use markup::*;
pub use property::*;
pub use types::*;
