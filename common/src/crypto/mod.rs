mod hash;
mod message;
mod wallet;

pub mod error;

pub use error::CryptoError;
pub use hash::*;
pub use message::*;
pub use wallet::*;
