mod base32;
mod base_n;
mod error;
mod hex;

pub use base32::*;
pub use base_n::*;
pub use error::*;
pub use hex::*;
