mod betterguid;
mod compact;
mod interface;
mod ksuid;
mod sid;
mod sonyflake;
mod status;
mod ulid;
mod uuid;
mod wait;
mod xid;

pub use betterguid::*;
pub use compact::*;
pub use interface::*;
pub use ksuid::*;
pub use sid::*;
pub use sonyflake::*;
pub use status::*;
pub use ulid::*;
pub use uuid::*;
pub use wait::DEFAULT_MAX_WAIT;
pub use xid::*;

#[cfg(test)]
mod tests;
