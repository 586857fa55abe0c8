mod interface;
mod ksuid;
mod push_id;
mod sid;
mod sonyflake;
mod ulid;
mod uuid;
mod xid;

pub use interface::*;
pub use ksuid::*;
pub use push_id::*;
pub use sid::*;
pub use sonyflake::*;
pub use ulid::*;
pub use uuid::*;
pub use xid::*;
