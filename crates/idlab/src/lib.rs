#![doc = include_str!("../README.md")]

mod encoding;
mod error;
mod generator;
mod id;
mod node;
mod rand;
mod registry;
mod time;

pub use crate::encoding::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::node::*;
pub use crate::rand::*;
pub use crate::registry::*;
pub use crate::time::*;
