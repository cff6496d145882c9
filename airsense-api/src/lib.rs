#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod models;
pub mod protocols;
pub mod time;

pub use models::*;
pub use protocols::{JsonProtocol, Protocol};
pub use self::time::{TimeProvider, TimestampSource, format_timestamp};
