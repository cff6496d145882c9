#![no_std]

extern crate alloc;

pub mod error;
pub mod publish;
pub mod sensor;
pub mod time;

pub use error::*;
pub use publish::*;
pub use sensor::*;
pub use self::time::*;
