mod reading;
mod status;

pub use reading::*;
pub use status::*;
