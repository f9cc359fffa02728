pub mod symbolicate;
pub mod util;

pub use symbolicate::*;
pub use util::*;
