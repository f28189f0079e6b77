pub mod contact;
pub mod password;

pub use contact::*;
pub use password::*;
