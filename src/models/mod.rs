pub mod cart;
pub mod common;
pub mod identity;
pub mod kot;
pub mod order;

pub use cart::*;
pub use common::*;
pub use identity::*;
pub use kot::*;
pub use order::*;
