pub mod account;
pub mod notice;
pub mod tab;
pub mod tree;
pub mod wire;

pub use account::*;
pub use notice::*;
pub use tab::*;
pub use tree::*;
pub use wire::*;
