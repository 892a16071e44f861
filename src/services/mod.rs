pub mod account;
pub mod clone;
pub mod editor_session;
pub mod favorites;
pub mod gate;
pub mod layout;
pub mod notifier;
pub mod persistence;
pub mod registry;
pub mod remote;
pub mod store;
pub mod tree_controller;

pub use account::*;
pub use clone::*;
pub use editor_session::*;
pub use favorites::*;
pub use gate::*;
pub use layout::*;
pub use notifier::*;
pub use persistence::*;
pub use registry::*;
pub use remote::*;
pub use store::*;
pub use tree_controller::*;
