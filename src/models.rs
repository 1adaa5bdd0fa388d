mod api;
mod conversation;
mod message;
mod requirements;

pub use api::*;
pub use conversation::*;
pub use message::*;
pub use requirements::*;
