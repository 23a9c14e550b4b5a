pub mod enums;
pub mod message;

pub use message::Message;
