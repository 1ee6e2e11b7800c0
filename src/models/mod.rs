pub mod enums;
pub mod memory;
pub mod message;
pub mod session;

pub use enums::*;
pub use memory::*;
pub use message::*;
pub use session::*;
