pub mod message;
pub mod project;
pub mod session;
mod util;

pub use message::*;
pub use project::*;
pub use session::*;
pub use util::*;
