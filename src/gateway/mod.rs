//! The gateway proper
//!
//! Turns one opcode plus one caller request record into one firmware call,
//! with every input copied in and every output copied back out across the
//! trust boundary.
//!
//! # Components
//! - [`services`]: the firmware interface being guarded
//! - [`capsule`]: two-level copy of capsule header arrays
//! - [`handlers`]: one handler per opcode
//! - [`dispatch`]: the opcode table and the `Gateway` front

pub mod capsule;
pub mod dispatch;
pub mod handlers;
pub mod services;

pub use dispatch::{Gateway, Handler, Opcode};
pub use handlers::Call;
pub use services::RuntimeServices;
