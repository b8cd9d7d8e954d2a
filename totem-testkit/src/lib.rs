//! Test support for the TOTEM client: in-memory reference fakes of the two
//! registry contracts and a scriptable [`MockSession`] implementing the
//! client's chain-session trait.

pub mod avatar_registry;
pub mod component_registry;
pub mod session;

pub use session::{MockChain, MockSession};
