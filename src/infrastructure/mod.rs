//! Infrastructure Layer
//!
//! Concrete implementations of the external collaborators: the session
//! directory REST API, the container runtime probe, the ticket helper
//! scripts, and the durable record store.

pub mod container;
pub mod directory;
pub mod storage;
pub mod tickets;

pub use container::{ContainerRuntime, DockerCli};
pub use directory::{HubClient, SessionDirectory};
pub use tickets::{ScriptTicketManager, TicketManager};
