//! Client layer: pooled clients, the published handle, and hot reload.
//!
//! The [`ClientManager`] builds a [`PooledClient`] from
//! [`Options`](crate::options::Options), publishes it behind a
//! [`ClientHandle`], and swaps in a rebuilt client on every
//! [`ChangeEvent`].

pub mod change_bus;
pub mod handle;
pub mod manager;
pub mod pooled;
pub mod status;

pub use change_bus::{ChangeBus, ChangeEvent};
pub use handle::ClientHandle;
pub use manager::ClientManager;
pub use pooled::{PoolLimits, PooledClient};
pub use status::ClientStatus;
