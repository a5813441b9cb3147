//! In-memory adapters for every driven port.

mod identity;
mod store;

pub use identity::InMemoryIdentityProvider;
pub use store::InMemoryProgressionStore;
