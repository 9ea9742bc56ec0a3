//! Domain types shared by the store, the prompt builder and the dispatcher.

mod channel;
mod profile;
mod provider;

pub use channel::{Channel, Links};
pub use profile::ProfileRecord;
pub use provider::Provider;
