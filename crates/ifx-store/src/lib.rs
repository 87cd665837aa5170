//! Persistent key-value storage and the account repository on top of it.

mod accounts;
mod kv;

pub use accounts::AccountStore;
pub use accounts::SESSION_KEY;
pub use accounts::USERS_KEY;
pub use accounts::UserRecord;
pub use kv::FileStore;
pub use kv::KeyValueStore;
pub use kv::MemoryStore;
