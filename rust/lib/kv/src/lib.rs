pub mod error;
pub mod json;
pub mod memory;
pub mod redb;
pub mod traits;

pub use error::KVError;
pub use json::{get_json, set_json};
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use traits::KVStore;
