pub mod store;
pub mod memory;
pub mod pgstore;

pub use store::{DocStore, StoreError, UserDirectory};
