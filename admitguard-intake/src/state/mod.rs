//! Session-local state

mod field_store;

pub use field_store::FieldStateStore;
