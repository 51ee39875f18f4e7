//! MongoDB driver implementation of [`rsinit::ReplicaSetAdmin`].

pub mod admin;

pub use admin::{config_document, MongoAdmin};
