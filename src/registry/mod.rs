//! The actor registry: spawn, lookup, group discovery, and parent
//! notification, built on the same lock-free `DashMap` pattern this
//! runtime's message-routing table uses, adapted to own full `Actor`
//! entities rather than mailbox senders.

pub mod registry;

pub use registry::ActorRegistry;
