//! Shared types for Gamedock.
//!
//! This crate is the bottom of the dependency stack. It defines:
//!
//! - **Ids** ([`UserId`], [`GameTypeId`], [`SessionId`]) — opaque newtype
//!   identifiers.
//! - **Records** ([`GameTypeDescriptor`], [`AuthorProfile`],
//!   [`SessionMeta`]) — the durable metadata shapes.
//! - **Faults** ([`Fault`], [`FaultCode`]) — the structured,
//!   stable-coded failure outcome callers see.
//! - **Boundaries** ([`MetadataStore`]) — the durable-store contract the
//!   core is written against.
//! - **Validation** ([`validate_source_url`]) — the syntactic source
//!   location rule shared by moderation and the plugin registry.
//!
//! # How it fits in the stack
//!
//! ```text
//! gamedock (facade)
//!     ↕
//! gamedock-session / gamedock-moderation / gamedock-plugin
//!     ↕
//! gamedock-types (this crate)  ← no internal dependencies
//! ```

#![allow(async_fn_in_trait)]

mod catalog;
mod clock;
mod fault;
mod ids;
mod source;
mod store;

pub use catalog::{AuthorProfile, GameTypeDescriptor, SessionMeta};
pub use clock::now_millis;
pub use fault::{Fault, FaultCode};
pub use ids::{GameTypeId, SessionId, UserId};
pub use source::validate_source_url;
pub use store::{MetadataStore, StoreError};
