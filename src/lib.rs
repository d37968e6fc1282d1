//! # ferrous-wire
//!
//! Constructor-wired dependency resolution for Rust.
//!
//! Contracts (usually trait objects) are mapped to an ordered list of
//! implementations. Resolving a contract picks one implementation by
//! positional key, resolves its constructor parameters recursively, builds it
//! and, for singletons, publishes it to a container-owned cache.
//!
//! ## Features
//!
//! - **Keyed lookup**: ordinal 0 is the default; a [`Qualifier`] enum selects the others
//! - **Collections**: every implementation of a contract, in registration order
//! - **Open generics**: one-parameter contract families bound through templates
//! - **Race-safe singletons**: construction outside locks, insert-if-absent publication
//! - **Cycle detection**: per-call resolution stack with the full cycle path in the error
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_wire::{Component, Constructor, Resolver, ServiceCollection, implements};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String { format!("[LOG] {message}") }
//! }
//! impl Component for ConsoleLogger {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|_| Ok(ConsoleLogger))]
//!     }
//! }
//! implements!(ConsoleLogger: dyn Logger);
//!
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//! }
//! impl Component for UserService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|args| Ok(UserService { logger: args.next()? }))
//!             .param::<dyn Logger>()]
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton::<dyn Logger, ConsoleLogger>().unwrap();
//! services.add_per_request::<UserService, UserService>().unwrap();
//!
//! let provider = services.build();
//! let users = provider.resolve::<UserService>().unwrap();
//! assert_eq!(users.logger.log("ready"), "[LOG] ready");
//! ```
//!
//! ## Lifecycles
//!
//! - **PerRequest**: a new instance on every resolution, never cached
//! - **Singleton**: at most one instance is ever returned per cache key
//!
//! ## Feature flags
//!
//! - `config`: serde support for [`ResolverOptions`] and `ResolverOptions::from_json`
//! - `graph-export`: the `graph_export` module (JSON, YAML and DOT)
//! - `ahash` / `performance`: ahash-backed registry and cache maps

pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod generic;
pub mod key;
pub mod lifecycle;
pub mod observer;
pub mod provider;
pub mod singletons;
pub mod traits;

#[cfg(feature = "graph-export")]
pub mod graph_export;

mod internal;
mod registration;

pub use collection::ServiceCollection;
pub use config::{ResolverOptions, SingletonSharing};
pub use descriptors::{ParameterDescriptor, ServiceDescriptor};
pub use error::{DiError, DiResult};
pub use generic::{Binding, OpenContract, Template, TemplateSet};
pub use key::{ContractId, DependencyKey, ImplementationId, Qualifier};
pub use lifecycle::Lifecycle;
pub use observer::{DiObserver, LoggingObserver};
pub use provider::{ResolutionContext, ServiceProvider};
pub use singletons::{SingletonCache, SingletonKey, SingletonStats};
pub use traits::{
    Arguments, Component, Constructor, Implements, Parameter, ParameterKind, Resolver, ResolverCore,
};

#[cfg(feature = "graph-export")]
pub use graph_export::{DependencyGraph, GraphEdge, GraphMetadata, GraphNode};
