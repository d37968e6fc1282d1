//! Core traits for components and resolvers.

mod component;
mod resolver;

pub use component::{Arguments, Component, Constructor, Implements, Parameter, ParameterKind};
pub use resolver::{Resolver, ResolverCore};
