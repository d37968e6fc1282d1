//! Error types for registration and resolution.

use thiserror::Error;

/// Registration and resolution errors.
///
/// Every failure inside a recursive resolution propagates unchanged to the
/// caller of the outermost `resolve`; there is no fallback implementation
/// and no partially built object.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{DiError, Resolver, ServiceCollection};
///
/// trait Missing: Send + Sync {}
///
/// let provider = ServiceCollection::new().build();
/// match provider.resolve::<dyn Missing>() {
///     Err(DiError::NotRegistered(name)) => assert!(name.contains("Missing")),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_wire::DiError;
///
/// let cycle = DiError::CyclicDependency(vec!["dyn A[0]".into(), "dyn B[0]".into(), "dyn A[0]".into()]);
/// assert_eq!(cycle.to_string(), "Cyclic dependency: dyn A[0] -> dyn B[0] -> dyn A[0]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// Contract (or collection element contract) has no registrations
    #[error("Contract not registered: {0}")]
    NotRegistered(&'static str),
    /// Qualifier ordinal is beyond the registered implementations
    #[error("Key {key} out of range for {contract} ({registered} registered)")]
    KeyOutOfRange {
        contract: &'static str,
        key: usize,
        registered: usize,
    },
    /// Implementation rejected at registration time
    #[error("Invalid implementation {implementation}: {reason}")]
    InvalidImplementation {
        implementation: &'static str,
        reason: String,
    },
    /// Constructor parameter is a primitive value rather than a contract
    #[error("Invalid parameter {position} of {implementation}: {parameter} is not a contract")]
    InvalidParameter {
        implementation: &'static str,
        position: usize,
        parameter: &'static str,
    },
    /// Resolution revisited a contract and key within one call (includes path)
    #[error("Cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Constructor consumed a different number of arguments than it declared
    #[error("Constructor of {implementation} declares {declared} parameters but consumed {consumed}")]
    ArgumentMismatch {
        implementation: &'static str,
        declared: usize,
        consumed: usize,
    },
    /// Resolver options could not be read
    #[error("Invalid resolver options: {0}")]
    InvalidOptions(String),
    /// Dependency graph could not be serialized
    #[error("Graph export failed: {0}")]
    Export(String),
}

impl DiError {
    /// Returns `true` for failures raised while registering rather than resolving.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, DiError::InvalidImplementation { .. })
    }
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
