//! Error kinds raised by fallible world operations.
//!
//! Mirrors the distinct failure domains a rigid-body simulator needs:
//! reentrancy rejection, handle-space exhaustion, bad construction
//! arguments, out-of-range indices, and non-finite solver state.

/// Error type for world/body/shape/joint construction and mutation.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// A structural mutation was attempted while the world was locked
    /// (i.e. from inside `World::step` or one of its callbacks).
    #[error("world is locked (mutation attempted during step)")]
    WrongState,

    /// Creating a body/joint/shape would exceed the handle space.
    #[error("creating this entity would exceed the maximum count")]
    LengthError,

    /// A shape, joint, or body definition carried an invalid value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A joint anchor index or TOI-query index was out of bounds.
    #[error("index out of range")]
    OutOfRange,

    /// A derived quantity that must be finite was NaN or infinite.
    #[error("non-finite value encountered: {0}")]
    DomainError(String),
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Clamp a possibly non-finite value to `fallback`, logging at `warn`.
///
/// Convergence failures deep in the solver (a near-singular Jacobian, a
/// degenerate simplex) are not treated as hard errors: clamp and let the
/// step continue rather than abort it.
#[inline]
pub fn finite_or(value: f32, fallback: f32, context: &str) -> f32 {
    if value.is_finite() {
        value
    } else {
        log::warn!("non-finite value in {context}, clamping to {fallback}");
        fallback
    }
}
