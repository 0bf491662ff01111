//! The `Operation` trait: one reversible stage of a pipeline.

use crate::error::OperationResult;

/// A pipeline stage with mirrored forward and backward behavior.
///
/// `forward` runs when encoding (typed message towards bytes), `backward`
/// when decoding. The two are mirrors, not necessarily literal inverses:
/// formatting serializes forward and parses backward, a signature stage
/// signs forward and verifies-then-strips backward.
///
/// Operations are shared across threads and invocations and must not carry
/// mutable state between calls.
pub trait Operation<I, O>: Send + Sync {
    /// Human-readable stage name used in errors and logs.
    fn name(&self) -> String;

    /// Encode direction.
    fn forward(&self, input: I) -> OperationResult<O>;

    /// Decode direction.
    fn backward(&self, input: O) -> OperationResult<I>;
}

/// Short type name without the module path, for stage names.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
