//! The pipeline engine.
//!
//! A [`Pipeline`] is an ordered, immutable chain of [`Operation`]s built once
//! with a [`PipelineBuilder`] and reused for many invocations.
//!
//! ```text
//! execute:           I --op1--> A --op2--> B --op3--> O
//! execute_backward:  I <--op1-- A <--op2-- B <--op3-- O
//! ```
//!
//! The builder is typed: adding an `Operation<O, N>` to a
//! `PipelineBuilder<I, O>` yields a `PipelineBuilder<I, N>`, so stages that
//! do not fit together are rejected at compile time.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Direction, PipelineError, Result};
use crate::operation::Operation;

type Stage<A, B> = Arc<dyn Fn(A) -> Result<B> + Send + Sync>;

/// Accumulates operations in forward order.
pub struct PipelineBuilder<I, O> {
    forward: Stage<I, O>,
    backward: Stage<O, I>,
    operations: Vec<String>,
}

impl<T: 'static> PipelineBuilder<T, T> {
    /// Start from the identity pipeline.
    pub fn new() -> Self {
        Self {
            forward: Arc::new(|input: T| -> Result<T> { Ok(input) }),
            backward: Arc::new(|input: T| -> Result<T> { Ok(input) }),
            operations: Vec::new(),
        }
    }
}

impl<T: 'static> Default for PipelineBuilder<T, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: 'static, O: 'static> PipelineBuilder<I, O> {
    /// Append an operation. It runs after every operation added so far on
    /// the forward pass and before them on the backward pass.
    pub fn add_operation<N, Op>(self, operation: Op) -> PipelineBuilder<I, N>
    where
        N: 'static,
        Op: Operation<O, N> + 'static,
    {
        let operation = Arc::new(operation);
        let name = operation.name();

        let prev_forward = self.forward;
        let forward_op = Arc::clone(&operation);
        let forward_name = name.clone();
        let forward: Stage<I, N> = Arc::new(move |input: I| -> Result<N> {
            let intermediate = prev_forward(input)?;
            forward_op
                .forward(intermediate)
                .map_err(|source| PipelineError::new(forward_name.as_str(), Direction::Forward, source))
        });

        let prev_backward = self.backward;
        let backward_name = name.clone();
        let backward: Stage<N, I> = Arc::new(move |input: N| -> Result<I> {
            let intermediate = operation
                .backward(input)
                .map_err(|source| PipelineError::new(backward_name.as_str(), Direction::Backward, source))?;
            prev_backward(intermediate)
        });

        let mut operations = self.operations;
        operations.push(name);

        PipelineBuilder {
            forward,
            backward,
            operations,
        }
    }

    /// Freeze the pipeline.
    pub fn build(self) -> Pipeline<I, O> {
        Pipeline {
            forward: self.forward,
            backward: self.backward,
            operations: self.operations.into(),
        }
    }
}

/// An immutable, reusable chain of operations.
///
/// Cheap to clone; clones share the same stages.
pub struct Pipeline<I, O> {
    forward: Stage<I, O>,
    backward: Stage<O, I>,
    operations: Arc<[String]>,
}

impl<I, O> Pipeline<I, O> {
    /// Run every operation forward, in construction order.
    ///
    /// The first failing operation aborts the chain.
    pub fn execute(&self, input: I) -> Result<O> {
        (self.forward)(input).map_err(|e| self.trace_failure(e))
    }

    /// Run every operation backward, in reverse construction order.
    pub fn execute_backward(&self, input: O) -> Result<I> {
        (self.backward)(input).map_err(|e| self.trace_failure(e))
    }

    /// Stage names in forward order.
    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether this is the identity pipeline.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn trace_failure(&self, error: PipelineError) -> PipelineError {
        debug!(
            operation = %error.operation,
            direction = %error.direction,
            kind = %error.kind(),
            error = %error.source,
            "pipeline stage failed"
        );
        error
    }
}

impl<I, O> Clone for Pipeline<I, O> {
    fn clone(&self) -> Self {
        Self {
            forward: Arc::clone(&self.forward),
            backward: Arc::clone(&self.backward),
            operations: Arc::clone(&self.operations),
        }
    }
}

impl<I, O> fmt::Debug for Pipeline<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("operations", &self.operations)
            .finish()
    }
}
