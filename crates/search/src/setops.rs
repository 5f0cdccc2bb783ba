//! Set-algebra primitives
//!
//! Each primitive writes the intersection, union or difference of its
//! operands into a freshly named result set `idx:<uuid>` and arms a TTL on
//! it. Operands are names (terms or result set identifiers), never keys:
//! the `idx:` prefix is applied here.
//!
//! [`queue_set_op`] appends the two commands to a caller-owned pipeline
//! without executing, so several primitives can be chained in one batch by
//! feeding a returned identifier into the next call.

use std::time::Duration;

use sift_core::{Pipeline, ResultSetId, SetKey, SetOp, SetStore};
use tracing::warn;

use crate::error::{SearchError, SearchResult, Stage};

/// Lifetime of a result set when the caller does not choose one
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(30);

/// Queue `op` over `names` into `pipeline`, returning the destination id
///
/// Nothing is sent to the store; the identifier is valid as an operand for
/// later commands in the same pipeline.
pub fn queue_set_op<N: AsRef<str>>(
    pipeline: &mut Pipeline,
    op: SetOp,
    names: &[N],
    ttl: Duration,
) -> ResultSetId {
    let id = ResultSetId::generate();
    let sources = names
        .iter()
        .map(|name| SetKey::for_name(name.as_ref()))
        .collect();
    pipeline
        .store_set_op(op, id.key(), sources)
        .expire(id.key(), ttl);
    id
}

/// Run `op` over `names` in its own atomic pipeline
///
/// # Errors
///
/// Returns `SearchError::EvaluationFailure` with `Stage::Primitive(op)`.
pub fn set_op<S, N>(store: &S, op: SetOp, names: &[N], ttl: Duration) -> SearchResult<ResultSetId>
where
    S: SetStore + ?Sized,
    N: AsRef<str>,
{
    let mut pipe = Pipeline::new();
    let id = queue_set_op(&mut pipe, op, names, ttl);
    store.execute(pipe).map_err(|source| {
        warn!(target: "sift::eval", op = %op, error = %source, "Set operation failed");
        SearchError::EvaluationFailure {
            stage: Stage::Primitive(op),
            source,
        }
    })?;
    Ok(id)
}

/// Intersect the named sets into a new result set
///
/// # Errors
///
/// See [`set_op`].
pub fn intersect<S, N>(store: &S, names: &[N], ttl: Duration) -> SearchResult<ResultSetId>
where
    S: SetStore + ?Sized,
    N: AsRef<str>,
{
    set_op(store, SetOp::Intersect, names, ttl)
}

/// Union the named sets into a new result set
///
/// # Errors
///
/// See [`set_op`].
pub fn union<S, N>(store: &S, names: &[N], ttl: Duration) -> SearchResult<ResultSetId>
where
    S: SetStore + ?Sized,
    N: AsRef<str>,
{
    set_op(store, SetOp::Union, names, ttl)
}

/// Subtract every later named set from the first into a new result set
///
/// # Errors
///
/// See [`set_op`].
pub fn difference<S, N>(store: &S, names: &[N], ttl: Duration) -> SearchResult<ResultSetId>
where
    S: SetStore + ?Sized,
    N: AsRef<str>,
{
    set_op(store, SetOp::Difference, names, ttl)
}

/// Re-arm the TTL of a result set
///
/// Returns false if the set has already expired (or was empty and never
/// materialized).
///
/// # Errors
///
/// Returns `SearchError::EvaluationFailure` with `Stage::ExtendTtl`.
pub fn extend_ttl<S>(store: &S, id: &ResultSetId, ttl: Duration) -> SearchResult<bool>
where
    S: SetStore + ?Sized,
{
    store
        .expire(id.key(), ttl)
        .map_err(|source| SearchError::EvaluationFailure {
            stage: Stage::ExtendTtl,
            source,
        })
}
