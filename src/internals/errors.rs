use thiserror::Error;

use super::datatypes::{Datatype, InstanceId, S32};

/// Everything that can go wrong while building or exercising a type
/// graph. All of these are setup or invariant errors: the right
/// response is to fail fast, never to retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("type '{0}' is already declared")]
    DuplicateType(S32),

    #[error("type '{tag}' names parent '{parent}' which is not declared")]
    UnknownParent { tag: S32, parent: S32 },

    #[error("type '{0}' is not declared")]
    UnknownType(S32),

    #[error("a behavior for '{tag}.{operation}' is already registered")]
    DuplicateRegistration { tag: S32, operation: S32 },

    #[error("operation '{operation}' does not resolve anywhere in the ancestry of '{tag}'")]
    UnresolvedOperation { tag: S32, operation: S32 },

    #[error("type '{0}' is abstract and cannot be instantiated")]
    AbstractInstantiation(S32),

    #[error("type '{tag}' takes {expected} field values, {found} given")]
    ArityMismatch {
        tag: S32,
        expected: usize,
        found: usize,
    },

    #[error("field '{field}' of '{tag}' holds {expected:?}, {found:?} given")]
    FieldMismatch {
        tag: S32,
        field: S32,
        expected: Datatype,
        found: Datatype,
    },

    #[error("'{tag}' has no field named '{field}'")]
    UnknownField { tag: S32, field: S32 },

    #[error("instance {0} is no longer alive")]
    StaleHandle(InstanceId),

    #[error("'{tag}.{operation}' returned {found:?} where its contract promises {expected:?}")]
    ReturnMismatch {
        tag: S32,
        operation: S32,
        expected: Datatype,
        found: Datatype,
    },
}
