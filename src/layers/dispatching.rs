use std::sync::Arc;

use crate::internals::{DispatchEngine, DispatchError, Handle, Value, S32};

/// Late binding as a capability: the same call site selects the
/// behavior by the handle's runtime tag, never by the reference the
/// caller happens to hold.
pub trait Dispatching {
    fn invoke<O: Into<S32>>(
        &self,
        handle: &Handle,
        operation: O,
        args: &[Value],
    ) -> Result<Value, DispatchError>;
}

impl Dispatching for Arc<DispatchEngine> {
    fn invoke<O: Into<S32>>(
        &self,
        handle: &Handle,
        operation: O,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        self.engine_state.invoke(handle, operation.into(), args)
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */
