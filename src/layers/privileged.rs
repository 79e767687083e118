use std::sync::Arc;

use crate::internals::{DispatchEngine, DispatchError, Handle, Value, S32};

/// A deliberately narrow, explicitly granted read path into instance
/// state - the friend declaration of this engine. Everything else goes
/// through registered behaviors.
pub struct FieldInspector {
    engine: Arc<DispatchEngine>,
}

pub trait PrivilegedAccess {
    fn grant_inspector(&self) -> FieldInspector;
}

impl PrivilegedAccess for Arc<DispatchEngine> {
    fn grant_inspector(&self) -> FieldInspector {
        FieldInspector {
            engine: Arc::clone(self),
        }
    }
}

impl FieldInspector {
    pub fn peek<F: Into<S32>>(&self, handle: &Handle, field: F) -> Result<Value, DispatchError> {
        self.engine.engine_state.peek_field(handle, field.into())
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */
