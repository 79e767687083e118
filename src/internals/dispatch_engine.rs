use std::sync::Arc;

use super::{
    datatypes::{Value, S32},
    descriptor::TypeDescriptor,
    engine_state::EngineState,
    errors::DispatchError,
    instance::Handle,
    lifecycle::Lifecycle,
    registry::OperationFn,
};

/// The user-facing engine: an `Arc`'d facade over [`EngineState`] that
/// loads schemas, accepts behavior registrations, and hands out
/// handles and capability layers.
pub struct DispatchEngine {
    pub(crate) engine_state: Arc<EngineState>,
}

impl PartialEq for DispatchEngine {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Default for DispatchEngine {
    fn default() -> Self {
        Self {
            engine_state: EngineState::new(),
        }
    }
}

impl DispatchEngine {
    pub fn new() -> Arc<DispatchEngine> {
        Arc::new(DispatchEngine::default())
    }

    /// Declares every type found in a schema definition, in order.
    pub fn load_schema(&self, definition: &str) -> anyhow::Result<Vec<TypeDescriptor>> {
        self.engine_state.add_type_schemas(definition)
    }

    pub fn register<T: Into<S32>, O: Into<S32>>(
        &self,
        tag: T,
        operation: O,
        behavior: OperationFn,
    ) -> Result<(), DispatchError> {
        self.engine_state
            .register_behavior(tag.into(), operation.into(), behavior)
    }

    pub fn is_concrete<T: Into<S32>>(&self, tag: T) -> Result<bool, DispatchError> {
        self.engine_state.is_concrete(tag.into())
    }

    pub fn resolve<T: Into<S32>, O: Into<S32>>(
        &self,
        tag: T,
        operation: O,
    ) -> Result<(S32, OperationFn), DispatchError> {
        self.engine_state.resolve(tag.into(), operation.into())
    }

    pub fn is_alive(&self, handle: &Handle) -> bool {
        self.engine_state.is_alive(handle)
    }
}

impl Lifecycle for Arc<DispatchEngine> {
    type Entity = Handle;

    fn create_instance(&self, tag: S32, values: Vec<Value>) -> Result<Handle, DispatchError> {
        self.engine_state.create_instance(tag, values)
    }

    fn destroy_instance(&self, handle: &Handle) {
        self.engine_state.destroy_instance(handle)
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */
