use std::{collections::HashMap, sync::Mutex};

use super::{
    datatypes::{Value, S32},
    errors::DispatchError,
    instance::Receiver,
};

/// One registered implementation of an operation. Receives the view of
/// the object it was dispatched on plus the call-site arguments.
pub type OperationFn = fn(&mut Receiver, &[Value]) -> Result<Value, DispatchError>;

#[derive(Default)]
/// The behavior table: one implementation per `(type, operation)` pair,
/// populated during setup and read-only afterwards.
pub struct BehaviorRegistry {
    pub behavior_map: Mutex<HashMap<(S32, S32), OperationFn>>,
}

impl BehaviorRegistry {
    pub fn register(
        &self,
        tag: S32,
        operation: S32,
        behavior: OperationFn,
    ) -> Result<(), DispatchError> {
        let mut map = self.behavior_map.lock().unwrap();

        if map.contains_key(&(tag, operation)) {
            return Err(DispatchError::DuplicateRegistration { tag, operation });
        }

        map.insert((tag, operation), behavior);
        Ok(())
    }

    /// Only sees behaviors registered directly on `tag`; walking the
    /// ancestry is the resolver's job.
    pub fn lookup(&self, tag: S32, operation: S32) -> Option<OperationFn> {
        self.behavior_map
            .lock()
            .unwrap()
            .get(&(tag, operation))
            .copied()
    }

    pub fn has_behavior(&self, tag: S32, operation: S32) -> bool {
        self.behavior_map
            .lock()
            .unwrap()
            .contains_key(&(tag, operation))
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */

#[cfg(test)]
mod registry_testing {
    use crate::internals::datatypes::Value;
    use crate::internals::errors::DispatchError;
    use crate::internals::instance::Receiver;

    use super::BehaviorRegistry;

    fn noop(_: &mut Receiver, _: &[Value]) -> Result<Value, DispatchError> {
        Ok(Value::VOID)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = BehaviorRegistry::default();
        registry
            .register("Circle".into(), "area".into(), noop)
            .unwrap();

        assert!(registry.lookup("Circle".into(), "area".into()).is_some());
        assert!(registry.lookup("Circle".into(), "volume".into()).is_none());
        assert!(registry.lookup("Rectangle".into(), "area".into()).is_none());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let registry = BehaviorRegistry::default();
        registry
            .register("Circle".into(), "area".into(), noop)
            .unwrap();

        assert_eq!(
            Err(DispatchError::DuplicateRegistration {
                tag: "Circle".into(),
                operation: "area".into()
            }),
            registry.register("Circle".into(), "area".into(), noop)
        );
    }
}
