use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use atomic_counter::{AtomicCounter, RelaxedCounter};
use itertools::Itertools;
use ordered_multimap::ListOrderedMultimap;
use slab::Slab;

use super::{
    datatypes::{InstanceId, StateField, TypeSchema, Value, S32},
    descriptor::{DescriptorIndex, TypeDescriptor},
    errors::DispatchError,
    instance::{Handle, InstanceData, Receiver},
    registry::{BehaviorRegistry, OperationFn},
    schema_grammar::SchemaParser,
};

/// The full state of the engine: the type-level indices populated once
/// during setup, and the instance-level book-keeping that changes as
/// objects come and go.
pub struct EngineState {
    // Type-level indices (read-only after setup)

    /// Every declared type descriptor by tag
    pub descriptors: DescriptorIndex,

    /// Every registered behavior by (tag, operation)
    pub behaviors: BehaviorRegistry,

    // Instance-level book-keeping

    /// Instance id source - grows by one for every created instance
    pub(crate) instance_counter: RelaxedCounter,

    /// The slots that own live instance state
    pub(crate) instance_slab: Mutex<Slab<InstanceData>>,

    /// Maps an instance id to its slab slot
    pub(crate) id_allocation_index: Mutex<HashMap<InstanceId, usize>>,

    /// Live instance ids per tag, in creation order
    pub(crate) instances_by_tag_index: Mutex<ListOrderedMultimap<S32, InstanceId>>,
}

impl Default for EngineState {
    fn default() -> Self {
        EngineState {
            descriptors: DescriptorIndex::default(),
            behaviors: BehaviorRegistry::default(),
            instance_counter: RelaxedCounter::new(1),
            instance_slab: Mutex::new(Slab::new()),
            id_allocation_index: Mutex::new(HashMap::new()),
            instances_by_tag_index: Mutex::new(ListOrderedMultimap::new()),
        }
    }
}

/// Private implementations for engine state
impl EngineState {
    fn get_next_instance_id(&self) -> InstanceId {
        self.instance_counter.inc()
    }

    fn index_instance_by_tag(&self, tag: S32, id: InstanceId) {
        self.instances_by_tag_index.lock().unwrap().append(tag, id);
    }

    fn unindex_instance_by_tag(&self, tag: S32, id: InstanceId) {
        let mut index = self.instances_by_tag_index.lock().unwrap();
        let remaining = index.remove_all(&tag).filter(|e| *e != id).collect_vec();
        for survivor in remaining {
            index.append(tag, survivor);
        }
    }

    /// Matches positional values against the chain's field list. An
    /// empty value list stands for "all defaults", mirroring a default
    /// constructor; otherwise the arity must match exactly.
    fn unify_fields_and_values(
        &self,
        tag: S32,
        fields: Vec<StateField>,
        values: Vec<Value>,
    ) -> Result<HashMap<S32, Value>, DispatchError> {
        if values.is_empty() && !fields.is_empty() {
            return Ok(fields
                .into_iter()
                .map(|f| (f.name, f.datatype.get_default()))
                .collect());
        }

        if fields.len() != values.len() {
            return Err(DispatchError::ArityMismatch {
                tag,
                expected: fields.len(),
                found: values.len(),
            });
        }

        let mut unified = HashMap::new();
        for (field, value) in fields.into_iter().zip(values) {
            if value.get_datatype() != field.datatype {
                return Err(DispatchError::FieldMismatch {
                    tag,
                    field: field.name,
                    expected: field.datatype,
                    found: value.get_datatype(),
                });
            }
            unified.insert(field.name, value);
        }

        Ok(unified)
    }
}

/// Public implementations for engine state
impl EngineState {
    pub fn new() -> Arc<EngineState> {
        Arc::new(EngineState::default())
    }

    /// Parse a schema definition and declare every type in it, in
    /// order, so a parent may arrive in the same string as its child.
    pub fn add_type_schemas(&self, definition: &str) -> anyhow::Result<Vec<TypeDescriptor>> {
        let schemas = SchemaParser::parse_all(definition)?;
        let mut declared = vec![];
        for schema in schemas {
            declared.push(self.declare_type(schema)?);
        }
        Ok(declared)
    }

    pub fn declare_type(&self, schema: TypeSchema) -> Result<TypeDescriptor, DispatchError> {
        self.descriptors.declare(schema)
    }

    pub fn register_behavior(
        &self,
        tag: S32,
        operation: S32,
        behavior: OperationFn,
    ) -> Result<(), DispatchError> {
        if !self.descriptors.has_type(&tag) {
            return Err(DispatchError::UnknownType(tag));
        }

        self.behaviors.register(tag, operation, behavior)
    }

    /// Walks the ancestor chain most-derived-first and returns the
    /// first behavior registered for `operation`, together with the
    /// tag it was found on.
    pub fn resolve(&self, tag: S32, operation: S32) -> Result<(S32, OperationFn), DispatchError> {
        for descriptor in self.descriptors.ancestry(tag)? {
            if let Some(behavior) = self.behaviors.lookup(descriptor.tag, operation) {
                return Ok((descriptor.tag, behavior));
            }
        }

        Err(DispatchError::UnresolvedOperation { tag, operation })
    }

    /// A type is concrete exactly when every contract on its chain
    /// resolves for it.
    pub fn is_concrete(&self, tag: S32) -> Result<bool, DispatchError> {
        for contract in self.descriptors.chain_contracts(tag)? {
            if self.resolve(tag, contract.name).is_err() {
                return Ok(false);
            }
        }

        Ok(true)
    }

    pub fn create_instance(&self, tag: S32, values: Vec<Value>) -> Result<Handle, DispatchError> {
        if !self.is_concrete(tag)? {
            return Err(DispatchError::AbstractInstantiation(tag));
        }

        let fields = self.descriptors.chain_fields(tag)?;
        let unified = self.unify_fields_and_values(tag, fields, values)?;

        let id = self.get_next_instance_id();
        let slot = self.instance_slab.lock().unwrap().insert(InstanceData {
            id,
            tag,
            fields: unified,
        });
        self.id_allocation_index.lock().unwrap().insert(id, slot);
        self.index_instance_by_tag(tag, id);

        Ok(Handle { id, tag })
    }

    pub fn destroy_instance(&self, handle: &Handle) {
        if let Some(slot) = self.id_allocation_index.lock().unwrap().remove(&handle.id) {
            self.instance_slab.lock().unwrap().remove(slot);
        }

        self.unindex_instance_by_tag(handle.tag, handle.id);
    }

    pub fn is_alive(&self, handle: &Handle) -> bool {
        self.id_allocation_index
            .lock()
            .unwrap()
            .contains_key(&handle.id)
    }

    /// The whole late-binding story: resolve by the handle's runtime
    /// tag, hand the behavior a receiver view of the instance state,
    /// and check what comes back against the governing contract.
    pub fn invoke(
        &self,
        handle: &Handle,
        operation: S32,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        let (_, behavior) = self.resolve(handle.tag, operation)?;
        let contract = self.descriptors.contract_of(handle.tag, operation)?;

        let slot = *self
            .id_allocation_index
            .lock()
            .unwrap()
            .get(&handle.id)
            .ok_or(DispatchError::StaleHandle(handle.id))?;

        let mut slab = self.instance_slab.lock().unwrap();
        let data = slab
            .get_mut(slot)
            .ok_or(DispatchError::StaleHandle(handle.id))?;

        let mut receiver = Receiver::new(data.tag, data.id, &mut data.fields);
        let returned = behavior(&mut receiver, args)?;

        if let Some(contract) = contract {
            if returned.get_datatype() != contract.returns {
                return Err(DispatchError::ReturnMismatch {
                    tag: handle.tag,
                    operation,
                    expected: contract.returns,
                    found: returned.get_datatype(),
                });
            }
        }

        Ok(returned)
    }

    /// Live handles of one tag, in creation order.
    pub fn instances_of(&self, tag: S32) -> Vec<Handle> {
        self.instances_by_tag_index
            .lock()
            .unwrap()
            .get_all(&tag)
            .map(|id| Handle { id: *id, tag })
            .collect_vec()
    }

    /// The friend door: a deliberately narrow read of a single field,
    /// granted explicitly through the privileged access layer.
    pub(crate) fn peek_field(&self, handle: &Handle, field: S32) -> Result<Value, DispatchError> {
        let slot = *self
            .id_allocation_index
            .lock()
            .unwrap()
            .get(&handle.id)
            .ok_or(DispatchError::StaleHandle(handle.id))?;

        let slab = self.instance_slab.lock().unwrap();
        let data = slab
            .get(slot)
            .ok_or(DispatchError::StaleHandle(handle.id))?;

        data.fields
            .get(&field)
            .cloned()
            .ok_or(DispatchError::UnknownField {
                tag: handle.tag,
                field,
            })
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */

#[cfg(test)]
mod engine_state_testing {
    use crate::internals::datatypes::{Datatype, Value, S32};
    use crate::internals::errors::DispatchError;
    use crate::internals::instance::Receiver;

    use super::EngineState;

    fn give_five(_: &mut Receiver, _: &[Value]) -> Result<Value, DispatchError> {
        Ok(Value::F64(5.0))
    }

    fn give_word(_: &mut Receiver, _: &[Value]) -> Result<Value, DispatchError> {
        Ok(Value::S32("word".into()))
    }

    #[test]
    fn test_get_next_instance_id() {
        let engine_state = EngineState::default();
        assert_eq!(1, engine_state.get_next_instance_id());
        assert_eq!(2, engine_state.get_next_instance_id());
        assert_eq!(3, engine_state.get_next_instance_id());
    }

    #[test]
    fn test_register_against_undeclared_type() {
        let engine_state = EngineState::default();

        assert_eq!(
            Err(DispatchError::UnknownType("Ghost".into())),
            engine_state.register_behavior("Ghost".into(), "area".into(), give_five)
        );
    }

    #[test]
    fn test_resolution_walks_the_chain() {
        let engine_state = EngineState::default();
        engine_state
            .add_type_schemas("Shape : virtual { area: f64 }; Circle : Shape product { radius: f64 };")
            .unwrap();
        engine_state
            .register_behavior("Shape".into(), "area".into(), give_five)
            .unwrap();

        let (found_on, _) = engine_state
            .resolve("Circle".into(), "area".into())
            .unwrap();
        assert_eq!(S32::from("Shape"), found_on);
    }

    #[test]
    fn test_create_instance_indexes_the_instance() {
        let engine_state = EngineState::default();
        engine_state
            .add_type_schemas("Counter : product { count: u64 };")
            .unwrap();

        let handle = engine_state
            .create_instance("Counter".into(), vec![Value::U64(4)])
            .unwrap();

        assert!(engine_state.is_alive(&handle));
        assert_eq!(vec![handle], engine_state.instances_of("Counter".into()));
        assert_eq!(
            Value::U64(4),
            engine_state.peek_field(&handle, "count".into()).unwrap()
        );
    }

    #[test]
    fn test_destroy_instance_unindexes_the_instance() {
        let engine_state = EngineState::default();
        engine_state
            .add_type_schemas("Counter : product { count: u64 };")
            .unwrap();

        let first = engine_state
            .create_instance("Counter".into(), vec![Value::U64(1)])
            .unwrap();
        let second = engine_state
            .create_instance("Counter".into(), vec![Value::U64(2)])
            .unwrap();

        engine_state.destroy_instance(&first);

        assert!(!engine_state.is_alive(&first));
        assert!(engine_state.is_alive(&second));
        assert_eq!(vec![second], engine_state.instances_of("Counter".into()));
        assert_eq!(
            Err(DispatchError::StaleHandle(first.id)),
            engine_state.peek_field(&first, "count".into())
        );
    }

    #[test]
    fn test_empty_values_fill_field_defaults() {
        let engine_state = EngineState::default();
        engine_state
            .add_type_schemas("Counter : product { count: u64 };")
            .unwrap();

        let handle = engine_state.create_instance("Counter".into(), vec![]).unwrap();
        assert_eq!(
            Value::U64(0),
            engine_state.peek_field(&handle, "count".into()).unwrap()
        );
    }

    #[test]
    fn test_field_value_mismatches_are_rejected() {
        let engine_state = EngineState::default();
        engine_state
            .add_type_schemas("Counter : product { count: u64 };")
            .unwrap();

        assert_eq!(
            Err(DispatchError::FieldMismatch {
                tag: "Counter".into(),
                field: "count".into(),
                expected: Datatype::U64,
                found: Datatype::F64,
            }),
            engine_state
                .create_instance("Counter".into(), vec![Value::F64(1.0)])
                .map(|_| ())
        );

        assert_eq!(
            Err(DispatchError::ArityMismatch {
                tag: "Counter".into(),
                expected: 1,
                found: 2,
            }),
            engine_state
                .create_instance("Counter".into(), vec![Value::U64(1), Value::U64(2)])
                .map(|_| ())
        );
    }

    #[test]
    fn test_invoke_checks_the_return_contract() {
        let engine_state = EngineState::default();
        engine_state
            .add_type_schemas("Shape : virtual { area: f64 }; Blob : Shape product { };")
            .unwrap();
        engine_state
            .register_behavior("Blob".into(), "area".into(), give_word)
            .unwrap();

        let handle = engine_state.create_instance("Blob".into(), vec![]).unwrap();

        assert_eq!(
            Err(DispatchError::ReturnMismatch {
                tag: "Blob".into(),
                operation: "area".into(),
                expected: Datatype::F64,
                found: Datatype::S32,
            }),
            engine_state.invoke(&handle, "area".into(), &[])
        );
    }
}
