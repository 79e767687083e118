use std::{collections::HashMap, sync::Mutex};

use super::{
    datatypes::{OperationContract, StateField, TypeSchema, S32},
    errors::DispatchError,
};

#[derive(Clone, PartialEq, Eq, Debug)]
/// The per-type metadata record: its tag, its single parent link, the
/// state fields it introduces and the operation contracts it declares.
/// Descriptors are built once during setup and never change afterwards.
pub struct TypeDescriptor {
    pub tag: S32,
    pub parent: Option<S32>,
    pub fields: Vec<StateField>,
    pub contracts: Vec<OperationContract>,
}

impl From<TypeSchema> for TypeDescriptor {
    fn from(schema: TypeSchema) -> Self {
        match schema {
            TypeSchema::Virtual {
                tag,
                parent,
                operations,
            } => TypeDescriptor {
                tag,
                parent,
                fields: vec![],
                contracts: operations,
            },

            TypeSchema::Record {
                tag,
                parent,
                fields,
            } => TypeDescriptor {
                tag,
                parent,
                fields,
                contracts: vec![],
            },
        }
    }
}

#[derive(Default, Debug)]
/// The type-level index holding every declared descriptor by tag.
pub struct DescriptorIndex {
    pub descriptor_map: Mutex<HashMap<S32, TypeDescriptor>>,
}

impl DescriptorIndex {
    /// Declares one type. A parent must already be declared when its
    /// child arrives, so parent chains cannot form cycles.
    pub fn declare(&self, schema: TypeSchema) -> Result<TypeDescriptor, DispatchError> {
        let descriptor: TypeDescriptor = schema.into();
        let mut map = self.descriptor_map.lock().unwrap();

        if map.contains_key(&descriptor.tag) {
            return Err(DispatchError::DuplicateType(descriptor.tag));
        }

        if let Some(parent) = descriptor.parent {
            if !map.contains_key(&parent) {
                return Err(DispatchError::UnknownParent {
                    tag: descriptor.tag,
                    parent,
                });
            }
        }

        map.insert(descriptor.tag, descriptor.clone());
        Ok(descriptor)
    }

    pub fn has_type(&self, tag: &S32) -> bool {
        self.descriptor_map.lock().unwrap().contains_key(tag)
    }

    pub fn get_descriptor(&self, tag: S32) -> Result<TypeDescriptor, DispatchError> {
        self.descriptor_map
            .lock()
            .unwrap()
            .get(&tag)
            .cloned()
            .ok_or(DispatchError::UnknownType(tag))
    }

    /// The whole chain from `tag` up to its root, most-derived first.
    pub fn ancestry(&self, tag: S32) -> Result<Vec<TypeDescriptor>, DispatchError> {
        let map = self.descriptor_map.lock().unwrap();
        let mut chain = vec![];
        let mut cursor = Some(tag);

        while let Some(t) = cursor {
            let descriptor = map.get(&t).cloned().ok_or(DispatchError::UnknownType(t))?;
            cursor = descriptor.parent;
            chain.push(descriptor);
        }

        Ok(chain)
    }

    /// State fields over the whole chain, root-first - the order in
    /// which a base-before-derived construction would fill them.
    pub fn chain_fields(&self, tag: S32) -> Result<Vec<StateField>, DispatchError> {
        let mut chain = self.ancestry(tag)?;
        chain.reverse();
        Ok(chain.into_iter().flat_map(|d| d.fields).collect())
    }

    /// Every contract declared anywhere on the chain, most-derived
    /// declaration first; a redeclaration nearer the leaf shadows the
    /// one above it.
    pub fn chain_contracts(&self, tag: S32) -> Result<Vec<OperationContract>, DispatchError> {
        let mut collected: Vec<OperationContract> = vec![];

        for descriptor in self.ancestry(tag)? {
            for contract in descriptor.contracts {
                if !collected.iter().any(|c| c.name == contract.name) {
                    collected.push(contract);
                }
            }
        }

        Ok(collected)
    }

    /// The contract governing `operation` for `tag`, if any type on the
    /// chain declared one.
    pub fn contract_of(
        &self,
        tag: S32,
        operation: S32,
    ) -> Result<Option<OperationContract>, DispatchError> {
        Ok(self
            .chain_contracts(tag)?
            .into_iter()
            .find(|c| c.name == operation))
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */
