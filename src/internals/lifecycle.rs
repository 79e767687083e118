use super::{datatypes::Value, errors::DispatchError, S32 as TypeTag};

pub trait Lifecycle {
    type Entity;

    fn create_instance(&self, tag: TypeTag, values: Vec<Value>)
        -> Result<Self::Entity, DispatchError>;

    fn destroy_instance(&self, entity: &Self::Entity);
}
