use std::sync::Arc;

use crate::internals::{DispatchEngine, Roster, S32};

pub trait Querying {
    /// Live handles of one tag, in creation order.
    fn instances_of<T: Into<S32>>(&self, tag: T) -> Roster;
}

impl Querying for Arc<DispatchEngine> {
    fn instances_of<T: Into<S32>>(&self, tag: T) -> Roster {
        self.engine_state.instances_of(tag.into()).into()
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */
