use std::fmt::Display;

use fstr::FStr;

pub type InstanceId = usize;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct S32(pub FStr<32>);
impl Copy for S32 {}

impl From<&str> for S32 {
    fn from(value: &str) -> Self {
        S32(FStr::<32>::from_str_lossy(value, b'\0'))
    }
}

impl From<String> for S32 {
    fn from(value: String) -> Self {
        S32(FStr::<32>::from_str_lossy(value.as_str(), b'\0'))
    }
}

impl Display for S32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.replace('\0', "").trim())
    }
}

impl std::fmt::Debug for S32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.replace('\0', "").trim())
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Datatype {
    VOID,
    BOOL,
    IID,
    I64,
    U64,
    F64,
    S32,
}

impl Datatype {
    pub fn get_default(&self) -> Value {
        match self {
            Datatype::VOID => Value::VOID,
            Datatype::BOOL => Value::BOOL(false),
            Datatype::IID => Value::IID(0),
            Datatype::I64 => Value::I64(0),
            Datatype::U64 => Value::U64(0),
            Datatype::F64 => Value::F64(0.0),
            Datatype::S32 => Value::S32("".into()),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    VOID,
    BOOL(bool),
    IID(InstanceId),
    I64(i64),
    U64(u64),
    F64(f64),
    S32(S32),
}

impl Value {
    pub fn get_datatype(&self) -> Datatype {
        match self {
            Value::VOID => Datatype::VOID,
            Value::BOOL(_) => Datatype::BOOL,
            Value::IID(_) => Datatype::IID,
            Value::I64(_) => Datatype::I64,
            Value::U64(_) => Datatype::U64,
            Value::F64(_) => Datatype::F64,
            Value::S32(_) => Datatype::S32,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::BOOL(v) => *v,
            _ => panic!("Cannot get type variant BOOL"),
        }
    }

    pub fn as_iid(&self) -> InstanceId {
        match self {
            Value::IID(v) => *v,
            _ => panic!("Cannot get type variant IID"),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Value::I64(v) => *v,
            _ => panic!("Cannot get type variant I64"),
        }
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            Value::U64(v) => *v,
            _ => panic!("Cannot get type variant U64"),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::F64(v) => *v,
            _ => panic!("Cannot get type variant F64"),
        }
    }

    pub fn as_s32(&self) -> S32 {
        match self {
            Value::S32(v) => *v,
            _ => panic!("Cannot get type variant S32"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
/// A unit of instance state introduced by one type in a chain.
pub struct StateField {
    pub name: S32,
    pub datatype: Datatype,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
/// A named operation a chain promises to its callers, together with the
/// datatype every registered behavior for it must return.
pub struct OperationContract {
    pub name: S32,
    pub returns: Datatype,
}

#[derive(Clone, PartialEq, Eq, Debug)]
/// The parsed form of one schema declaration, before it becomes a
/// descriptor in the engine.
pub enum TypeSchema {
    Virtual {
        tag: S32,
        parent: Option<S32>,
        operations: Vec<OperationContract>,
    },

    Record {
        tag: S32,
        parent: Option<S32>,
        fields: Vec<StateField>,
    },
}

impl TypeSchema {
    pub fn is_virtual(&self) -> bool {
        matches!(self, TypeSchema::Virtual { .. })
    }

    pub fn is_record(&self) -> bool {
        matches!(self, TypeSchema::Record { .. })
    }

    pub fn tag(&self) -> S32 {
        match self {
            TypeSchema::Virtual { tag, .. } => *tag,
            TypeSchema::Record { tag, .. } => *tag,
        }
    }

    pub fn parent(&self) -> Option<S32> {
        match self {
            TypeSchema::Virtual { parent, .. } => *parent,
            TypeSchema::Record { parent, .. } => *parent,
        }
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */
