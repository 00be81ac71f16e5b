use std::fmt;
use std::rc::Rc;

/// The closed type lattice of the IR.
///
/// `Array` dims are in source order; a leading `0` denotes the unknown-bound
/// first dimension of an array-decayed parameter.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum IrType {
    Int32,
    Int1,
    Void,
    Pointer(Rc<IrType>),
    Array { elem: Rc<IrType>, dims: Vec<i32> },
}

impl IrType {
    pub fn pointer_to(elem: IrType) -> Self {
        Self::Pointer(Rc::new(elem))
    }
    pub fn array_of(elem: IrType, dims: Vec<i32>) -> Self {
        Self::Array { elem: Rc::new(elem), dims }
    }

    pub fn bytelen(&self) -> i32 {
        match self {
            Self::Int32 => 4,
            Self::Int1 => 1,
            Self::Void => 0,
            Self::Pointer(_) => 4,
            Self::Array { elem, dims } => {
                dims.iter().product::<i32>() * elem.bytelen()
            }
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    pub fn array_dims(&self) -> Option<&[i32]> {
        match self {
            Self::Array { dims, .. } => Some(dims),
            _ => None,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "i32"),
            Self::Int1 => write!(f, "i1"),
            Self::Void => write!(f, "void"),
            Self::Pointer(elem) => write!(f, "{elem}*"),
            Self::Array { elem, dims } => {
                write!(f, "{elem}")?;
                for d in dims {
                    write!(f, "[{d}]")?;
                }
                Ok(())
            }
        }
    }
}

/// A function signature. Parameter types are the storage types, i.e. array
/// parameters appear here already decayed to pointers.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FunType {
    pub ret: IrType,
    pub params: Vec<IrType>,
}
