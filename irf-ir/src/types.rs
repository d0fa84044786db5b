//! IR Type System
//!
//! Types are immutable and uniqued per context: two requests for the same
//! shape return the same handle, so handle equality is type identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use irf_common::AddressSpace;

use crate::context::Context;
use crate::handle::TypeRef;

/// Largest supported integer bit width
pub const MAX_INT_BITS: u32 = (1 << 24) - 1;

/// Shape of a type. This is also the key of the uniquing table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Void,

    /// Basic block addresses
    Label,

    Integer { bits: u32 },

    Pointer {
        pointee: TypeRef,
        address_space: AddressSpace,
    },

    /// [len x element]
    Array { element: TypeRef, len: u64 },

    Function {
        ret: TypeRef,
        params: Vec<TypeRef>,
        is_var_arg: bool,
    },
}

impl TypeKind {
    pub(crate) fn referenced_types(&self) -> Vec<TypeRef> {
        match self {
            TypeKind::Void | TypeKind::Label | TypeKind::Integer { .. } => Vec::new(),
            TypeKind::Pointer { pointee, .. } => vec![*pointee],
            TypeKind::Array { element, .. } => vec![*element],
            TypeKind::Function { ret, params, .. } => {
                let mut types = vec![*ret];
                types.extend(params.iter().copied());
                types
            }
        }
    }
}

/// Factories for the non-parameterised types
pub struct Type;

impl Type {
    pub fn get_void_ty(ctx: &mut Context) -> TypeRef {
        ctx.intern_type(TypeKind::Void)
    }

    pub fn get_label_ty(ctx: &mut Context) -> TypeRef {
        ctx.intern_type(TypeKind::Label)
    }

    pub fn get_int1_ty(ctx: &mut Context) -> IntegerType {
        IntegerType::get(ctx, 1)
    }

    pub fn get_int8_ty(ctx: &mut Context) -> IntegerType {
        IntegerType::get(ctx, 8)
    }

    pub fn get_int32_ty(ctx: &mut Context) -> IntegerType {
        IntegerType::get(ctx, 32)
    }

    pub fn get_int64_ty(ctx: &mut Context) -> IntegerType {
        IntegerType::get(ctx, 64)
    }
}

impl TypeRef {
    pub fn kind(self, ctx: &Context) -> &TypeKind {
        ctx.type_kind(self)
    }

    pub fn is_void(self, ctx: &Context) -> bool {
        matches!(ctx.type_kind(self), TypeKind::Void)
    }

    pub fn is_integer(self, ctx: &Context) -> bool {
        matches!(ctx.type_kind(self), TypeKind::Integer { .. })
    }

    pub fn is_pointer(self, ctx: &Context) -> bool {
        matches!(ctx.type_kind(self), TypeKind::Pointer { .. })
    }

    /// Types a value can have. Void, label and bare function types are not.
    pub fn is_first_class(self, ctx: &Context) -> bool {
        !matches!(
            ctx.type_kind(self),
            TypeKind::Void | TypeKind::Label | TypeKind::Function { .. }
        )
    }

    pub fn display(self, ctx: &Context) -> TypeDisplay<'_> {
        TypeDisplay { ctx, ty: self }
    }
}

type_subtype!(
    /// Integer type of an arbitrary bit width
    IntegerType,
    TypeKind::Integer { .. }
);

impl IntegerType {
    /// Canonical integer type of `num_bits` bits.
    /// A width of zero or above `MAX_INT_BITS` is a contract violation.
    pub fn get(ctx: &mut Context, num_bits: u32) -> IntegerType {
        assert!(
            (1..=MAX_INT_BITS).contains(&num_bits),
            "integer bit width {num_bits} out of range 1..={MAX_INT_BITS}"
        );
        IntegerType(ctx.intern_type(TypeKind::Integer { bits: num_bits }))
    }

    pub fn bit_width(self, ctx: &Context) -> u32 {
        match ctx.type_kind(self.0) {
            TypeKind::Integer { bits } => *bits,
            _ => unreachable!("IntegerType handle without integer shape"),
        }
    }
}

type_subtype!(
    /// Pointer to an element type in an address space
    PointerType,
    TypeKind::Pointer { .. }
);

impl PointerType {
    pub fn get(ctx: &mut Context, element_type: TypeRef, address_space: AddressSpace) -> PointerType {
        assert!(
            !matches!(ctx.type_kind(element_type), TypeKind::Void | TypeKind::Label),
            "pointer to {} is not a valid type",
            element_type.display(ctx)
        );
        PointerType(ctx.intern_type(TypeKind::Pointer {
            pointee: element_type,
            address_space,
        }))
    }

    /// Shorthand for `get(ctx, element_type, AddressSpace::Generic)`
    pub fn get_unqual(ctx: &mut Context, element_type: TypeRef) -> PointerType {
        Self::get(ctx, element_type, AddressSpace::Generic)
    }

    pub fn element_type(self, ctx: &Context) -> TypeRef {
        match ctx.type_kind(self.0) {
            TypeKind::Pointer { pointee, .. } => *pointee,
            _ => unreachable!("PointerType handle without pointer shape"),
        }
    }

    pub fn address_space(self, ctx: &Context) -> AddressSpace {
        match ctx.type_kind(self.0) {
            TypeKind::Pointer { address_space, .. } => *address_space,
            _ => unreachable!("PointerType handle without pointer shape"),
        }
    }
}

type_subtype!(
    /// Fixed length array
    ArrayType,
    TypeKind::Array { .. }
);

impl ArrayType {
    pub fn get(ctx: &mut Context, element_type: TypeRef, num_elements: u64) -> ArrayType {
        assert!(
            element_type.is_first_class(ctx),
            "array of {} is not a valid type",
            element_type.display(ctx)
        );
        ArrayType(ctx.intern_type(TypeKind::Array {
            element: element_type,
            len: num_elements,
        }))
    }

    pub fn element_type(self, ctx: &Context) -> TypeRef {
        match ctx.type_kind(self.0) {
            TypeKind::Array { element, .. } => *element,
            _ => unreachable!("ArrayType handle without array shape"),
        }
    }

    pub fn num_elements(self, ctx: &Context) -> u64 {
        match ctx.type_kind(self.0) {
            TypeKind::Array { len, .. } => *len,
            _ => unreachable!("ArrayType handle without array shape"),
        }
    }
}

type_subtype!(
    /// Function signature. Parameter order is part of the identity.
    FunctionType,
    TypeKind::Function { .. }
);

impl FunctionType {
    pub fn get(ctx: &mut Context, result: TypeRef, params: &[TypeRef], is_var_arg: bool) -> FunctionType {
        for param in params {
            assert!(
                param.is_first_class(ctx),
                "invalid parameter type {}",
                param.display(ctx)
            );
        }
        FunctionType(ctx.intern_type(TypeKind::Function {
            ret: result,
            params: params.to_vec(),
            is_var_arg,
        }))
    }

    pub fn return_type(self, ctx: &Context) -> TypeRef {
        match ctx.type_kind(self.0) {
            TypeKind::Function { ret, .. } => *ret,
            _ => unreachable!("FunctionType handle without function shape"),
        }
    }

    pub fn params(self, ctx: &Context) -> &[TypeRef] {
        match ctx.type_kind(self.0) {
            TypeKind::Function { params, .. } => params,
            _ => unreachable!("FunctionType handle without function shape"),
        }
    }

    pub fn num_params(self, ctx: &Context) -> usize {
        self.params(ctx).len()
    }

    pub fn is_var_arg(self, ctx: &Context) -> bool {
        match ctx.type_kind(self.0) {
            TypeKind::Function { is_var_arg, .. } => *is_var_arg,
            _ => unreachable!("FunctionType handle without function shape"),
        }
    }
}

/// Textual form of a type, e.g. `[3 x i8]` or `i32 (i8*, ...)`
pub struct TypeDisplay<'a> {
    ctx: &'a Context,
    ty: TypeRef,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.ctx;
        match ctx.type_kind(self.ty) {
            TypeKind::Void => write!(f, "void"),
            TypeKind::Label => write!(f, "label"),
            TypeKind::Integer { bits } => write!(f, "i{bits}"),
            TypeKind::Pointer { pointee, address_space } => {
                write!(f, "{}", pointee.display(ctx))?;
                if *address_space != AddressSpace::Generic {
                    write!(f, " addrspace({})", address_space.code())?;
                }
                write!(f, "*")
            }
            TypeKind::Array { element, len } => write!(f, "[{len} x {}]", element.display(ctx)),
            TypeKind::Function { ret, params, is_var_arg } => {
                write!(f, "{} (", ret.display(ctx))?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", param.display(ctx))?;
                }
                if *is_var_arg {
                    if !params.is_empty() { write!(f, ", ")?; }
                    write!(f, "...")?;
                }
                write!(f, ")")
            }
        }
    }
}
