//! Constant factories
//!
//! Integer constants, byte strings and constant pointer arithmetic. All of
//! them are uniqued per context like types.

use crate::apint::ApInt;
use crate::context::{ConstantKey, Context};
use crate::handle::{TypeRef, ValueRef};
use crate::types::{ArrayType, IntegerType, PointerType, Type, TypeKind};
use crate::values::{Constant, ValueData, ValueKind};

value_subtype!(
    /// Integer constant
    ConstantInt: Constant;
    ValueKind::ConstantInt(_)
);

impl ConstantInt {
    /// The constant of type `iN` holding `v`, N being the bit width of `v`
    pub fn get(ctx: &mut Context, v: &ApInt) -> ConstantInt {
        let ty = IntegerType::get(ctx, v.bit_width()).as_type();
        let value = ctx.intern_constant(ConstantKey::Int(v.clone()), || {
            ValueData::new(ty, ValueKind::ConstantInt(v.clone()))
        });
        ConstantInt(value)
    }

    /// The constant of type `ty` holding `value`, truncated to its width
    pub fn get_signed(ctx: &mut Context, ty: IntegerType, value: i64) -> ConstantInt {
        let bits = ty.bit_width(ctx);
        Self::get(ctx, &ApInt::from_i64(bits, value))
    }

    pub fn get_true(ctx: &mut Context) -> ConstantInt {
        Self::get(ctx, &ApInt::from_u64(1, 1))
    }

    pub fn get_false(ctx: &mut Context) -> ConstantInt {
        Self::get(ctx, &ApInt::from_u64(1, 0))
    }

    pub fn value(self, ctx: &Context) -> &ApInt {
        match &ctx.value_data(self.0).kind {
            ValueKind::ConstantInt(v) => v,
            _ => unreachable!("ConstantInt handle without integer payload"),
        }
    }

    pub fn get_type(self, ctx: &Context) -> IntegerType {
        IntegerType(self.0.get_type(ctx))
    }
}

/// Factory for constant byte arrays
pub struct ConstantDataArray;

impl ConstantDataArray {
    /// A `[N x i8]` constant holding the bytes of `initializer` up to its
    /// first NUL, plus a terminating zero byte when `add_null` is set.
    pub fn get_string(ctx: &mut Context, initializer: &str, add_null: bool) -> Constant {
        let mut bytes: Vec<u8> = initializer.bytes().take_while(|&b| b != 0).collect();
        if add_null {
            bytes.push(0);
        }

        let i8_ty = Type::get_int8_ty(ctx).as_type();
        let ty = ArrayType::get(ctx, i8_ty, bytes.len() as u64).as_type();
        let value = ctx.intern_constant(ConstantKey::Bytes(bytes.clone()), || {
            ValueData::new(ty, ValueKind::ConstantDataArray(bytes))
        });
        Constant(value)
    }

    /// Bytes of a constant produced by `get_string`, `None` for other constants
    pub fn as_bytes(ctx: &Context, constant: Constant) -> Option<&[u8]> {
        match &ctx.value_data(constant.0).kind {
            ValueKind::ConstantDataArray(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Factory for constant expressions
pub struct ConstantExpr;

impl ConstantExpr {
    /// Pointer arithmetic over `c`.
    ///
    /// `c` must be pointer typed. The first index steps over the pointer,
    /// each further index steps into an array element. Indices must be
    /// integer constants. `in_bounds` is recorded and printed but the
    /// indices are not range checked.
    pub fn get_get_element_ptr(
        ctx: &mut Context,
        c: Constant,
        idx_list: &[Constant],
        in_bounds: bool,
    ) -> Constant {
        let base_ty = c.get_type(ctx);
        let (source_type, address_space) = match PointerType::dyn_cast(ctx, base_ty) {
            Some(ptr) => (ptr.element_type(ctx), ptr.address_space(ctx)),
            None => panic!(
                "getelementptr base must be a pointer, got {}",
                base_ty.display(ctx)
            ),
        };

        let mut current = source_type;
        for (position, index) in idx_list.iter().enumerate() {
            if ConstantInt::dyn_cast(ctx, *index).is_none() {
                panic!("getelementptr index {position} is not an integer constant");
            }
            if position == 0 {
                continue;
            }
            current = match ctx.type_kind(current) {
                TypeKind::Array { element, .. } => *element,
                _ => panic!(
                    "getelementptr index {position} steps into non-aggregate type {}",
                    current.display(ctx)
                ),
            };
        }

        let result_ty = PointerType::get(ctx, current, address_space).as_type();
        let base = c.as_value();
        let indices: Vec<ValueRef> = idx_list.iter().map(|i| i.as_value()).collect();
        let key = ConstantKey::GetElementPtr {
            base,
            indices: indices.clone(),
            in_bounds,
        };
        let value = ctx.intern_constant(key, || {
            ValueData::new(
                result_ty,
                ValueKind::GetElementPtr {
                    source_type,
                    base,
                    indices,
                    in_bounds,
                },
            )
        });
        Constant(value)
    }

    /// Type the indices of a getelementptr walk through, `None` for other constants
    pub fn gep_source_type(ctx: &Context, constant: Constant) -> Option<TypeRef> {
        match &ctx.value_data(constant.0).kind {
            ValueKind::GetElementPtr { source_type, .. } => Some(*source_type),
            _ => None,
        }
    }
}
