//! Opaque handles into a `Context` arena
//!
//! A handle is a context tag plus an index. It borrows nothing and owns
//! nothing; the arena owns the entity. Every access goes through the owning
//! `Context`, which rejects handles carrying a foreign tag.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_CONTEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a `Context`, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(u32);

impl ContextId {
    pub(crate) fn fresh() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a uniqued type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub(crate) ctx: ContextId,
    pub(crate) index: u32,
}

/// Handle to any value usable as an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRef {
    pub(crate) ctx: ContextId,
    pub(crate) index: u32,
}

impl TypeRef {
    pub fn context_id(self) -> ContextId {
        self.ctx
    }
}

impl ValueRef {
    pub fn context_id(self) -> ContextId {
        self.ctx
    }
}

/// Declares a type subtype: a newtype over `TypeRef` with an upcast and a
/// checked downcast selected by a `TypeKind` pattern.
macro_rules! type_subtype {
    ($(#[$meta:meta])* $name:ident, $pat:pat) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub(crate) $crate::TypeRef);

        impl $name {
            pub fn as_type(self) -> $crate::TypeRef {
                self.0
            }

            /// Checked downcast, `None` when `ty` has another shape.
            pub fn dyn_cast(ctx: &$crate::Context, ty: impl Into<$crate::TypeRef>) -> Option<Self> {
                let ty = ty.into();
                matches!(ctx.type_kind(ty), $pat).then_some(Self(ty))
            }
        }

        impl From<$name> for $crate::TypeRef {
            fn from(ty: $name) -> Self {
                ty.0
            }
        }
    };
}

/// Declares a value subtype: a newtype over `ValueRef` that upcasts to
/// `ValueRef` and to each listed ancestor, with a checked downcast selected
/// by a `ValueKind` pattern.
macro_rules! value_subtype {
    ($(#[$meta:meta])* $name:ident $(: $($parent:ident),+)?; $pat:pat) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub(crate) $crate::ValueRef);

        impl $name {
            pub fn as_value(self) -> $crate::ValueRef {
                self.0
            }

            /// Checked downcast, `None` when `value` is another kind.
            pub fn dyn_cast(ctx: &$crate::Context, value: impl Into<$crate::ValueRef>) -> Option<Self> {
                let value = value.into();
                matches!(&ctx.value_data(value).kind, $pat).then_some(Self(value))
            }
        }

        impl From<$name> for $crate::ValueRef {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        $($(
            impl From<$name> for $parent {
                fn from(value: $name) -> Self {
                    $parent(value.0)
                }
            }
        )+)?
    };
}
