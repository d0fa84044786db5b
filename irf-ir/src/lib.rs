//! IR Facade - Intermediate Representation
//! 
//! An object model for building typed, instruction-level IR. All entities
//! live in a per-`Context` arena and are referred to through small `Copy`
//! handles, so dropping a `Context` releases everything built under it in
//! one step.
//! 
//! ## Architecture
//! 
//! - `handle` - Opaque handles and the subtype macros that mirror the class hierarchy
//! - `context` - The arena and its uniquing tables
//! - `types` - Type handles (`IntegerType`, `PointerType`, `ArrayType`, `FunctionType`)
//! - `apint` - Arbitrary precision integers for constant construction
//! - `values` - The `Value` hierarchy and naming
//! - `constants` - Constant factories
//! - `module` - Modules and global variables
//! - `function` - Functions and arguments
//! - `blocks` - Basic blocks
//! - `instructions` - Call, return and branch instructions
//! - `builder` - Insertion point based construction helper
//! - `printer` - Textual IR output
//! - `verifier` - Structural checks

#[macro_use]
mod handle;
mod symbols;

pub mod apint;
pub mod context;
pub mod types;
pub mod values;
pub mod constants;
pub mod module;
pub mod function;
pub mod blocks;
pub mod instructions;
pub mod builder;
pub mod printer;
pub mod verifier;

pub use self::apint::ApInt;
pub use self::context::Context;
pub use self::handle::{ContextId, TypeRef, ValueRef};
pub use self::types::{Type, TypeKind, IntegerType, PointerType, ArrayType, FunctionType};
pub use self::values::{ValueKind, Constant};
pub use self::constants::{ConstantInt, ConstantDataArray, ConstantExpr};
pub use self::module::{Module, GlobalVariable};
pub use self::function::{Function, Argument, FunctionState};
pub use self::blocks::BasicBlock;
pub use self::instructions::{Instruction, InstOp, CallInst, ReturnInst, BranchInst};
pub use self::builder::IrBuilder;
pub use self::verifier::{verify_function, verify_module};

pub use irf_common::{
    AddressSpace, CallingConv, IrError, Linkage, ThreadLocalMode,
};

#[cfg(test)]
mod tests;
