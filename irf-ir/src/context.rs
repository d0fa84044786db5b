//! The per-context arena
//!
//! A `Context` owns every type, constant, module, function, block and
//! instruction built under it. Types and constants are uniqued: a request
//! for a shape that already exists returns the existing handle.
//!
//! A `Context` is `Send` but all mutation goes through `&mut Context`, so a
//! single context is never touched from two threads at once without the
//! caller's own synchronization. Distinct contexts are fully independent.

use log::trace;
use std::collections::HashMap;

use crate::apint::ApInt;
use crate::blocks::{BasicBlock, BlockData};
use crate::handle::{ContextId, TypeRef, ValueRef};
use crate::module::{Module, ModuleData};
use crate::types::TypeKind;
use crate::values::{ValueData, ValueKind};

/// Structural key of a uniqued constant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ConstantKey {
    Int(ApInt),
    Bytes(Vec<u8>),
    GetElementPtr {
        base: ValueRef,
        indices: Vec<ValueRef>,
        in_bounds: bool,
    },
}

/// Root owner of all IR entities
#[derive(Debug)]
pub struct Context {
    id: ContextId,
    types: Vec<TypeKind>,
    type_table: HashMap<TypeKind, TypeRef>,
    values: Vec<ValueData>,
    constant_table: HashMap<ConstantKey, ValueRef>,
    blocks: Vec<BlockData>,
    modules: Vec<Option<ModuleData>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            id: ContextId::fresh(),
            types: Vec::new(),
            type_table: HashMap::new(),
            values: Vec::new(),
            constant_table: HashMap::new(),
            blocks: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Number of distinct types created so far
    pub fn num_types(&self) -> usize {
        self.types.len()
    }

    /// Number of distinct uniqued constants currently alive
    pub fn num_constants(&self) -> usize {
        self.constant_table.len()
    }

    fn check_owner(&self, owner: ContextId, what: &str) {
        if owner != self.id {
            panic!("{what} belongs to context {owner:?} but was used with context {:?}", self.id);
        }
    }

    // ---- types ----

    /// Return the canonical handle for `kind`, creating it on first request.
    pub(crate) fn intern_type(&mut self, kind: TypeKind) -> TypeRef {
        for inner in kind.referenced_types() {
            self.check_owner(inner.ctx, "type");
        }

        if let Some(&existing) = self.type_table.get(&kind) {
            trace!("type table hit: {kind:?}");
            return existing;
        }

        let ty = TypeRef {
            ctx: self.id,
            index: self.types.len() as u32,
        };
        trace!("type table miss, created #{}: {kind:?}", ty.index);
        self.types.push(kind.clone());
        self.type_table.insert(kind, ty);
        ty
    }

    pub fn type_kind(&self, ty: TypeRef) -> &TypeKind {
        self.check_owner(ty.ctx, "type");
        &self.types[ty.index as usize]
    }

    // ---- values ----

    pub(crate) fn alloc_value(&mut self, data: ValueData) -> ValueRef {
        self.check_owner(data.ty.ctx, "type");
        let value = ValueRef {
            ctx: self.id,
            index: self.values.len() as u32,
        };
        trace!("allocated value #{}", value.index);
        self.values.push(data);
        value
    }

    /// Return the canonical constant for `key`, building it with `make` on
    /// first request.
    pub(crate) fn intern_constant(
        &mut self,
        key: ConstantKey,
        make: impl FnOnce() -> ValueData,
    ) -> ValueRef {
        if let Some(&existing) = self.constant_table.get(&key) {
            trace!("constant table hit: {key:?}");
            return existing;
        }
        let value = self.alloc_value(make());
        self.constant_table.insert(key, value);
        value
    }

    pub(crate) fn value_data(&self, value: ValueRef) -> &ValueData {
        self.check_owner(value.ctx, "value");
        let data = &self.values[value.index as usize];
        if matches!(data.kind, ValueKind::Erased) {
            panic!("use of value #{} after its module was erased", value.index);
        }
        data
    }

    pub(crate) fn value_data_mut(&mut self, value: ValueRef) -> &mut ValueData {
        self.check_owner(value.ctx, "value");
        let data = &mut self.values[value.index as usize];
        if matches!(data.kind, ValueKind::Erased) {
            panic!("use of value #{} after its module was erased", value.index);
        }
        data
    }

    pub(crate) fn is_erased(&self, value: ValueRef) -> bool {
        self.check_owner(value.ctx, "value");
        matches!(self.values[value.index as usize].kind, ValueKind::Erased)
    }

    pub(crate) fn erase_value(&mut self, value: ValueRef) {
        self.check_owner(value.ctx, "value");
        let data = &mut self.values[value.index as usize];
        data.kind = ValueKind::Erased;
        data.name = None;
    }

    /// Drop uniqued constants that refer to erased values, erasing them too.
    pub(crate) fn purge_dead_constants(&mut self) {
        loop {
            let dead: Vec<ValueRef> = self
                .constant_table
                .iter()
                .filter(|(key, _)| match key {
                    ConstantKey::GetElementPtr { base, indices, .. } => {
                        self.is_erased(*base) || indices.iter().any(|i| self.is_erased(*i))
                    }
                    _ => false,
                })
                .map(|(_, value)| *value)
                .collect();

            if dead.is_empty() {
                break;
            }
            for value in &dead {
                self.erase_value(*value);
            }
            self.constant_table.retain(|_, value| !dead.contains(value));
        }
    }

    // ---- blocks ----

    pub(crate) fn alloc_block(&mut self, data: BlockData) -> BasicBlock {
        let block = BasicBlock {
            ctx: self.id,
            index: self.blocks.len() as u32,
        };
        self.blocks.push(data);
        block
    }

    pub(crate) fn block_data(&self, block: BasicBlock) -> &BlockData {
        self.check_owner(block.ctx, "basic block");
        let data = &self.blocks[block.index as usize];
        if data.erased {
            panic!("use of basic block #{} after its module was erased", block.index);
        }
        data
    }

    pub(crate) fn block_data_mut(&mut self, block: BasicBlock) -> &mut BlockData {
        self.check_owner(block.ctx, "basic block");
        let data = &mut self.blocks[block.index as usize];
        if data.erased {
            panic!("use of basic block #{} after its module was erased", block.index);
        }
        data
    }

    // ---- modules ----

    pub(crate) fn alloc_module(&mut self, data: ModuleData) -> Module {
        let module = Module {
            ctx: self.id,
            index: self.modules.len() as u32,
        };
        self.modules.push(Some(data));
        module
    }

    pub(crate) fn module_data(&self, module: Module) -> &ModuleData {
        self.check_owner(module.ctx, "module");
        match &self.modules[module.index as usize] {
            Some(data) => data,
            None => panic!("use of module #{} after it was erased", module.index),
        }
    }

    pub(crate) fn module_data_mut(&mut self, module: Module) -> &mut ModuleData {
        self.check_owner(module.ctx, "module");
        match &mut self.modules[module.index as usize] {
            Some(data) => data,
            None => panic!("use of module #{} after it was erased", module.index),
        }
    }

    pub(crate) fn take_module(&mut self, module: Module) -> ModuleData {
        self.check_owner(module.ctx, "module");
        match self.modules[module.index as usize].take() {
            Some(data) => data,
            None => panic!("module #{} erased twice", module.index),
        }
    }

    pub(crate) fn erase_block(&mut self, block: BasicBlock) {
        self.check_owner(block.ctx, "basic block");
        let data = &mut self.blocks[block.index as usize];
        data.erased = true;
        data.instructions.clear();
    }

    /// Modules that have not been erased
    pub fn modules(&self) -> impl Iterator<Item = Module> + '_ {
        let ctx = self.id;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, data)| data.is_some())
            .map(move |(index, _)| Module { ctx, index: index as u32 })
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
