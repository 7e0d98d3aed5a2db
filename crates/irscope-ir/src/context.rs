//! IrContext: arena storage for the whole IR tree.
//!
//! All IR entities (operations, values, blocks, regions) are stored in
//! `PrimaryMap`s owned by `IrContext`. Entity lists (operands, results)
//! use `EntityList + ListPool` for compact 4-byte per-field storage.
//!
//! Containment is strictly tree-shaped: an operation owns its regions, a
//! region owns its blocks, a block owns its operations. Each contained
//! entity records its single parent, and the context refuses to attach an
//! entity to a second owner.

use cranelift_entity::{EntityList, ListPool, PrimaryMap, SecondaryMap};
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::refs::*;
use crate::registry::DialectRegistry;
use crate::symbol::Symbol;
use crate::types::*;

// ============================================================================
// Use-chain
// ============================================================================

/// A single use of a value: which operation uses it, at which operand index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Use {
    pub user: OpRef,
    pub operand_index: u32,
}

// ============================================================================
// Entity data types
// ============================================================================

/// Data for a single operation.
pub struct OperationData {
    pub name: OpName,
    pub operands: EntityList<ValueRef>,
    pub results: EntityList<TypeRef>,
    pub attributes: IndexMap<Symbol, Attribute>,
    pub regions: SmallVec<[RegionRef; 4]>,
    pub successors: SmallVec<[BlockRef; 4]>,
    /// Symbol name for operation kinds that define a symbol.
    pub symbol: Option<Symbol>,
    pub parent_block: Option<BlockRef>,
}

/// Data for a single SSA value.
pub struct ValueData {
    pub def: ValueDef,
    pub ty: TypeRef,
}

/// Data for a block.
pub struct BlockData {
    pub args: Vec<TypeRef>,
    pub ops: SmallVec<[OpRef; 4]>,
    pub parent_region: Option<RegionRef>,
}

impl BlockData {
    /// An empty, detached block with the given argument types.
    pub fn new(args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            args: args.into_iter().collect(),
            ops: SmallVec::new(),
            parent_region: None,
        }
    }
}

/// Data for a region (list of blocks).
pub struct RegionData {
    pub blocks: SmallVec<[BlockRef; 4]>,
    pub parent_op: Option<OpRef>,
}

impl RegionData {
    /// A detached region owning `blocks`.
    pub fn new(blocks: impl IntoIterator<Item = BlockRef>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            parent_op: None,
        }
    }
}

// ============================================================================
// IrContext
// ============================================================================

/// Arena-based mutable IR context.
///
/// Owns all IR entities and provides methods for creating, querying,
/// and mutating them. Use-chains are automatically maintained.
pub struct IrContext {
    ops: PrimaryMap<OpRef, OperationData>,
    values: PrimaryMap<ValueRef, ValueData>,
    blocks: PrimaryMap<BlockRef, BlockData>,
    regions: PrimaryMap<RegionRef, RegionData>,

    /// Use-chain: for each value, the list of operations that use it.
    uses: SecondaryMap<ValueRef, SmallVec<[Use; 2]>>,

    pub types: TypeInterner,
    pub dialects: DialectRegistry,

    /// Backing pools for EntityList storage.
    value_pool: ListPool<ValueRef>,
    type_pool: ListPool<TypeRef>,

    /// Mapping from operation to its result ValueRefs.
    result_values: SecondaryMap<OpRef, EntityList<ValueRef>>,
    /// Mapping from block to its argument ValueRefs.
    block_arg_values: SecondaryMap<BlockRef, EntityList<ValueRef>>,
}

impl IrContext {
    /// Create a new empty IR context with no registered dialects.
    pub fn new() -> Self {
        Self {
            ops: PrimaryMap::new(),
            values: PrimaryMap::new(),
            blocks: PrimaryMap::new(),
            regions: PrimaryMap::new(),
            uses: SecondaryMap::new(),
            types: TypeInterner::new(),
            dialects: DialectRegistry::new(),
            value_pool: ListPool::new(),
            type_pool: ListPool::new(),
            result_values: SecondaryMap::new(),
            block_arg_values: SecondaryMap::new(),
        }
    }

    // ========================================================================
    // Operation
    // ========================================================================

    /// Create a new operation and allocate result values for it.
    ///
    /// The operation's operands are registered in the use-chain.
    /// Use `push_op` to attach it to a block after creation.
    ///
    /// # Panics
    ///
    /// Panics if `data.parent_block` is `Some`, or if any region in
    /// `data.regions` already belongs to another operation.
    pub fn create_op(&mut self, data: OperationData) -> OpRef {
        assert!(
            data.parent_block.is_none(),
            "create_op: operation must not have parent_block set; \
             use push_op to attach to a block after creation",
        );

        let operand_slice: SmallVec<[ValueRef; 8]> =
            data.operands.as_slice(&self.value_pool).into();
        let result_types: SmallVec<[TypeRef; 4]> = data.results.as_slice(&self.type_pool).into();
        let regions: SmallVec<[RegionRef; 4]> = data.regions.clone();

        let op = self.ops.push(data);

        for &r in &regions {
            if let Some(existing) = self.regions[r].parent_op {
                panic!(
                    "create_op: region {r} already belongs to operation {existing}; \
                     cannot reassign to {op}",
                );
            }
            self.regions[r].parent_op = Some(op);
        }

        for (idx, &val) in operand_slice.iter().enumerate() {
            self.uses[val].push(Use {
                user: op,
                operand_index: idx as u32,
            });
        }

        let mut result_value_list = EntityList::new();
        for (idx, &ty) in result_types.iter().enumerate() {
            let v = self.values.push(ValueData {
                def: ValueDef::OpResult(op, idx as u32),
                ty,
            });
            result_value_list.push(v, &mut self.value_pool);
        }
        self.result_values[op] = result_value_list;

        op
    }

    /// Get immutable reference to operation data.
    pub fn op(&self, op: OpRef) -> &OperationData {
        &self.ops[op]
    }

    /// Get mutable reference to operation data.
    ///
    /// **Warning**: Modifying operands directly will desync the use-chain.
    /// Prefer `replace_all_uses` or re-creating the operation.
    pub fn op_mut(&mut self, op: OpRef) -> &mut OperationData {
        &mut self.ops[op]
    }

    /// Get the operands of an operation as a slice.
    pub fn op_operands(&self, op: OpRef) -> &[ValueRef] {
        self.ops[op].operands.as_slice(&self.value_pool)
    }

    /// Get the result types of an operation as a slice.
    pub fn op_result_types(&self, op: OpRef) -> &[TypeRef] {
        self.ops[op].results.as_slice(&self.type_pool)
    }

    /// Get the i-th result value of an operation.
    pub fn op_result(&self, op: OpRef, index: u32) -> ValueRef {
        self.result_values[op].as_slice(&self.value_pool)[index as usize]
    }

    /// Get all result values of an operation.
    pub fn op_results(&self, op: OpRef) -> &[ValueRef] {
        self.result_values[op].as_slice(&self.value_pool)
    }

    /// Remove an operation, clearing its use-chain entries.
    ///
    /// Does NOT remove it from its parent block. Use `remove_op_from_block` first.
    ///
    /// # Panics
    ///
    /// Panics if the operation is still attached to a block, or if any result
    /// value still has uses.
    pub fn remove_op(&mut self, op: OpRef) {
        if let Some(block) = self.ops[op].parent_block {
            panic!(
                "remove_op: operation {op} is still attached to block {block}; \
                 call remove_op_from_block first"
            );
        }

        let results: SmallVec<[ValueRef; 4]> =
            self.result_values[op].as_slice(&self.value_pool).into();
        for &val in &results {
            assert!(
                self.uses[val].is_empty(),
                "remove_op: result value {val} still has {} use(s); \
                 replace all uses before removing the operation",
                self.uses[val].len()
            );
        }

        let operands: SmallVec<[ValueRef; 8]> =
            self.ops[op].operands.as_slice(&self.value_pool).into();
        for (idx, &val) in operands.iter().enumerate() {
            self.uses[val].retain(|u| !(u.user == op && u.operand_index == idx as u32));
        }
    }

    // ========================================================================
    // Value
    // ========================================================================

    /// Get immutable reference to value data.
    pub fn value(&self, v: ValueRef) -> &ValueData {
        &self.values[v]
    }

    /// Get the type of a value.
    pub fn value_ty(&self, v: ValueRef) -> TypeRef {
        self.values[v].ty
    }

    /// Get the definition of a value.
    pub fn value_def(&self, v: ValueRef) -> ValueDef {
        self.values[v].def
    }

    // ========================================================================
    // Block
    // ========================================================================

    /// Create a new block and allocate argument values for it.
    pub fn create_block(&mut self, data: BlockData) -> BlockRef {
        let arg_types = data.args.clone();
        let ops: SmallVec<[OpRef; 4]> = data.ops.clone();
        let block = self.blocks.push(data);

        for &op in &ops {
            if let Some(existing) = self.ops[op].parent_block {
                panic!(
                    "create_block: operation {op} already belongs to block {existing}; \
                     cannot reassign to {block}",
                );
            }
            self.ops[op].parent_block = Some(block);
        }

        let mut arg_value_list = EntityList::new();
        for (idx, ty) in arg_types.into_iter().enumerate() {
            let v = self.values.push(ValueData {
                def: ValueDef::BlockArg(block, idx as u32),
                ty,
            });
            arg_value_list.push(v, &mut self.value_pool);
        }
        self.block_arg_values[block] = arg_value_list;

        block
    }

    /// Get immutable reference to block data.
    pub fn block(&self, b: BlockRef) -> &BlockData {
        &self.blocks[b]
    }

    /// Get the i-th block argument value.
    pub fn block_arg(&self, b: BlockRef, index: u32) -> ValueRef {
        self.block_arg_values[b].as_slice(&self.value_pool)[index as usize]
    }

    /// Get all block argument values.
    pub fn block_args(&self, b: BlockRef) -> &[ValueRef] {
        self.block_arg_values[b].as_slice(&self.value_pool)
    }

    /// Successor blocks of a block: the successors of its terminator (last
    /// operation). A block without operations has no successors.
    pub fn block_successors(&self, b: BlockRef) -> &[BlockRef] {
        match self.blocks[b].ops.last() {
            Some(&terminator) => self.ops[terminator].successors.as_slice(),
            None => &[],
        }
    }

    /// Append an operation to the end of a block.
    ///
    /// # Panics
    ///
    /// Panics if the operation already belongs to a block.
    pub fn push_op(&mut self, block: BlockRef, op: OpRef) {
        if let Some(existing) = self.ops[op].parent_block {
            panic!(
                "push_op: operation {op} already belongs to block {existing}; \
                 remove it from the old block first"
            );
        }
        self.ops[op].parent_block = Some(block);
        self.blocks[block].ops.push(op);
    }

    /// Insert an operation before `before` in the given block.
    ///
    /// # Panics
    ///
    /// Panics if the operation already belongs to a block, or if `before`
    /// is not found in the block.
    pub fn insert_op_before(&mut self, block: BlockRef, before: OpRef, op: OpRef) {
        if let Some(existing) = self.ops[op].parent_block {
            panic!(
                "insert_op_before: operation {op} already belongs to block {existing}; \
                 remove it from the old block first"
            );
        }
        let ops = &mut self.blocks[block].ops;
        let Some(pos) = ops.iter().position(|&o| o == before) else {
            panic!("insert_op_before: {before} not found in {block}");
        };
        ops.insert(pos, op);
        self.ops[op].parent_block = Some(block);
    }

    /// Remove an operation from a block (does not destroy the operation).
    ///
    /// Only clears the operation's `parent_block` if it matches the given block.
    pub fn remove_op_from_block(&mut self, block: BlockRef, op: OpRef) {
        self.blocks[block].ops.retain(|o| *o != op);
        if self.ops[op].parent_block == Some(block) {
            self.ops[op].parent_block = None;
        }
    }

    // ========================================================================
    // Region
    // ========================================================================

    /// Create a new region.
    ///
    /// # Panics
    ///
    /// Panics if any block in `data.blocks` already belongs to another region.
    pub fn create_region(&mut self, data: RegionData) -> RegionRef {
        let region = self.regions.push(data);

        let blocks: SmallVec<[BlockRef; 4]> = self.regions[region].blocks.clone();
        for &b in &blocks {
            if let Some(existing) = self.blocks[b].parent_region {
                panic!(
                    "create_region: block {b} already belongs to region {existing}; \
                     cannot reassign to {region}",
                );
            }
            self.blocks[b].parent_region = Some(region);
        }

        region
    }

    /// Get immutable reference to region data.
    pub fn region(&self, r: RegionRef) -> &RegionData {
        &self.regions[r]
    }

    // ========================================================================
    // Use-chain
    // ========================================================================

    /// Get all uses of a value.
    pub fn uses(&self, v: ValueRef) -> &[Use] {
        &self.uses[v]
    }

    /// Check if a value has any uses.
    pub fn has_uses(&self, v: ValueRef) -> bool {
        !self.uses[v].is_empty()
    }

    /// Replace all uses of `old` with `new` in all operations.
    ///
    /// Updates both operand lists and the use-chain.
    pub fn replace_all_uses(&mut self, old: ValueRef, new: ValueRef) {
        if old == new {
            return;
        }
        let old_uses = std::mem::take(&mut self.uses[old]);

        for u in &old_uses {
            let operands = &mut self.ops[u.user].operands;
            let slice = operands.as_mut_slice(&mut self.value_pool);
            debug_assert_eq!(slice[u.operand_index as usize], old);
            slice[u.operand_index as usize] = new;

            self.uses[new].push(*u);
        }
    }
}

impl Default for IrContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// OperationDataBuilder
// ============================================================================

/// Builder for constructing `OperationData` with pool-backed lists.
///
/// Collects operands and result types into `Vec`s, then packs them
/// into `EntityList`s on `build()`.
pub struct OperationDataBuilder {
    name: OpName,
    operands: Vec<ValueRef>,
    results: Vec<TypeRef>,
    attributes: IndexMap<Symbol, Attribute>,
    regions: SmallVec<[RegionRef; 4]>,
    successors: SmallVec<[BlockRef; 4]>,
    symbol: Option<Symbol>,
}

impl OperationDataBuilder {
    pub fn new(name: OpName) -> Self {
        Self {
            name,
            operands: Vec::new(),
            results: Vec::new(),
            attributes: IndexMap::new(),
            regions: SmallVec::new(),
            successors: SmallVec::new(),
            symbol: None,
        }
    }

    pub fn operand(mut self, v: ValueRef) -> Self {
        self.operands.push(v);
        self
    }

    pub fn operands(mut self, vs: impl IntoIterator<Item = ValueRef>) -> Self {
        self.operands.extend(vs);
        self
    }

    pub fn result(mut self, ty: TypeRef) -> Self {
        self.results.push(ty);
        self
    }

    pub fn results(mut self, tys: impl IntoIterator<Item = TypeRef>) -> Self {
        self.results.extend(tys);
        self
    }

    /// Add an attribute. Re-adding a key replaces the value in place.
    pub fn attr(mut self, key: impl Into<Symbol>, val: impl Into<Attribute>) -> Self {
        self.attributes.insert(key.into(), val.into());
        self
    }

    pub fn region(mut self, r: RegionRef) -> Self {
        self.regions.push(r);
        self
    }

    pub fn successor(mut self, b: BlockRef) -> Self {
        self.successors.push(b);
        self
    }

    pub fn symbol(mut self, name: impl Into<Symbol>) -> Self {
        self.symbol = Some(name.into());
        self
    }

    /// Build the `OperationData`, packing vecs into `EntityList`s using
    /// the context's pools.
    pub fn build(self, ctx: &mut IrContext) -> OperationData {
        let mut operands = EntityList::new();
        for v in self.operands {
            operands.push(v, &mut ctx.value_pool);
        }
        let mut results = EntityList::new();
        for ty in self.results {
            results.push(ty, &mut ctx.type_pool);
        }
        OperationData {
            name: self.name,
            operands,
            results,
            attributes: self.attributes,
            regions: self.regions,
            successors: self.successors,
            symbol: self.symbol,
            parent_block: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn i32_type(ctx: &mut IrContext) -> TypeRef {
        ctx.types.intern(TypeDataBuilder::new("core", "i32").build())
    }

    fn empty_block(ctx: &mut IrContext) -> BlockRef {
        ctx.create_block(BlockData::new([]))
    }

    #[test]
    fn create_op_and_read_back() {
        let mut ctx = IrContext::new();
        let i32_ty = i32_type(&mut ctx);

        let data = OperationDataBuilder::new(OpName::new("arith", "constant"))
            .result(i32_ty)
            .attr("value", 42i64)
            .build(&mut ctx);
        let op = ctx.create_op(data);

        assert_eq!(ctx.op(op).name.to_string(), "arith.constant");
        assert_eq!(ctx.op_result_types(op), &[i32_ty]);
        assert_eq!(
            ctx.op(op).attributes.get(&Symbol::new("value")),
            Some(&Attribute::Int(42))
        );
        assert_eq!(ctx.op(op).symbol, None);
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let mut ctx = IrContext::new();
        let data = OperationDataBuilder::new(OpName::new("test", "attrs"))
            .attr("zeta", 1i64)
            .attr("alpha", 2i64)
            .attr("mid", 3i64)
            .build(&mut ctx);
        let op = ctx.create_op(data);

        let keys: Vec<String> = ctx.op(op).attributes.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn op_result_values() {
        let mut ctx = IrContext::new();
        let i32_ty = i32_type(&mut ctx);

        let data = OperationDataBuilder::new(OpName::new("test", "multi"))
            .result(i32_ty)
            .result(i32_ty)
            .build(&mut ctx);
        let op = ctx.create_op(data);

        assert_eq!(ctx.op_results(op).len(), 2);
        let r0 = ctx.op_result(op, 0);
        let r1 = ctx.op_result(op, 1);
        assert_ne!(r0, r1);
        assert_eq!(ctx.value_ty(r0), i32_ty);
        assert_eq!(ctx.value_def(r1), ValueDef::OpResult(op, 1));
    }

    #[test]
    fn block_args() {
        let mut ctx = IrContext::new();
        let i32_ty = i32_type(&mut ctx);

        let block = ctx.create_block(BlockData::new([i32_ty, i32_ty]));

        assert_eq!(ctx.block_args(block).len(), 2);
        let a1 = ctx.block_arg(block, 1);
        assert_eq!(ctx.value_ty(a1), i32_ty);
        assert_eq!(ctx.value_def(a1), ValueDef::BlockArg(block, 1));
    }

    #[test]
    fn use_chain_and_rauw() {
        let mut ctx = IrContext::new();
        let i32_ty = i32_type(&mut ctx);

        let c1 = OperationDataBuilder::new(OpName::new("arith", "constant"))
            .result(i32_ty)
            .build(&mut ctx);
        let c1 = ctx.create_op(c1);
        let v_old = ctx.op_result(c1, 0);
        let c2 = OperationDataBuilder::new(OpName::new("arith", "constant"))
            .result(i32_ty)
            .build(&mut ctx);
        let c2 = ctx.create_op(c2);
        let v_new = ctx.op_result(c2, 0);

        let add = OperationDataBuilder::new(OpName::new("arith", "addi"))
            .operand(v_old)
            .operand(v_old)
            .result(i32_ty)
            .build(&mut ctx);
        let add = ctx.create_op(add);

        assert_eq!(ctx.uses(v_old).len(), 2);
        assert!(!ctx.has_uses(v_new));

        ctx.replace_all_uses(v_old, v_new);

        assert!(!ctx.has_uses(v_old));
        assert_eq!(ctx.uses(v_new).len(), 2);
        assert_eq!(ctx.op_operands(add), &[v_new, v_new]);
    }

    #[test]
    fn parent_tracking() {
        let mut ctx = IrContext::new();
        let block = empty_block(&mut ctx);

        let data = OperationDataBuilder::new(OpName::new("test", "x")).build(&mut ctx);
        let op = ctx.create_op(data);
        assert_eq!(ctx.op(op).parent_block, None);

        ctx.push_op(block, op);
        assert_eq!(ctx.op(op).parent_block, Some(block));
        assert_eq!(ctx.block(block).ops.as_slice(), &[op]);

        let region = ctx.create_region(RegionData::new([block]));
        assert_eq!(ctx.block(block).parent_region, Some(region));

        let owner = OperationDataBuilder::new(OpName::bare("module"))
            .region(region)
            .build(&mut ctx);
        let owner = ctx.create_op(owner);
        assert_eq!(ctx.region(region).parent_op, Some(owner));
    }

    #[test]
    fn block_successors_come_from_terminator() {
        let mut ctx = IrContext::new();
        let target = empty_block(&mut ctx);
        let block = empty_block(&mut ctx);
        assert!(ctx.block_successors(block).is_empty());

        let first = OperationDataBuilder::new(OpName::new("test", "x")).build(&mut ctx);
        let first = ctx.create_op(first);
        ctx.push_op(block, first);
        let br = OperationDataBuilder::new(OpName::new("cf", "br"))
            .successor(target)
            .build(&mut ctx);
        let br = ctx.create_op(br);
        ctx.push_op(block, br);

        assert_eq!(ctx.block_successors(block), &[target]);
    }

    #[test]
    fn insert_and_remove_in_block() {
        let mut ctx = IrContext::new();
        let block = empty_block(&mut ctx);
        let mk = |ctx: &mut IrContext, name: &'static str| {
            let data = OperationDataBuilder::new(OpName::new("test", name)).build(ctx);
            ctx.create_op(data)
        };
        let a = mk(&mut ctx, "a");
        let c = mk(&mut ctx, "c");
        ctx.push_op(block, a);
        ctx.push_op(block, c);
        let b = mk(&mut ctx, "b");
        ctx.insert_op_before(block, c, b);
        assert_eq!(ctx.block(block).ops.as_slice(), &[a, b, c]);

        ctx.remove_op_from_block(block, b);
        ctx.remove_op(b);
        assert_eq!(ctx.block(block).ops.as_slice(), &[a, c]);
        assert_eq!(ctx.op(b).parent_block, None);
    }

    #[test]
    #[should_panic(expected = "still has")]
    fn remove_op_panics_when_result_has_uses() {
        let mut ctx = IrContext::new();
        let i32_ty = i32_type(&mut ctx);
        let data1 = OperationDataBuilder::new(OpName::new("test", "a"))
            .result(i32_ty)
            .build(&mut ctx);
        let op1 = ctx.create_op(data1);
        let v1 = ctx.op_result(op1, 0);
        let data2 = OperationDataBuilder::new(OpName::new("test", "b"))
            .operand(v1)
            .build(&mut ctx);
        ctx.create_op(data2);

        ctx.remove_op(op1);
    }

    #[test]
    #[should_panic(expected = "already belongs to operation")]
    fn region_cannot_have_two_owners() {
        let mut ctx = IrContext::new();
        let region = ctx.create_region(RegionData::new([]));
        let first = OperationDataBuilder::new(OpName::bare("func"))
            .region(region)
            .build(&mut ctx);
        ctx.create_op(first);
        let second = OperationDataBuilder::new(OpName::bare("func"))
            .region(region)
            .build(&mut ctx);
        ctx.create_op(second);
    }

    #[test]
    #[should_panic(expected = "already belongs to region")]
    fn block_cannot_have_two_owners() {
        let mut ctx = IrContext::new();
        let block = empty_block(&mut ctx);
        ctx.create_region(RegionData {
            blocks: smallvec![block],
            parent_op: None,
        });
        ctx.create_region(RegionData::new([block]));
    }

    #[test]
    #[should_panic(expected = "already belongs to block")]
    fn op_cannot_be_pushed_twice() {
        let mut ctx = IrContext::new();
        let b1 = empty_block(&mut ctx);
        let b2 = empty_block(&mut ctx);
        let data = OperationDataBuilder::new(OpName::new("test", "x")).build(&mut ctx);
        let op = ctx.create_op(data);
        ctx.push_op(b1, op);
        ctx.push_op(b2, op);
    }
}
