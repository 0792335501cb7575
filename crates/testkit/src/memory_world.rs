//! In-memory [`CraftWorld`] for tests and the headless runner.

use interactio_core::{BlockPos, Identifier};
use interactio_crafting::{CraftWorld, ItemStack};
use std::collections::BTreeMap;
use tracing::trace;

/// Sparse block, fluid and item-entity grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWorld {
    blocks: BTreeMap<BlockPos, Identifier>,
    fluids: BTreeMap<BlockPos, Identifier>,
    items: BTreeMap<BlockPos, Vec<ItemStack>>,
    spared: Vec<BlockPos>,
}

impl MemoryWorld {
    /// An empty world (all air, no fluids, no items).
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a block.
    pub fn with_block(mut self, pos: BlockPos, block: Identifier) -> Self {
        self.blocks.insert(pos, block);
        self
    }

    /// Place a fluid.
    pub fn with_fluid(mut self, pos: BlockPos, fluid: Identifier) -> Self {
        self.fluids.insert(pos, fluid);
        self
    }

    /// Drop an item stack.
    pub fn with_items(mut self, pos: BlockPos, stack: ItemStack) -> Self {
        self.drop_items(pos, stack);
        self
    }

    /// Drop an item stack, merging into an existing stack of the same type
    /// that still has room for it.
    pub fn drop_items(&mut self, pos: BlockPos, stack: ItemStack) {
        if stack.is_empty() {
            return;
        }
        let stacks = self.items.entry(pos).or_default();
        let merged = stacks
            .iter_mut()
            .filter(|existing| existing.item == stack.item)
            .find_map(|existing| {
                let total = existing.count.checked_add(stack.count)?;
                existing.count = total;
                Some(())
            });
        if merged.is_none() {
            stacks.push(stack);
        }
    }

    /// Item stacks at `pos`.
    pub fn items_at(&self, pos: BlockPos) -> &[ItemStack] {
        self.items.get(&pos).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total count of `item` at `pos`.
    pub fn count_at(&self, pos: BlockPos, item: &Identifier) -> u64 {
        self.items_at(pos)
            .iter()
            .filter(|stack| &stack.item == item)
            .map(|stack| u64::from(stack.count))
            .sum()
    }

    /// Every position holding items.
    pub fn item_positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.items.keys().copied()
    }

    /// Positions passed to [`CraftWorld::spare_block`], in call order.
    pub fn spared(&self) -> &[BlockPos] {
        &self.spared
    }
}

impl CraftWorld for MemoryWorld {
    fn block_at(&self, pos: BlockPos) -> Option<Identifier> {
        self.blocks.get(&pos).cloned()
    }

    fn fluid_at(&self, pos: BlockPos) -> Option<Identifier> {
        self.fluids.get(&pos).cloned()
    }

    fn set_block(&mut self, pos: BlockPos, block: Option<Identifier>) {
        trace!(%pos, ?block, "set block");
        match block {
            Some(block) => {
                self.blocks.insert(pos, block);
            }
            None => {
                self.blocks.remove(&pos);
            }
        }
    }

    fn set_fluid(&mut self, pos: BlockPos, fluid: Option<Identifier>) {
        trace!(%pos, ?fluid, "set fluid");
        match fluid {
            Some(fluid) => {
                self.fluids.insert(pos, fluid);
            }
            None => {
                self.fluids.remove(&pos);
            }
        }
    }

    fn spawn_item(&mut self, pos: BlockPos, stack: ItemStack) {
        self.drop_items(pos, stack);
    }

    fn consume_items(&mut self, pos: BlockPos, item: &Identifier, count: u32) {
        let Some(stacks) = self.items.get_mut(&pos) else {
            return;
        };
        let mut remaining = count;
        for stack in stacks.iter_mut().filter(|stack| &stack.item == item) {
            let taken = remaining.min(stack.count);
            stack.count -= taken;
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        stacks.retain(|stack| !stack.is_empty());
        if stacks.is_empty() {
            self.items.remove(&pos);
        }
    }

    fn spare_block(&mut self, pos: BlockPos) {
        self.spared.push(pos);
    }
}
