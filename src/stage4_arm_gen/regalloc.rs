use crate::common::diag::{CompileError, Result};
use crate::stage2_ir::ValueRef;
use crate::stage4_arm_gen::platform::{reg_name, RegNo, SCRATCH_POOL};
use std::collections::HashMap;

/// The trivial register allocator: a fixed scratch pool handed out within
/// one IR instruction's handler and reset afterwards, plus force-pinned
/// argument registers around calls.
///
/// Spilling beyond the pool is not supported; exhaustion is an internal
/// error (no handler needs more registers than the pool provides).
pub struct SimpleRegisterAllocator {
    free: Vec<RegNo>,
    bound: HashMap<ValueRef, RegNo>,
    pinned: Vec<RegNo>,
}

impl Default for SimpleRegisterAllocator {
    fn default() -> Self {
        Self {
            free: SCRATCH_POOL.to_vec(),
            bound: HashMap::new(),
            pinned: Vec::new(),
        }
    }
}

impl SimpleRegisterAllocator {
    /// Allocate a register for a specific value, pinning it until freed.
    /// Allocating twice for the same value returns the same register.
    pub fn allocate_for(&mut self, value: ValueRef) -> Result<RegNo> {
        if let Some(&reg) = self.bound.get(&value) {
            return Ok(reg);
        }
        let reg = self.allocate()?;
        self.bound.insert(value, reg);
        Ok(reg)
    }

    /// Allocate a generic scratch register, lowest-numbered first.
    pub fn allocate(&mut self) -> Result<RegNo> {
        if self.free.is_empty() {
            return Err(CompileError::internal(
                "register scratch pool exhausted".to_string(),
            ));
        }
        Ok(self.free.remove(0))
    }

    /// Force-pin a specific register (argument registers around a call).
    pub fn allocate_fixed(&mut self, reg: RegNo) {
        debug_assert!(!self.pinned.contains(&reg), "{} pinned twice", reg_name(reg));
        self.pinned.push(reg);
    }

    pub fn free_value(&mut self, value: ValueRef) {
        if let Some(reg) = self.bound.remove(&value) {
            self.free_reg(reg);
        }
    }

    pub fn free_reg(&mut self, reg: RegNo) {
        if let Some(idx) = self.pinned.iter().position(|&r| r == reg) {
            self.pinned.swap_remove(idx);
            return;
        }
        if SCRATCH_POOL.contains(&reg) && !self.free.contains(&reg) {
            // Lowest-numbered register is always handed out first.
            let pos = self.free.partition_point(|&r| r < reg);
            self.free.insert(pos, reg);
        }
    }

    /// Return the whole pool after an instruction's handler completes;
    /// nothing stays register-resident between IR instructions.
    pub fn reset(&mut self) {
        self.free = SCRATCH_POOL.to_vec();
        self.bound.clear();
        self.pinned.clear();
    }
}
