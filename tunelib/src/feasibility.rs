use std::fmt;
use crate::cache_spec::CacheSpec;
use crate::config::Budgets;
use crate::error::Infeasibility;

/// Width of the addresses the simulated hierarchy caches
pub const ADDRESS_BITS: u32 = 64;

/// The highest policy selector the simulator understands
pub const MAX_POLICY: u32 = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Level {
    L1,
    L2,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::L1 => write!(f, "L1"),
            Level::L2 => write!(f, "L2"),
        }
    }
}

/// The hardware quantities implied by a single level's `(c, b, s)` triple
///
/// Uses the same model as the simulator: `2^c` bytes of data split into `2^(c - b)` lines of
/// `2^b` bytes, grouped into sets of `2^s` ways. Each line stores its data, a tag, and one
/// valid/dirty bit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LevelGeometry {
    pub lines: u64,
    pub index_bits: u32,
    pub tag_bits: u32,
    pub size_bytes: u64,
}

impl LevelGeometry {
    /// Derives the geometry of a level, failing on anything that couldn't be built
    ///
    /// Total over every input, all arithmetic is checked so pathological values are rejected
    /// rather than wrapping or panicking
    ///
    /// # Arguments
    ///
    /// * `level`: Which level this is, only used for reporting
    /// * `c`, `b`, `s`: log2 of the capacity, block size, and associativity
    /// * `address_bits`: The address width the tag is cut from
    ///
    /// returns: Result<LevelGeometry, Infeasibility>
    pub fn derive(level: Level, c: u32, b: u32, s: u32, address_bits: u32) -> Result<Self, Infeasibility> {
        if b == 0 {
            return Err(Infeasibility::ZeroBlock(level));
        }
        let line_bits = c.checked_sub(b).ok_or(Infeasibility::NoLines(level))?;
        let lines = 1u64.checked_shl(line_bits).ok_or(Infeasibility::Overflow(level))?;
        let index_bits = line_bits
            .checked_sub(s)
            .filter(|bits| *bits >= 1)
            .ok_or(Infeasibility::NoIndex(level))?;
        let tag_bits = address_bits
            .checked_sub(b)
            .and_then(|rest| rest.checked_sub(index_bits))
            .ok_or(Infeasibility::TagUnderflow(level))?;
        let storage_bits = b
            .checked_add(3)
            .and_then(|data_shift| 1u64.checked_shl(data_shift))
            .and_then(|data| data.checked_add(tag_bits as u64 + 1))
            .and_then(|per_line| per_line.checked_mul(lines))
            .ok_or(Infeasibility::Overflow(level))?;
        Ok(Self {
            lines,
            index_bits,
            tag_bits,
            size_bytes: storage_bits.div_ceil(8),
        })
    }
}

/// Decides whether a [`CacheSpec`] is a cache that fits in the hardware budget
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Feasibility {
    budgets: Budgets,
    address_bits: u32,
}

impl Feasibility {
    pub fn new(budgets: Budgets) -> Self {
        Self::with_address_bits(budgets, ADDRESS_BITS)
    }

    pub fn with_address_bits(budgets: Budgets, address_bits: u32) -> Self {
        Self { budgets, address_bits }
    }

    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    /// Checks every constraint in turn, reporting the first one broken
    ///
    /// On success the derived geometry of both levels is returned
    pub fn check(&self, spec: &CacheSpec) -> Result<(LevelGeometry, LevelGeometry), Infeasibility> {
        if spec.k > MAX_POLICY {
            return Err(Infeasibility::PolicyOutOfRange(spec.k));
        }
        // L2 is never smaller than L1 in any raw parameter
        if spec.c2 < spec.c1 {
            return Err(Infeasibility::NotMonotonic("capacity"));
        }
        if spec.b2 < spec.b1 {
            return Err(Infeasibility::NotMonotonic("block size"));
        }
        if spec.s2 < spec.s1 {
            return Err(Infeasibility::NotMonotonic("associativity"));
        }
        let l1 = self.level(Level::L1, spec.c1, spec.b1, spec.s1, self.budgets.l1_bytes)?;
        let l2 = self.level(Level::L2, spec.c2, spec.b2, spec.s2, self.budgets.l2_bytes)?;
        Ok((l1, l2))
    }

    pub fn is_valid(&self, spec: &CacheSpec) -> bool {
        self.check(spec).is_ok()
    }

    fn level(&self, level: Level, c: u32, b: u32, s: u32, budget: u64) -> Result<LevelGeometry, Infeasibility> {
        let geometry = LevelGeometry::derive(level, c, b, s, self.address_bits)?;
        if geometry.size_bytes > budget {
            return Err(Infeasibility::OverBudget { level, size: geometry.size_bytes, budget });
        }
        Ok(geometry)
    }
}

impl Default for Feasibility {
    fn default() -> Self {
        Self::new(Budgets::default())
    }
}
