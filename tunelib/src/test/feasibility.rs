use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::cache_spec::CacheSpec;
use crate::config::Budgets;
use crate::error::Infeasibility;
use crate::feasibility::{Feasibility, Level, LevelGeometry};

fn budgets(l1_bytes: u64, l2_bytes: u64) -> Feasibility {
    Feasibility::new(Budgets { l1_bytes, l2_bytes })
}

#[test]
fn default_spec_geometry() {
    let (l1, l2) = Feasibility::default().check(&CacheSpec::default()).unwrap();
    assert_eq!(l1, LevelGeometry { lines: 128, index_bits: 4, tag_bits: 55, size_bytes: 4992 });
    assert_eq!(l2, LevelGeometry { lines: 512, index_bits: 4, tag_bits: 54, size_bytes: 36288 });
}

#[test]
fn l1_budget_boundary() {
    // 16 lines of 32 data bits, a 58 bit tag, and a valid bit: 1456 bits
    let spec = CacheSpec::new(6, 2, 0, 6, 2, 0, 0);
    assert!(budgets(182, 1 << 20).is_valid(&spec));
    assert_eq!(
        budgets(181, 1 << 20).check(&spec),
        Err(Infeasibility::OverBudget { level: Level::L1, size: 182, budget: 181 })
    );
}

#[test]
fn l2_budget_boundary() {
    let spec = CacheSpec::new(6, 2, 0, 7, 2, 0, 0);
    assert!(budgets(1 << 20, 360).is_valid(&spec));
    assert_eq!(
        budgets(1 << 20, 359).check(&spec),
        Err(Infeasibility::OverBudget { level: Level::L2, size: 360, budget: 359 })
    );
}

#[test]
fn smaller_l2_is_rejected() {
    let feasibility = Feasibility::default();
    let spec = CacheSpec::default();
    assert_eq!(feasibility.check(&CacheSpec { c2: spec.c1 - 1, ..spec }), Err(Infeasibility::NotMonotonic("capacity")));
    assert_eq!(feasibility.check(&CacheSpec { b2: spec.b1 - 1, ..spec }), Err(Infeasibility::NotMonotonic("block size")));
    assert_eq!(feasibility.check(&CacheSpec { s2: spec.s1 - 1, ..spec }), Err(Infeasibility::NotMonotonic("associativity")));
}

#[test]
fn smaller_l2_is_rejected_regardless_of_other_fields() {
    // Generous budgets, so only monotonicity can reject
    let feasibility = budgets(u64::MAX, u64::MAX);
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1000 {
        let mut values = [0u32; 7].map(|_| rng.gen_range(0..=40));
        values[6] = rng.gen_range(0..=4);
        let spec = CacheSpec::from_array(values);
        if spec.c2 < spec.c1 || spec.b2 < spec.b1 || spec.s2 < spec.s1 {
            assert!(!feasibility.is_valid(&spec), "{spec:?} should be rejected");
        }
    }
}

#[test]
fn policy_selector_range() {
    let feasibility = Feasibility::default();
    for k in 0..=4 {
        assert!(feasibility.is_valid(&CacheSpec { k, ..CacheSpec::default() }));
    }
    assert_eq!(
        feasibility.check(&CacheSpec { k: 5, ..CacheSpec::default() }),
        Err(Infeasibility::PolicyOutOfRange(5))
    );
}

#[test]
fn degenerate_levels() {
    let feasibility = Feasibility::default();
    assert_eq!(feasibility.check(&CacheSpec::new(12, 0, 3, 15, 0, 5, 2)), Err(Infeasibility::ZeroBlock(Level::L1)));
    assert_eq!(feasibility.check(&CacheSpec::new(4, 5, 0, 15, 6, 5, 2)), Err(Infeasibility::NoLines(Level::L1)));
    assert_eq!(feasibility.check(&CacheSpec::new(8, 5, 3, 15, 6, 5, 2)), Err(Infeasibility::NoIndex(Level::L1)));
    assert_eq!(feasibility.check(&CacheSpec::new(12, 5, 3, 15, 6, 9, 2)), Err(Infeasibility::NoIndex(Level::L2)));
}

#[test]
fn tag_underflow_with_narrow_addresses() {
    let feasibility = Feasibility::with_address_bits(Budgets::default(), 5);
    assert_eq!(
        feasibility.check(&CacheSpec::new(6, 2, 0, 6, 2, 0, 0)),
        Err(Infeasibility::TagUnderflow(Level::L1))
    );
}

#[test]
fn pathological_values_are_rejected_not_panicking() {
    let feasibility = Feasibility::default();
    let extremes = [0, 1, 31, 32, 33, 63, 64, 65, 1000, u32::MAX - 1, u32::MAX];
    for &c in &extremes {
        for &b in &extremes {
            for &s in &extremes {
                let spec = CacheSpec::new(c, b, s, c, b, s, 0);
                let first = feasibility.check(&spec);
                assert_eq!(first, feasibility.check(&spec));
            }
        }
    }
    assert_eq!(
        feasibility.check(&CacheSpec::new(u32::MAX, 1, 0, u32::MAX, 1, 0, 0)),
        Err(Infeasibility::Overflow(Level::L1))
    );
    assert!(matches!(
        feasibility.check(&CacheSpec::new(33, 1, 8, 33, 1, 8, 0)),
        Err(Infeasibility::OverBudget { level: Level::L1, .. })
    ));
}
