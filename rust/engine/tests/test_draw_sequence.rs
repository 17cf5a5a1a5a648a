use std::collections::HashSet;

use bingo_engine::draw::{DrawSequence, DOMAIN_SIZE};

#[test]
fn sequence_yields_75_unique_numbers_then_exhausts() {
    let mut seq = DrawSequence::new_with_seed(42);
    let mut seen = HashSet::new();
    for i in 0..DOMAIN_SIZE {
        let n = seq.next_call().expect("should have 75 calls");
        assert!((1..=75).contains(&n), "call {} out of range at {}", n, i);
        assert!(seen.insert(n), "number {} drawn twice at position {}", n, i);
    }
    assert!(seq.is_exhausted());
    assert!(
        seq.next_call().is_none(),
        "after 75 calls, sequence should be exhausted"
    );
}

#[test]
fn same_seed_yields_identical_order() {
    let mut a = DrawSequence::new_with_seed(12345);
    let mut b = DrawSequence::new_with_seed(12345);
    let first: Vec<u8> = (0..10).map(|_| a.next_call().unwrap()).collect();
    let second: Vec<u8> = (0..10).map(|_| b.next_call().unwrap()).collect();
    assert_eq!(first, second, "same seed must yield identical order");
}

#[test]
fn different_seeds_yield_different_orders() {
    let mut a = DrawSequence::new_with_seed(1);
    let mut b = DrawSequence::new_with_seed(2);
    let first: Vec<u8> = (0..10).map(|_| a.next_call().unwrap()).collect();
    let second: Vec<u8> = (0..10).map(|_| b.next_call().unwrap()).collect();
    assert_ne!(
        first, second,
        "different seeds should produce different orders (high probability)"
    );
}

#[test]
fn remaining_tracks_position() {
    let mut seq = DrawSequence::new_with_seed(7);
    assert_eq!(seq.remaining(), DOMAIN_SIZE);
    seq.next_call();
    seq.next_call();
    assert_eq!(seq.remaining(), DOMAIN_SIZE - 2);
    assert!(!seq.is_exhausted());
}

#[test]
fn unseeded_sequences_are_independent() {
    // OS entropy; a 75-element order colliding by chance is negligible.
    let mut a = DrawSequence::new();
    let mut b = DrawSequence::new();
    let first: Vec<u8> = (0..75).map(|_| a.next_call().unwrap()).collect();
    let second: Vec<u8> = (0..75).map(|_| b.next_call().unwrap()).collect();
    assert_ne!(first, second);
}
