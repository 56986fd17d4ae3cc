use crate::{
    arena::{SlotArena, SlotOffset},
    error::{ErrorClass, ErrorOrigin},
};

fn fill(arena: &mut SlotArena, offset: SlotOffset, byte: u8) {
    let width = arena.slot_width();
    arena.as_bytes_mut()[offset.get()..offset.get() + width].fill(byte);
}

fn slot(arena: &SlotArena, offset: SlotOffset) -> &[u8] {
    &arena.as_bytes()[offset.get()..offset.get() + arena.slot_width()]
}

#[test]
fn allocate_hands_out_consecutive_offsets() {
    let mut arena = SlotArena::new(4);
    arena.reserve(2);

    assert_eq!(arena.allocate(), SlotOffset::new(0));
    assert_eq!(arena.allocate(), SlotOffset::new(4));
    assert_eq!(arena.allocate(), SlotOffset::new(8));
    assert_eq!(arena.slot_count(), 3);
    assert_eq!(arena.len_bytes(), 12);
}

#[test]
fn growth_keeps_existing_slot_bytes() {
    let mut arena = SlotArena::new(3);
    let first = arena.allocate();
    fill(&mut arena, first, 7);

    arena.reserve(1_000);
    for _ in 0..100 {
        arena.allocate();
    }

    assert_eq!(slot(&arena, first), &[7, 7, 7]);
}

#[test]
fn compact_moves_live_slots_to_the_front() {
    let mut arena = SlotArena::new(2);
    let offsets: Vec<_> = (0..4).map(|_| arena.allocate()).collect();
    for (i, offset) in offsets.iter().enumerate() {
        fill(&mut arena, *offset, u8::try_from(i).expect("small index") + 1);
    }

    // Keep slots 3 and 1, passed out of order and with a duplicate.
    let map = arena
        .compact(&[offsets[3], offsets[1], offsets[3]])
        .expect("compaction should succeed");

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(offsets[1]), Some(SlotOffset::new(0)));
    assert_eq!(map.get(offsets[3]), Some(SlotOffset::new(2)));
    assert_eq!(map.get(offsets[0]), None);
    assert_eq!(arena.len_bytes(), 4);
    assert_eq!(slot(&arena, SlotOffset::new(0)), &[2, 2]);
    assert_eq!(slot(&arena, SlotOffset::new(2)), &[4, 4]);
}

#[test]
fn compact_rejects_misaligned_offsets() {
    let mut arena = SlotArena::new(4);
    arena.allocate();

    let err = arena
        .compact(&[SlotOffset::new(2)])
        .expect_err("misaligned offset must be rejected");

    assert_eq!(err.class, ErrorClass::Internal);
    assert_eq!(err.origin, ErrorOrigin::Arena);
}

#[test]
fn compact_rejects_offsets_past_the_end() {
    let mut arena = SlotArena::new(4);
    arena.allocate();

    assert!(arena.compact(&[SlotOffset::new(4)]).is_err());
}

#[test]
fn compact_with_no_live_slots_empties_the_arena() {
    let mut arena = SlotArena::new(4);
    arena.allocate();
    arena.allocate();

    let map = arena.compact(&[]).expect("empty compaction should succeed");

    assert!(map.is_empty());
    assert_eq!(arena.slot_count(), 0);
}
