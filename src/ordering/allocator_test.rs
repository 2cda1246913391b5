use super::*;

// =============================================================================
// allocate
// =============================================================================

#[test]
fn empty_scope_gets_first_step() {
    assert_eq!(allocate(&[], 0), Allocation::Position(1000));
}

#[test]
fn tail_insert_adds_a_full_step() {
    assert_eq!(allocate(&[1000, 2000], 2), Allocation::Position(3000));
}

#[test]
fn index_past_end_is_an_append() {
    assert_eq!(allocate(&[1000, 2000], 99), Allocation::Position(3000));
}

#[test]
fn head_insert_steps_back_half() {
    assert_eq!(allocate(&[1000, 2000], 0), Allocation::Position(500));
}

#[test]
fn head_insert_floors_at_one() {
    assert_eq!(allocate(&[400], 0), Allocation::Position(1));
    assert_eq!(allocate(&[2], 0), Allocation::Position(1));
}

#[test]
fn head_insert_at_floor_requests_renumber() {
    assert_eq!(allocate(&[1, 1000], 0), Allocation::NeedsRenumber);
}

#[test]
fn middle_insert_biases_to_lower_neighbor() {
    assert_eq!(allocate(&[1000, 2000], 1), Allocation::Position(1500));
    assert_eq!(allocate(&[1000, 1003], 1), Allocation::Position(1001));
}

#[test]
fn adjacent_neighbors_request_renumber() {
    assert_eq!(allocate(&[1000, 1001], 1), Allocation::NeedsRenumber);
}

#[test]
fn duplicate_neighbors_request_renumber() {
    assert_eq!(allocate(&[1000, 1000], 1), Allocation::NeedsRenumber);
}

#[test]
fn gap_of_two_still_fits() {
    assert_eq!(allocate(&[1000, 1002], 1), Allocation::Position(1001));
}

#[test]
fn tail_overflow_requests_renumber() {
    assert_eq!(allocate(&[i64::MAX - 10], 1), Allocation::NeedsRenumber);
}

#[test]
fn repeated_tail_inserts_never_renumber() {
    let mut positions: Vec<i64> = Vec::new();
    for _ in 0..1000 {
        let Allocation::Position(pos) = allocate(&positions, positions.len()) else {
            panic!("tail insert should never need renumbering");
        };
        positions.push(pos);
    }
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn repeated_midpoint_inserts_eventually_exhaust_gap() {
    let mut positions = vec![1000, 2000];
    let mut placed = 0;
    while let Allocation::Position(pos) = allocate(&positions, 1) {
        assert!(positions[0] < pos && pos < positions[1]);
        positions.insert(1, pos);
        positions.remove(2);
        placed += 1;
    }
    // 1000-wide gap halves roughly ten times before running out.
    assert!((8..=12).contains(&placed), "placed {placed}");
}

// =============================================================================
// clamp_index / append_position / canonical_positions
// =============================================================================

#[test]
fn clamp_index_bounds_negative_and_large() {
    assert_eq!(clamp_index(-5, 3), 0);
    assert_eq!(clamp_index(2, 3), 2);
    assert_eq!(clamp_index(7, 3), 3);
    assert_eq!(clamp_index(i64::MAX, 0), 0);
}

#[test]
fn append_position_defaults_when_empty() {
    assert_eq!(append_position(None), 1000);
    assert_eq!(append_position(Some(4500)), 5500);
}

#[test]
fn canonical_positions_are_evenly_spaced_in_order() {
    assert_eq!(canonical_positions(&[9, 4, 7]), vec![(9, 1000), (4, 2000), (7, 3000)]);
    assert!(canonical_positions(&[]).is_empty());
}
