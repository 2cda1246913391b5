use super::*;

#[test]
fn creator_has_owner_and_member_access() {
    assert!(decide(7, Some(7), false, Access::Owner));
    assert!(decide(7, Some(7), false, Access::Member));
}

#[test]
fn member_is_not_owner() {
    assert!(decide(8, Some(7), true, Access::Member));
    assert!(!decide(8, Some(7), true, Access::Owner));
}

#[test]
fn stranger_is_denied() {
    assert!(!decide(9, Some(7), false, Access::Member));
    assert!(!decide(9, None, false, Access::Owner));
}

#[test]
fn orphaned_board_is_reachable_through_membership_only() {
    assert!(decide(3, None, true, Access::Member));
    assert!(!decide(3, None, true, Access::Owner));
}
