use bingo_engine::prize::prize_pool;

#[test]
fn pool_scales_with_players_and_stake() {
    assert_eq!(prize_pool(5, 10, 0.8), 40);
    assert_eq!(prize_pool(10, 10, 0.8), 80);
    assert_eq!(prize_pool(10, 25, 0.8), 200);
}

#[test]
fn pool_rounds_down_to_whole_units() {
    // 3 * 10 * 0.8 = 24 exactly; 3 * 7 * 0.8 = 16.8 floors to 16.
    assert_eq!(prize_pool(3, 7, 0.8), 16);
    assert_eq!(prize_pool(1, 1, 0.8), 0);
}

#[test]
fn empty_room_has_no_pool() {
    assert_eq!(prize_pool(0, 10, 0.8), 0);
}

#[test]
fn payout_ratio_is_respected() {
    assert_eq!(prize_pool(4, 10, 1.0), 40);
    assert_eq!(prize_pool(4, 10, 0.5), 20);
    assert_eq!(prize_pool(4, 10, 0.0), 0);
}
