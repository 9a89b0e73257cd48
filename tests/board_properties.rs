use otomidi::board::{ActiveState, Board, Cell, Direction};
use otomidi::notes::{map_index_to_pitch, pitch_of};
use pretty_assertions::assert_eq;

// a busy 7x6 board with every kind of cell on it
fn busy_board() -> Board {
    let mut b = Board::new(6, 7);
    b[(0, 0)] = Cell::Token(Direction::Right);
    b[(3, 0)] = Cell::Token(Direction::Down);
    b[(6, 5)] = Cell::Token(Direction::Left);
    b[(2, 3)] = Cell::Token(Direction::Up);
    b[(5, 2)] = Cell::Merged(vec![Direction::Left, Direction::Up]);
    b[(1, 4)] = Cell::Wall;
    b[(4, 4)] = Cell::SoundWall;
    b[(5, 0)] = Cell::RotateClockwise;
    b[(0, 3)] = Cell::RotateCounterClockwise;
    b
}

// fixtures and dead cells carry no directions, so this counts tokens
fn token_count(b: &Board) -> usize {
    b.cells().iter().map(|c| c.merged_states().len()).sum()
}

#[test]
fn identical_boards_evolve_identically() {
    let mut a = busy_board();
    let mut b = busy_board();
    for _ in 0..200 {
        a.next_state();
        b.next_state();
        assert_eq!(a, b);
        assert_eq!(a.active_cells(), b.active_cells());
    }
}

#[test]
fn dimensions_fixtures_and_token_count_survive_ticks() {
    let mut b = busy_board();
    let start_tokens = token_count(&b);
    for _ in 0..200 {
        b.next_state();
        assert_eq!((b.rows(), b.cols()), (6, 7));
        assert_eq!(b.cells().len(), 42);
        assert_eq!(b[(1, 4)], Cell::Wall);
        assert_eq!(b[(4, 4)], Cell::SoundWall);
        assert_eq!(b[(5, 0)], Cell::RotateClockwise);
        assert_eq!(b[(0, 3)], Cell::RotateCounterClockwise);
        assert_eq!(token_count(&b), start_tokens);
    }
}

#[test]
fn straight_move_and_edge_bounce() {
    let mut b = Board::new(3, 3);
    b[(0, 1)] = Cell::Token(Direction::Right);
    b.next_state();
    let mut expected = Board::new(3, 3);
    expected[(1, 1)] = Cell::Token(Direction::Right);
    assert_eq!(b, expected);

    let mut b = Board::new(3, 3);
    b[(2, 1)] = Cell::Token(Direction::Right);
    b.next_state();
    assert_eq!(b[(1, 1)], Cell::Token(Direction::Left));
    assert_eq!(b.live_cells(), 1);
}

#[test]
fn head_on_tokens_merge_then_rotate() {
    let mut b = Board::new(3, 3);
    b[(0, 0)] = Cell::Token(Direction::Right);
    b[(2, 0)] = Cell::Token(Direction::Left);
    b.next_state();
    // both land on (1,0); with two members each is turned clockwise once
    assert_eq!(b[(1, 0)], Cell::Merged(vec![Direction::Down, Direction::Up]));
    assert_eq!(b.live_cells(), 1);
}

#[test]
fn sound_wall_triggers_row() {
    let mut b = Board::new(3, 3);
    b[(0, 1)] = Cell::Token(Direction::Right);
    b[(1, 1)] = Cell::SoundWall;
    let active = b.active_cells();
    assert_eq!(active.get(0, 1), ActiveState::RowActivated);
    assert_eq!(active.count(), 1);

    // a plain wall makes no sound
    b[(1, 1)] = Cell::Wall;
    assert_eq!(b.active_cells().count(), 0);
}

#[test]
fn note_mapping() {
    assert_eq!(map_index_to_pitch(2, &["C4", "D4"]), map_index_to_pitch(0, &["C4", "D4"]));
    assert_eq!(map_index_to_pitch(0, &["BB3"]), pitch_of("A#3"));
}

#[test]
fn resize_drops_cells_for_good() {
    let mut b = Board::new(5, 5);
    b[(4, 4)] = Cell::Wall;
    b[(1, 1)] = Cell::Token(Direction::Up);
    b.change_size(3, 3);
    assert_eq!(b.get(4, 4), None);
    assert_eq!(b[(1, 1)], Cell::Token(Direction::Up));
    b.change_size(5, 5);
    assert_eq!(b[(4, 4)], Cell::Dead);
    assert_eq!(b.live_cells(), 1);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn out_of_range_index_panics() {
    let b = Board::new(2, 2);
    let _ = &b[(2, 0)];
}
