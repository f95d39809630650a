use proptest::prelude::*;

use mnk::{Board, Cell, PlayerId};

/// A board size, a win length that may be out of range, and a list of moves that
/// may fall outside the board.
fn board_and_moves() -> impl Strategy<Value = (usize, usize, usize, Vec<(i32, i32)>)> {
    (1usize..7, 1usize..7, 0usize..9).prop_flat_map(|(w, h, to_win)| {
        let moves = prop::collection::vec((-2i32..w as i32 + 2, -2i32..h as i32 + 2), 0..40);
        (Just(w), Just(h), Just(to_win), moves)
    })
}

proptest! {
    #[test]
    fn play_rejects_taken_and_out_of_range((w, h, to_win, moves) in board_and_moves()) {
        let players = [PlayerId::fresh(), PlayerId::fresh()];
        let mut board = Board::new(w, h, to_win);
        for (i, &(x, y)) in moves.iter().enumerate() {
            let player = players[i % 2];
            let in_bounds = x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h;
            let was_empty = board.get(x, y) == Some(Cell::Empty);
            let before = board.clone();

            let accepted = board.play(player, x, y);
            prop_assert_eq!(accepted, in_bounds && was_empty);
            if accepted {
                prop_assert_eq!(board.owner(x, y), Some(player));
            } else {
                prop_assert_eq!(&board, &before);
            }
        }
    }

    #[test]
    fn available_moves_counts_empty_cells((w, h, to_win, moves) in board_and_moves()) {
        let player = PlayerId::fresh();
        let mut board = Board::new(w, h, to_win);
        let mut occupied = 0;
        for &(x, y) in &moves {
            if board.play(player, x, y) {
                occupied += 1;
            }
        }
        let available = board.available_moves();
        prop_assert_eq!(available.len(), w * h - occupied);
        prop_assert_eq!(board.check_draw(), occupied == w * h);
        for move_ in available {
            prop_assert!(move_.is_valid(w, h));
            prop_assert_eq!(board.get(move_.x, move_.y), Some(Cell::Empty));
        }
    }

    #[test]
    fn clone_is_independent((w, h, to_win, moves) in board_and_moves()) {
        let players = [PlayerId::fresh(), PlayerId::fresh()];
        let mut board = Board::new(w, h, to_win);
        for (i, &(x, y)) in moves.iter().enumerate() {
            board.play(players[i % 2], x, y);
        }
        let snapshot = board.clone();
        let mut copy = board.clone();
        prop_assert_eq!(&copy, &board);

        for move_ in copy.available_moves() {
            copy.play(players[0], move_.x, move_.y);
        }
        prop_assert_eq!(&board, &snapshot);

        board.clear();
        prop_assert!(copy.check_draw());
        prop_assert_eq!(board.available_moves().len(), w * h);
    }

    #[test]
    fn out_of_range_to_win_uses_smaller_dimension(
        w in 1usize..8,
        h in 1usize..8,
        extra in 1usize..5,
        zero in any::<bool>(),
    ) {
        let min_dim = w.min(h);
        let to_win = if zero { 0 } else { min_dim + extra };
        let player = PlayerId::fresh();

        // a full line along the smaller dimension
        let mut board = Board::new(w, h, to_win);
        prop_assert_eq!(board.effective_to_win(), min_dim);
        for i in 0..min_dim as i32 {
            if w <= h {
                board.play(player, i, 0);
            } else {
                board.play(player, 0, i);
            }
        }
        prop_assert_eq!(board.check_win(), Some(player));

        // one short of it is not enough
        if min_dim > 1 {
            let mut board = Board::new(w, h, to_win);
            for i in 0..min_dim as i32 - 1 {
                if w <= h {
                    board.play(player, i, 0);
                } else {
                    board.play(player, 0, i);
                }
            }
            prop_assert_eq!(board.check_win(), None);
        }
    }
}
