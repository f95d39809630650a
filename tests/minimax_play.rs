use std::collections::HashMap;

use mnk::{
    AgentKind, BoardGameAgent, Color, Game, GameConfig, MinimaxAgent, Player, PlayerConfig,
    PlayerId, RandomAgent, Session, Symbol,
};

/// Let the agents play the current round out, agent i driving player i.
fn play_out(game: &mut Game, agents: &mut [Box<dyn BoardGameAgent>]) {
    while game.is_playing() {
        let me = game.current();
        let seat = game.players().iter().position(|p| p.id() == me).unwrap();
        let move_ = agents[seat].next_move(game.board(), me, game.players());
        assert!(!move_.is_none(), "agent found no move on a live board");
        assert!(game.board().owner(move_.x, move_.y).is_none());
        assert!(game.play_move(move_.x, move_.y));
    }
}

#[test]
fn test_minimax_vs_minimax_is_a_draw() {
    let mut game = Game::new();
    let mut agents: Vec<Box<dyn BoardGameAgent>> =
        vec![Box::new(MinimaxAgent::new()), Box::new(MinimaxAgent::new())];
    play_out(&mut game, &mut agents);
    assert!(game.is_ended());
    assert_eq!(game.winner(), None);
    assert!(game.board().check_draw());
}

/// Finished games and games lost by minimax.
#[derive(Default)]
struct Tally {
    games: usize,
    losses: usize,
}

/// Play every line of the round: minimax answers for `minimax_id`, the opponent
/// tries each free cell in turn on its own copy of the game.
fn explore(game: &Game, minimax: &mut MinimaxAgent, minimax_id: PlayerId, tally: &mut Tally) {
    if game.is_ended() {
        tally.games += 1;
        if game.winner().is_some() && game.winner() != Some(minimax_id) {
            tally.losses += 1;
        }
        return;
    }
    let me = game.current();
    if me == minimax_id {
        let move_ = minimax.next_move(game.board(), me, game.players());
        let mut next = game.clone();
        assert!(next.play_move(move_.x, move_.y));
        explore(&next, minimax, minimax_id, tally);
    } else {
        for move_ in game.board().available_moves() {
            let mut next = game.clone();
            assert!(next.play_move(move_.x, move_.y));
            explore(&next, minimax, minimax_id, tally);
        }
    }
}

#[test]
fn test_minimax_first_never_loses() {
    let game = Game::new();
    let minimax_id = game.players()[0].id();
    let mut tally = Tally::default();
    explore(&game, &mut MinimaxAgent::new(), minimax_id, &mut tally);
    assert!(tally.games > 8);
    assert_eq!(tally.losses, 0);
}

#[test]
fn test_minimax_second_never_loses() {
    let game = Game::new();
    let minimax_id = game.players()[1].id();
    let mut tally = Tally::default();
    let mut minimax = MinimaxAgent::new().with_threads(2);
    explore(&game, &mut minimax, minimax_id, &mut tally);
    assert!(tally.games > 9 * 7);
    assert_eq!(tally.losses, 0);
}

#[test]
fn test_random_scores_nothing_against_minimax() {
    let mut game = Game::new();
    for seed in 0..2 {
        let mut agents: Vec<Box<dyn BoardGameAgent>> = vec![
            Box::new(MinimaxAgent::new()),
            Box::new(RandomAgent::seeded(seed)),
        ];
        play_out(&mut game, &mut agents);
        game.reset();
    }
    assert_eq!(game.players()[1].points, 0);
}

#[test]
fn test_three_player_game_with_minimax_falls_back() {
    let players = vec![
        Player::ai("a", Symbol::Circle, Color::RED),
        Player::ai("b", Symbol::Cross, Color::BLUE),
        Player::ai("c", Symbol::Triangle, Color::RED),
    ];
    let mut game = Game::with_config(4, 4, 3, players);
    let mut agents: Vec<Box<dyn BoardGameAgent>> = vec![
        Box::new(MinimaxAgent::with_fallback(RandomAgent::seeded(1))),
        Box::new(RandomAgent::seeded(2)),
        Box::new(MinimaxAgent::with_fallback(RandomAgent::seeded(3))),
    ];
    play_out(&mut game, &mut agents);
    assert!(game.is_ended());
    let total: u32 = game.players().iter().map(|p| p.points).sum();
    assert_eq!(total, if game.winner().is_some() { 1 } else { 0 });
}

#[test]
fn test_session_between_configured_agents() {
    let config = GameConfig {
        seed: Some(11),
        players: vec![
            PlayerConfig {
                is_ai: true,
                ai_model: Some(AgentKind::Minimax),
                ..PlayerConfig::default()
            },
            PlayerConfig {
                is_ai: true,
                ai_model: Some(AgentKind::Minimax),
                ..PlayerConfig::default()
            },
        ],
        ..GameConfig::default()
    };
    let (game, agents) = config.build();
    let mut output = Vec::new();
    let mut session = Session::new(game, agents, "".as_bytes(), &mut output);
    session.play_match(2).unwrap();
    let game = session.into_game();
    assert!(game.is_ended());
    assert!(game.players().iter().all(|p| p.points == 0));

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("It's a draw!").count(), 2);
    assert!(text.contains("Final score:"));
}

#[test]
fn test_session_human_against_random() {
    let config = GameConfig {
        seed: Some(5),
        players: vec![
            PlayerConfig::default(),
            PlayerConfig {
                is_ai: true,
                ..PlayerConfig::default()
            },
        ],
        ..GameConfig::default()
    };
    let (game, agents) = config.build();
    assert_eq!(agents.len(), 1);

    // try every cell in order; taken cells are re-prompted
    let script: String = (0..3)
        .flat_map(|y| ["a", "b", "c"].iter().map(move |col| format!("{}{}\n", col, y)))
        .collect::<Vec<_>>()
        .join("");
    let mut output = Vec::new();
    let mut session = Session::new(game, agents, script.as_bytes(), &mut output);
    session.play_round().unwrap();
    assert!(session.game().is_ended());
}

#[test]
fn test_session_without_agents_map_entries_reads_input() {
    let mut output = Vec::new();
    let mut session = Session::new(
        Game::with_config(2, 2, 2, Vec::new()),
        HashMap::new(),
        "a0\nb0\na1\n".as_bytes(),
        &mut output,
    );
    let winner = session.play_round().unwrap();
    assert_eq!(winner, Some(session.game().players()[0].id()));
}
