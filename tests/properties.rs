//! Property tests: board + deck conservation, corner redeals and atomic rejection
//! across arbitrary command sequences.

use fenster_core::game::topology::{self, CellId, CELL_COUNT};
use fenster_core::{EngineConfig, GameState, GuessToken, RuleEngine, Suit};
use proptest::prelude::*;

const TOKENS: [GuessToken; 10] = [
    GuessToken::Higher,
    GuessToken::Lower,
    GuessToken::Inside,
    GuessToken::Outside,
    GuessToken::Red,
    GuessToken::Black,
    GuessToken::Suit(Suit::Spades),
    GuessToken::Suit(Suit::Hearts),
    GuessToken::Suit(Suit::Clubs),
    GuessToken::Suit(Suit::Diamonds),
];

#[derive(Debug, Clone)]
enum Action {
    Start(CellId),
    Guess(CellId, usize),
    Resolve,
    Pass,
}

fn action() -> impl Strategy<Value = Action> {
    let cell = 0..CELL_COUNT as CellId;
    prop_oneof![
        1 => cell.clone().prop_map(Action::Start),
        4 => (cell, 0..TOKENS.len()).prop_map(|(cell, token)| Action::Guess(cell, token)),
        1 => Just(Action::Resolve),
        1 => Just(Action::Pass),
    ]
}

fn new_game(seed: u64) -> (RuleEngine, GameState) {
    let mut engine = RuleEngine::new(EngineConfig::default().with_seed(seed));
    let mut state = engine.deal().expect("deal");
    engine
        .register_players(&mut state, ["Ana", "Ben", "Cleo"])
        .expect("register");
    (engine, state)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_commands_preserve_invariants(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..80),
    ) {
        let (mut engine, mut state) = new_game(seed);

        for action in actions {
            let before = state.clone();
            let redealt = match action {
                Action::Resolve => state.pending_penalty.as_ref().map(|pending| pending.cells.clone()),
                _ => None,
            };

            let result = match action {
                Action::Start(cell) => engine.select_start_card(&mut state, cell),
                Action::Guess(cell, token) => engine.evaluate_guess(&mut state, cell, TOKENS[token]),
                Action::Resolve => match state.pending_penalty.as_ref().map(|pending| pending.ticket) {
                    Some(ticket) => engine.resolve_penalty(&mut state, ticket),
                    None => continue,
                },
                Action::Pass => engine.next_player(&mut state),
            };

            prop_assert_eq!(state.integrity_check(), Ok(()));
            prop_assert_eq!(state.locked, state.pending_penalty.is_some());

            match result {
                Err(error) => {
                    prop_assert_eq!(&state, &before, "rejected command mutated state: {}", error);
                }
                Ok(_) => {
                    if let Some(cells) = redealt {
                        for id in cells {
                            prop_assert_eq!(
                                state.board.is_face_up(id),
                                topology::is_corner(id),
                                "cell {} after redeal", id
                            );
                        }
                        prop_assert!(state.anchor.is_none());
                    }
                }
            }

            if state.finished {
                prop_assert!(state.cells().iter().all(|cell| cell.face_up));
            }
        }
    }

    #[test]
    fn prop_wrong_guess_cluster_contains_guessed_cell(
        seed in any::<u64>(),
        cell in 0..CELL_COUNT as CellId,
        token in 0..TOKENS.len(),
    ) {
        let (mut engine, mut state) = new_game(seed);
        engine.select_start_card(&mut state, 0).expect("corner start");

        if let Ok(events) = engine.evaluate_guess(&mut state, cell, TOKENS[token]) {
            if let Some(pending) = state.pending_penalty.as_ref() {
                prop_assert!(pending.cells.contains(&cell));
                prop_assert!(pending.cells.iter().all(|id| state.board.is_face_up(*id)));
                prop_assert_eq!(state.message.to_string(), format!("wrong:{}", pending.drinks()));
                prop_assert!(!events.is_empty());
            }
        }
    }
}
