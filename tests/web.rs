//! Browser tests for the `FensterGame` handle.

#![cfg(target_arch = "wasm32")]

use fenster_core::{FensterGame, GameSnapshot, GameState, StatusMessage};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const INNER_CELL: u8 = 6;

fn registered_game(delay_ms: u32) -> FensterGame {
    let config = format!(r#"{{"penalty_delay_ms": {delay_ms}, "seed": 7}}"#);
    let mut game = FensterGame::new(Some(config)).expect("game");
    game.register_players(r#"["Ana", "Ben"]"#).expect("players");
    game
}

fn snapshot(game: &FensterGame) -> GameSnapshot {
    serde_json::from_str(&game.snapshot_json().expect("snapshot json")).expect("snapshot")
}

/// Guesses the wrong colour on an inner cell so the penalty path is taken.
fn guess_wrong(game: &mut FensterGame) {
    let state: GameState = serde_json::from_str(&game.state_json().expect("state")).expect("parse");
    let card = state.board.get(INNER_CELL).expect("inner cell").card;
    let wrong = if card.is_red() { "black" } else { "red" };
    game.guess(INNER_CELL, wrong).expect("guess accepted");
}

#[wasm_bindgen_test]
fn new_game_waits_for_a_start_card() {
    let game = registered_game(2_000);
    let snapshot = snapshot(&game);

    assert_eq!(snapshot.cells.len(), 21);
    assert_eq!(snapshot.players, vec!["Ana".to_string(), "Ben".to_string()]);
    assert_eq!(snapshot.message, StatusMessage::ChooseToStart);
    assert!(!game.locked());
    assert!(!game.finished());
}

#[wasm_bindgen_test]
fn unknown_token_is_rejected() {
    let mut game = registered_game(2_000);
    assert!(game.guess(INNER_CELL, "sideways").is_err());
    assert!(!game.locked());
}

#[wasm_bindgen_test]
fn malformed_config_is_rejected() {
    assert!(FensterGame::new(Some("{not json".to_string())).is_err());
}

#[wasm_bindgen_test]
async fn penalty_timer_redeals_and_unlocks() {
    let mut game = registered_game(20);
    guess_wrong(&mut game);
    assert!(game.locked());
    assert!(game.next_player().is_err());

    TimeoutFuture::new(100).await;

    let snapshot = snapshot(&game);
    assert!(!game.locked());
    assert_eq!(snapshot.message, StatusMessage::Ready);
    assert!(snapshot.pending_penalty.is_none());
    assert!(!snapshot.cells[INNER_CELL as usize].face_up);
}

#[wasm_bindgen_test]
async fn abandoned_penalty_stays_locked() {
    let mut game = registered_game(20);
    guess_wrong(&mut game);
    assert!(game.abandon());
    assert!(!game.abandon());

    TimeoutFuture::new(100).await;

    assert!(game.locked());
    assert!(snapshot(&game).pending_penalty.is_some());
}
