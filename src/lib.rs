pub mod config;
pub mod game;
pub mod logging;

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::warn;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;
use web_sys::js_sys::Function;

pub use config::EngineConfig;
pub use game::{
    Anchor, Board, Card, Cell, CellId, CellRole, Deck, GameEvent, GameSnapshot, GameState,
    GuessToken, IntegrityError, InvalidGuessReason, PenaltyTicket, PendingPenalty, RankWindow,
    RuleEngine, RuleError, RuleResolution, StatusMessage, Suit, TurnState, Value,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    logging::init(log::LevelFilter::Info);
}

#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: Option<String>) {
    logging::init(logging::parse_level(level.as_deref()));
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

struct Session {
    engine: RuleEngine,
    state: GameState,
}

type Listener = Rc<RefCell<Option<Function>>>;

fn notify(listener: &Listener, resolution: &RuleResolution) {
    let Some(callback) = listener.borrow().clone() else {
        return;
    };
    match serde_json::to_string(resolution) {
        Ok(json) => {
            if let Err(error) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                warn!("update listener threw: {error:?}");
            }
        }
        Err(error) => warn!("could not serialize update: {error}"),
    }
}

/// 一局 Fenster 游戏的 JS 句柄。
///
/// Every command returns a `RuleResolution` as JSON. A wrong guess arms a
/// penalty timer owned by this handle; when it fires the cluster is redealt and
/// the listener registered with `onUpdate` receives the resulting resolution.
/// Dropping the handle (or calling `abandon`) cancels a pending timer.
#[wasm_bindgen]
pub struct FensterGame {
    session: Rc<RefCell<Session>>,
    listener: Listener,
    penalty_timer: Option<Timeout>,
}

#[wasm_bindgen]
impl FensterGame {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<FensterGame, JsValue> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => EngineConfig::default(),
        };
        let mut engine = RuleEngine::new(config);
        let state = engine.deal().map_err(to_js_error)?;
        Ok(FensterGame {
            session: Rc::new(RefCell::new(Session { engine, state })),
            listener: Rc::new(RefCell::new(None)),
            penalty_timer: None,
        })
    }

    #[wasm_bindgen(js_name = "onUpdate")]
    pub fn on_update(&mut self, listener: Option<Function>) {
        *self.listener.borrow_mut() = listener;
    }

    #[wasm_bindgen(js_name = "registerPlayers")]
    pub fn register_players(&mut self, names_json: &str) -> Result<String, JsValue> {
        let names: Vec<String> = serde_json::from_str(names_json).map_err(serde_to_js_error)?;
        self.run(|engine, state| engine.register_players(state, names))
    }

    #[wasm_bindgen(js_name = "selectStartCard")]
    pub fn select_start_card(&mut self, cell: CellId) -> Result<String, JsValue> {
        self.run(|engine, state| engine.select_start_card(state, cell))
    }

    pub fn guess(&mut self, cell: CellId, token: &str) -> Result<String, JsValue> {
        let token: GuessToken = token.parse().map_err(to_js_error)?;
        let json = self.run(|engine, state| engine.evaluate_guess(state, cell, token))?;
        self.arm_penalty_timer();
        Ok(json)
    }

    #[wasm_bindgen(js_name = "nextPlayer")]
    pub fn next_player(&mut self) -> Result<String, JsValue> {
        self.run(|engine, state| engine.next_player(state))
    }

    #[wasm_bindgen(js_name = "availableGuesses")]
    pub fn available_guesses(&self, cell: CellId) -> Result<JsValue, JsValue> {
        let session = self.session.borrow();
        let guesses = session.engine.available_guesses(&session.state, cell);
        to_value(&guesses).map_err(JsValue::from)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let session = self.session.borrow();
        to_value(&session.engine.snapshot(&session.state)).map_err(JsValue::from)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let session = self.session.borrow();
        serde_json::to_string(&session.engine.snapshot(&session.state)).map_err(serde_to_js_error)
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.borrow().state).map_err(serde_to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn locked(&self) -> bool {
        self.session.borrow().state.locked
    }

    #[wasm_bindgen(getter)]
    pub fn finished(&self) -> bool {
        self.session.borrow().state.finished
    }

    /// Cancels a pending penalty timer. The game stays locked afterwards.
    pub fn abandon(&mut self) -> bool {
        match self.penalty_timer.take() {
            Some(timer) => {
                drop(timer.cancel());
                true
            }
            None => false,
        }
    }
}

impl FensterGame {
    fn run<F>(&self, action: F) -> Result<String, JsValue>
    where
        F: FnOnce(&mut RuleEngine, &mut GameState) -> Result<Vec<GameEvent>, RuleError>,
    {
        let mut session = self.session.borrow_mut();
        let Session { engine, state } = &mut *session;
        let events = action(engine, state).map_err(to_js_error)?;
        make_resolution_json(engine.resolution(state, events))
    }

    fn arm_penalty_timer(&mut self) {
        let pending = self.session.borrow().state.pending_penalty.clone();
        let Some(pending) = pending else {
            return;
        };
        // a fired timer is only released here; dropping it again is harmless
        self.penalty_timer.take();

        let session = Rc::clone(&self.session);
        let listener = Rc::clone(&self.listener);
        let ticket = pending.ticket;
        self.penalty_timer = Some(Timeout::new(pending.delay_ms, move || {
            let outcome = {
                let mut session = session.borrow_mut();
                let Session { engine, state } = &mut *session;
                engine
                    .resolve_penalty(state, ticket)
                    .map(|events| engine.resolution(state, events))
            };
            match outcome {
                Ok(resolution) => notify(&listener, &resolution),
                Err(error) => warn!("penalty timer {ticket} fired without effect: {error}"),
            }
        }));
    }
}

/// 5x5 布局，空位为 null。
#[wasm_bindgen(js_name = "boardLayout")]
pub fn board_layout() -> Result<JsValue, JsValue> {
    to_value(&game::topology::GRID).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "cardCode")]
pub fn card_code(card: JsValue) -> Result<String, JsValue> {
    let card: Card = serde_wasm_bindgen::from_value(card).map_err(JsValue::from)?;
    Ok(card.code())
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
