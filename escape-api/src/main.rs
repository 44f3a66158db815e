//! King's-Escape Web API
//!
//! Thin presentation layer over escape-core: holds a single game session
//! behind a mutex and serves the board state, per-square movability hints,
//! and the win signal as JSON. All puzzle rules live in the engine crate;
//! this binary only translates HTTP triggers (move attempts, restart,
//! new layout, tutorial toggle) into engine calls.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use escape_core::{Game, Pos, COLS, ROWS};

// =============================================================================
// Session State
// =============================================================================

/// Global game session state
struct GameSession {
    game: Game,
    /// Tutorial mode: when enabled, state responses include movability hints.
    tutorial: bool,
}

impl GameSession {
    fn new() -> Self {
        let mut rng = rand::rng();
        Self {
            game: Game::new(&mut rng),
            tutorial: false,
        }
    }
}

/// Shared application state
struct AppStateInner {
    session: Mutex<GameSession>,
}

type AppState = Arc<AppStateInner>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct CellModel {
    piece: &'static str,
    symbol: char,
}

#[derive(Serialize)]
struct GameStateModel {
    /// 8 rows × 2 columns; null marks the empty cell
    board: Vec<Vec<Option<CellModel>>>,
    move_count: u32,
    won: bool,
    /// Raw board encoding, handy for bug reports and bookmarks
    encoding: u64,
    /// Squares that can move right now; present only in tutorial mode
    #[serde(skip_serializing_if = "Option::is_none")]
    movable: Option<Vec<(u8, u8)>>,
    /// Win banner text, present once the king has escaped
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct LegalMoveModel {
    from: (u8, u8),
    to: (u8, u8),
}

#[derive(Deserialize)]
struct MoveRequest {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct TutorialRequest {
    enabled: bool,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

// =============================================================================
// Conversion Functions
// =============================================================================

/// Convert the session to a JSON-serializable GameStateModel
fn session_to_model(session: &GameSession) -> GameStateModel {
    let board = session.game.board();

    let mut rows = Vec::with_capacity(ROWS as usize);
    for row in 0..ROWS {
        let mut cells = Vec::with_capacity(COLS as usize);
        for col in 0..COLS {
            let cell = board.piece(Pos::from_row_col(row, col)).map(|p| CellModel {
                piece: p.name(),
                symbol: p.symbol(),
            });
            cells.push(cell);
        }
        rows.push(cells);
    }

    let movable = if session.tutorial {
        Some(
            board
                .movable_squares()
                .iter()
                .map(|p| (p.row(), p.col()))
                .collect(),
        )
    } else {
        None
    };

    let message = if session.game.won() {
        Some(format!(
            "You escaped in {} moves!",
            session.game.move_count()
        ))
    } else {
        None
    };

    GameStateModel {
        board: rows,
        move_count: session.game.move_count(),
        won: session.game.won(),
        encoding: board.to_u64(),
        movable,
        message,
    }
}

fn bad_request(detail: &str) -> (StatusCode, Json<ErrorModel>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorModel {
            detail: detail.to_string(),
        }),
    )
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session.lock().unwrap();
    Json(session_to_model(&session))
}

async fn get_moves(State(state): State<AppState>) -> Json<Vec<LegalMoveModel>> {
    let session = state.session.lock().unwrap();
    let board = session.game.board();

    let moves = match board.find_empty() {
        Some(to) => board
            .movable_squares()
            .iter()
            .map(|p| LegalMoveModel {
                from: (p.row(), p.col()),
                to: (to.row(), to.col()),
            })
            .collect(),
        None => vec![],
    };
    Json(moves)
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameStateModel>, (StatusCode, Json<ErrorModel>)> {
    let mut session = state.session.lock().unwrap();

    if session.game.won() {
        return Err(bad_request("Game is already over"));
    }
    if req.row >= ROWS || req.col >= COLS {
        return Err(bad_request("Position out of range"));
    }
    if !session.game.try_move(Pos::from_row_col(req.row, req.col)) {
        return Err(bad_request("Illegal move"));
    }

    Ok(Json(session_to_model(&session)))
}

async fn restart_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session.lock().unwrap();
    session.game.restart();
    Json(session_to_model(&session))
}

async fn new_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session.lock().unwrap();
    let mut rng = rand::rng();
    session.game.new_layout(&mut rng);
    Json(session_to_model(&session))
}

async fn set_tutorial(
    State(state): State<AppState>,
    Json(req): Json<TutorialRequest>,
) -> Json<GameStateModel> {
    let mut session = state.session.lock().unwrap();
    session.tutorial = req.enabled;
    Json(session_to_model(&session))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    let state: AppState = Arc::new(AppStateInner {
        session: Mutex::new(GameSession::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/move", post(make_move))
        .route("/restart", post(restart_game))
        .route("/new", post(new_game))
        .route("/tutorial", post(set_tutorial))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
    println!("King's-Escape API running on http://localhost:8000");
    axum::serve(listener, app).await.unwrap();
}
