//! WASM bindings for escape-core
//!
//! Provides a JavaScript-friendly API for the puzzle logic. Randomness is
//! seeded by the caller (for example with `Date.now()`), so the module
//! needs no browser entropy source.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::{Game, Pos, COLS, ROWS};

/// WASM-friendly wrapper around a game session
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a game on a layout generated from the given seed
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WasmGame {
        let mut rng = StdRng::seed_from_u64(seed);
        WasmGame {
            inner: Game::new(&mut rng),
        }
    }

    /// Generate a brand-new layout and reset the attempt
    #[wasm_bindgen(js_name = newLayout)]
    pub fn new_layout(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.inner.new_layout(&mut rng);
    }

    /// Reset to the starting layout of the current attempt
    pub fn restart(&mut self) {
        self.inner.restart();
    }

    /// Try to move the piece at (row, col) into the empty cell.
    /// Returns true if the move was applied.
    #[wasm_bindgen(js_name = tryMove)]
    pub fn try_move(&mut self, row: u8, col: u8) -> bool {
        if row >= ROWS || col >= COLS {
            return false;
        }
        self.inner.try_move(Pos::from_row_col(row, col))
    }

    /// Completed moves in the current attempt
    #[wasm_bindgen(js_name = moveCount)]
    pub fn move_count(&self) -> u32 {
        self.inner.move_count()
    }

    /// Whether the king has reached the escape row
    #[wasm_bindgen(js_name = hasWon)]
    pub fn has_won(&self) -> bool {
        self.inner.won()
    }

    /// Bitmask of cells whose piece can move right now (bit i = cell i)
    #[wasm_bindgen(js_name = movableMask)]
    pub fn movable_mask(&self) -> u16 {
        self.inner.board().movable_mask()
    }

    /// The empty cell as [row, col]
    #[wasm_bindgen(js_name = emptyCell)]
    pub fn empty_cell(&self) -> Vec<u8> {
        match self.inner.board().find_empty() {
            Some(pos) => vec![pos.row(), pos.col()],
            None => vec![],
        }
    }

    /// Raw 3-bit encoding of the cell at (row, col)
    pub fn cell(&self, row: u8, col: u8) -> u8 {
        if row >= ROWS || col >= COLS {
            return 0;
        }
        self.inner.board().cell(Pos::from_row_col(row, col)) as u8
    }

    /// All cells as a JSON array.
    /// Each entry is { row, col, piece: "king"|... | null, symbol: "♔"|... | null }
    pub fn cells(&self) -> JsValue {
        let board = self.inner.board();
        let cells: Vec<WasmCell> = Pos::all()
            .map(|pos| {
                let piece = board.piece(pos);
                WasmCell {
                    row: pos.row(),
                    col: pos.col(),
                    piece: piece.map(|p| p.name()),
                    symbol: piece.map(|p| p.symbol()),
                }
            })
            .collect();
        serde_wasm_bindgen::to_value(&cells).unwrap()
    }

    /// Get the raw u64 encoding of the current board
    #[wasm_bindgen(js_name = boardEncoding)]
    pub fn board_encoding(&self) -> u64 {
        self.inner.board().to_u64()
    }
}

/// Serializable cell view for JavaScript
#[derive(serde::Serialize)]
struct WasmCell {
    row: u8,
    col: u8,
    piece: Option<&'static str>,
    symbol: Option<char>,
}
