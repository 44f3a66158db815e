//! King's-escape puzzle logic with bit-based board representation.
//!
//! A lone king starts in the bottom-left corner of an 8×2 corridor packed
//! with chess pieces, and the bottom-right corner starts empty. Every move
//! slides or jumps exactly one piece into the single empty cell using that
//! piece's standard chess movement; the puzzle is solved when the king
//! reaches the top row.
//!
//! # Board Encoding (64-bit)
//!
//! ```text
//! Bits 0-47:  Board state (16 cells × 3 bits per cell)
//! Bits 48-63: Unused (zero for a valid board)
//!
//! Each cell (3 bits) holds the occupying piece:
//!   0 = empty, 1 = king, 2 = queen, 3 = rook, 4 = bishop, 5 = knight
//!   (6 and 7 never appear on a valid board)
//!
//! Cell indices (row-major order):
//!   (0,0)=0   (0,1)=1      <- escape row
//!   (1,0)=2   (1,1)=3
//!      ...
//!   (7,0)=14  (7,1)=15     <- king starts at (7,0), empty at (7,1)
//! ```

use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "wasm")]
pub mod wasm;

/// Number of rows on the board.
pub const ROWS: u8 = 8;
/// Number of columns on the board.
pub const COLS: u8 = 2;
/// Total number of cells.
pub const CELLS: u8 = ROWS * COLS;
/// The row the king must reach to win.
pub const ESCAPE_ROW: u8 = 0;

/// Kind of chess piece occupying a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum PieceKind {
    King = 1,
    Queen = 2,
    Rook = 3,
    Bishop = 4,
    Knight = 5,
}

impl PieceKind {
    /// Convert from the 3-bit cell encoding to a piece.
    /// Returns None for the empty encoding (0) and for invalid bits (6, 7).
    #[inline]
    pub fn from_bits(bits: u8) -> Option<PieceKind> {
        match bits {
            1 => Some(PieceKind::King),
            2 => Some(PieceKind::Queen),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Bishop),
            5 => Some(PieceKind::Knight),
            _ => None,
        }
    }

    /// Lowercase piece name, as used in serialized board views.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
        }
    }

    /// Unicode chess symbol for display.
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            PieceKind::King => '♔',
            PieceKind::Queen => '♕',
            PieceKind::Rook => '♖',
            PieceKind::Bishop => '♗',
            PieceKind::Knight => '♘',
        }
    }

    /// Get all piece kinds as an iterator.
    pub fn all() -> impl Iterator<Item = PieceKind> {
        [
            PieceKind::King,
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
        ]
        .into_iter()
    }
}

/// Position on the 8×2 board (0-15).
///
/// Layout:
/// ```text
///    0  1
///    2  3
///    ...
///   14 15
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position from row (0-7) and column (0-1).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < ROWS && col < COLS);
        Pos(row * COLS + col)
    }

    /// Get the row (0-7).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / COLS
    }

    /// Get the column (0-1).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % COLS
    }

    /// Iterate over all 16 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..CELLS).map(Pos)
    }
}

/// The fourteen pieces shuffled into rows 0-6 of a fresh layout.
pub const PIECE_POOL: [PieceKind; 14] = [
    PieceKind::Queen,
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Rook,
    PieceKind::Rook,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Bishop,
    PieceKind::Bishop,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Knight,
    PieceKind::Knight,
    PieceKind::Knight,
];

/// Compact board state - fits in a single u64.
///
/// See module documentation for encoding details.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Board(pub u64);

impl Board {
    /// Bits per cell.
    const CELL_BITS: u32 = 3;
    /// Mask for a single cell (0b111).
    const CELL_MASK: u64 = 0b111;

    /// Create a new board with every cell empty.
    #[inline]
    pub fn new() -> Board {
        Board(0)
    }

    /// Create a board from a raw u64 encoding.
    #[inline]
    pub fn from_u64(bits: u64) -> Board {
        Board(bits)
    }

    /// Get the raw u64 encoding.
    #[inline]
    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// Get the 3 bits for the cell at the given position.
    #[inline]
    pub fn cell(&self, pos: Pos) -> u64 {
        (self.0 >> (pos.0 as u32 * Self::CELL_BITS)) & Self::CELL_MASK
    }

    /// Set the 3 bits for the cell at the given position.
    #[inline]
    pub fn set_cell(&mut self, pos: Pos, value: u64) {
        let shift = pos.0 as u32 * Self::CELL_BITS;
        self.0 = (self.0 & !(Self::CELL_MASK << shift)) | ((value & Self::CELL_MASK) << shift);
    }

    /// Get the piece at a position, or None if the cell is empty.
    #[inline]
    pub fn piece(&self, pos: Pos) -> Option<PieceKind> {
        PieceKind::from_bits(self.cell(pos) as u8)
    }

    /// Put a piece on a cell, or clear it with None.
    #[inline]
    pub fn set_piece(&mut self, pos: Pos, piece: Option<PieceKind>) {
        self.set_cell(pos, piece.map_or(0, |p| p as u64));
    }

    /// Check if a cell is empty.
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.cell(pos) == 0
    }

    /// Locate the empty cell.
    ///
    /// During play exactly one cell is empty; this returns the first one
    /// found, or None if the board has no empty cell at all.
    pub fn find_empty(&self) -> Option<Pos> {
        Pos::all().find(|&pos| self.is_empty(pos))
    }

    /// Locate the king.
    pub fn king_pos(&self) -> Option<Pos> {
        Pos::all().find(|&pos| self.piece(pos) == Some(PieceKind::King))
    }

    /// Count cells holding the given piece kind.
    pub fn piece_count(&self, kind: PieceKind) -> usize {
        Pos::all().filter(|&pos| self.piece(pos) == Some(kind)).count()
    }

    /// Check the structural invariants that hold for every board during
    /// play: exactly one empty cell, exactly one king, no invalid cell
    /// encodings, and no stray high bits.
    pub fn is_consistent(&self) -> bool {
        if self.0 >> (CELLS as u32 * Self::CELL_BITS) != 0 {
            return false;
        }
        let mut empties = 0;
        let mut kings = 0;
        for pos in Pos::all() {
            match self.cell(pos) {
                0 => empties += 1,
                bits => match PieceKind::from_bits(bits as u8) {
                    Some(PieceKind::King) => kings += 1,
                    Some(_) => {}
                    None => return false,
                },
            }
        }
        empties == 1 && kings == 1
    }

    // ========== Win Detection ==========

    /// Check if the king has reached the escape row.
    #[inline]
    pub fn has_won(&self) -> bool {
        self.piece(Pos::from_row_col(ESCAPE_ROW, 0)) == Some(PieceKind::King)
            || self.piece(Pos::from_row_col(ESCAPE_ROW, 1)) == Some(PieceKind::King)
    }

    // ========== Move Legality ==========

    /// Decide whether the piece at `from` may move to `to`.
    ///
    /// `to` is normally the current empty cell. The check is pure: movement
    /// shape per piece kind, plus a clear path for the sliding pieces
    /// (queen, rook, bishop). King and knight moves are single-step or jump
    /// moves and are never path-blocked. An empty `from` cell, or
    /// `from == to`, is never a legal move.
    pub fn is_legal_move(&self, from: Pos, to: Pos) -> bool {
        if from == to {
            return false;
        }
        let piece = match self.piece(from) {
            Some(p) => p,
            None => return false,
        };

        let dr = to.row() as i8 - from.row() as i8;
        let dc = to.col() as i8 - from.col() as i8;

        let shape_ok = match piece {
            PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1,
            PieceKind::Queen => dr == 0 || dc == 0 || dr.abs() == dc.abs(),
            PieceKind::Rook => dr == 0 || dc == 0,
            PieceKind::Bishop => dr.abs() == dc.abs(),
            PieceKind::Knight => matches!((dr.abs(), dc.abs()), (2, 1) | (1, 2)),
        };
        if !shape_ok {
            return false;
        }
        if matches!(piece, PieceKind::King | PieceKind::Knight) {
            return true;
        }

        // Sliders need a clear path: every cell strictly between the
        // endpoints must be empty. Horizontal slides span at most one step
        // on a 2-wide board, but vertical slides can cross up to 6 cells.
        let r_step = dr.signum();
        let c_step = dc.signum();
        let mut r = from.row() as i8 + r_step;
        let mut c = from.col() as i8 + c_step;
        while (r, c) != (to.row() as i8, to.col() as i8) {
            if !self.is_empty(Pos::from_row_col(r as u8, c as u8)) {
                return false;
            }
            r += r_step;
            c += c_step;
        }
        true
    }

    /// Bitmask of cells whose piece can currently move into the empty cell.
    ///
    /// Bit `i` corresponds to `Pos(i)`. Returns 0 when the board has no
    /// empty cell. Used by presentation layers to dim stuck pieces.
    pub fn movable_mask(&self) -> u16 {
        let empty = match self.find_empty() {
            Some(pos) => pos,
            None => return 0,
        };
        let mut mask = 0u16;
        for pos in Pos::all() {
            if self.is_legal_move(pos, empty) {
                mask |= 1 << pos.0;
            }
        }
        mask
    }

    /// Positions whose piece can currently move into the empty cell.
    pub fn movable_squares(&self) -> Vec<Pos> {
        let mask = self.movable_mask();
        Pos::all().filter(|pos| mask & (1 << pos.0) != 0).collect()
    }

    // ========== Move Application ==========

    /// Move the piece at `from` into the empty cell `to`.
    ///
    /// Returns false and leaves the board untouched if the move is illegal
    /// or `to` is not the current empty cell.
    pub fn apply_move(&mut self, from: Pos, to: Pos) -> bool {
        if self.find_empty() != Some(to) || !self.is_legal_move(from, to) {
            return false;
        }
        let piece = self.piece(from);
        self.set_piece(to, piece);
        self.set_piece(from, None);
        debug_assert!(self.is_consistent());
        true
    }

    // ========== Layout Generation ==========

    /// Generate a fresh starting layout.
    ///
    /// The king is fixed at (7,0) and the cell at (7,1) starts empty; the
    /// other fourteen cells are filled with a shuffle of [`PIECE_POOL`].
    /// Shuffles matching a known-unsolvable pattern are discarded and
    /// redrawn. Retries are unbounded: the screen rejects only a small
    /// fraction of shuffles, so acceptance comes within a few iterations.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Board {
        loop {
            let mut pool = PIECE_POOL;
            pool.shuffle(rng);

            let mut board = Board::new();
            board.set_piece(Pos::from_row_col(7, 0), Some(PieceKind::King));
            let mut idx = 0;
            for row in 0..ROWS - 1 {
                for col in 0..COLS {
                    board.set_piece(Pos::from_row_col(row, col), Some(pool[idx]));
                    idx += 1;
                }
            }

            if !board.is_unsolvable_layout() {
                return board;
            }
        }
    }

    /// Heuristic screen for starting layouts known to be unsolvable.
    ///
    /// The nine patterns describe knights and bishops near the king's
    /// corner that lock the king in place: both cells above it holding
    /// knights, a knight above it whose relief square is covered by a
    /// bishop one row further up, or a single-file chain of knights in
    /// rows 6/4/2 capped by a bishop or a fourth knight, in either column
    /// parity. The patterns were found empirically; a layout that passes
    /// the screen is not thereby proven solvable.
    pub fn is_unsolvable_layout(&self) -> bool {
        let knight =
            |row: u8, col: u8| self.piece(Pos::from_row_col(row, col)) == Some(PieceKind::Knight);
        let bishop =
            |row: u8, col: u8| self.piece(Pos::from_row_col(row, col)) == Some(PieceKind::Bishop);

        (knight(6, 0) && knight(6, 1))
            || (knight(6, 1) && bishop(5, 0))
            || (knight(6, 0) && bishop(5, 1))
            || (knight(6, 0) && knight(4, 1) && bishop(3, 0))
            || (knight(6, 1) && knight(4, 0) && bishop(3, 1))
            || (knight(6, 0) && knight(4, 1) && knight(2, 0) && bishop(1, 1))
            || (knight(6, 1) && knight(4, 0) && knight(2, 1) && bishop(1, 0))
            || (knight(6, 0) && knight(4, 1) && knight(2, 0) && knight(0, 1))
            || (knight(6, 1) && knight(4, 0) && knight(2, 1) && knight(0, 0))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// ========== Game Session ==========

/// One puzzle attempt: the live board, the starting layout it can be reset
/// to, and the move counter.
///
/// Holding the session as an owned value (instead of process-wide state)
/// lets callers run independent games side by side; the API crate wraps one
/// in a mutex, tests create as many as they need.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Game {
    board: Board,
    initial: Board,
    move_count: u32,
    won: bool,
}

impl Game {
    /// Start a new game on a freshly generated layout.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Game {
        Game::from_layout(Board::generate(rng))
    }

    /// Start an attempt from a specific layout (replays, tests).
    pub fn from_layout(board: Board) -> Game {
        debug_assert!(board.is_consistent());
        Game {
            board,
            initial: board,
            move_count: 0,
            won: board.has_won(),
        }
    }

    /// The current board.
    #[inline]
    pub fn board(&self) -> Board {
        self.board
    }

    /// The layout this attempt started from.
    #[inline]
    pub fn initial_layout(&self) -> Board {
        self.initial
    }

    /// Completed moves in the current attempt.
    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Whether the king has reached the escape row.
    #[inline]
    pub fn won(&self) -> bool {
        self.won
    }

    /// Attempt to move the piece at `from` into the current empty cell.
    ///
    /// On success the counter advances by one and the win flag is
    /// refreshed; an illegal request is a no-op returning false.
    pub fn try_move(&mut self, from: Pos) -> bool {
        let empty = match self.board.find_empty() {
            Some(pos) => pos,
            None => return false,
        };
        if !self.board.apply_move(from, empty) {
            return false;
        }
        self.move_count += 1;
        self.won = self.board.has_won();
        true
    }

    /// Reset to the starting layout of the current attempt.
    pub fn restart(&mut self) {
        self.board = self.initial;
        self.move_count = 0;
        self.won = self.board.has_won();
    }

    /// Generate a fresh layout and start over.
    pub fn new_layout<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Game::new(rng);
    }
}
