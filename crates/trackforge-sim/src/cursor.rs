//! Chain cursor over the simulated world
//!
//! Pieces are linked purely by geometry: a piece follows another when its
//! origin equals the other's exit. Ghosts are part of the chain.

use trackforge_core::{Location, PieceType, ThreadSafeRw, TrackCursor};

use crate::world::{SimPiece, SimState};

pub struct SimCursor {
    state: ThreadSafeRw<SimState>,
    current: SimPiece,
}

impl SimCursor {
    pub(crate) fn new(state: ThreadSafeRw<SimState>, current: SimPiece) -> Self {
        Self { state, current }
    }

    fn following(&self) -> Option<SimPiece> {
        self.state
            .read()
            .piece_starting_at(self.current.structure_id, self.current.exit())
            .cloned()
    }

    fn preceding(&self) -> Option<SimPiece> {
        self.state
            .read()
            .piece_ending_at(self.current.structure_id, self.current.origin)
            .cloned()
    }
}

impl TrackCursor for SimCursor {
    fn position(&self) -> Location {
        self.current.origin
    }

    fn piece(&self) -> PieceType {
        self.current.piece_type
    }

    fn next_position(&self) -> Option<Location> {
        Some(self.current.exit())
    }

    fn previous_position(&self) -> Option<Location> {
        self.preceding().map(|piece| piece.origin)
    }

    fn next(&mut self) -> bool {
        match self.following() {
            Some(piece) => {
                self.current = piece;
                true
            }
            None => false,
        }
    }

    fn previous(&mut self) -> bool {
        match self.preceding() {
            Some(piece) => {
                self.current = piece;
                true
            }
            None => false,
        }
    }
}
