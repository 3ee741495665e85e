//! Game session: one active match between two players.

use std::collections::HashSet;

use derive_getters::Getters;
use tracing::{debug, instrument};

use crate::board::{self, Board, Point};
use crate::shape::{self, Connectivity, MoveError, Shape};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Builds the deterministic session id for a pair of nicknames.
pub fn session_id(a: &str, b: &str) -> SessionId {
    format!("{a}-{b}")
}

/// One active match.
///
/// Owns the shared shape history, the elo snapshot frozen at creation,
/// and the turn pointer. Shape ownership is not tracked: the crossing
/// rules apply uniformly across both players' shapes.
#[derive(Debug, Clone, Getters)]
pub struct GameSession {
    /// Session id derived from the two nicknames.
    id: SessionId,
    /// Nicknames of the two participants.
    players: [String; 2],
    /// Elo of both players at creation time, same order as `players`.
    /// Never updated while the match runs; the rating transfer always
    /// uses this snapshot.
    initial_elos: [i32; 2],
    /// Every accepted shape, in placement order.
    shapes: Vec<Shape>,
    /// Board the match is played on.
    board: Board,
    /// Nickname of the player allowed to move next.
    turn: String,
}

impl GameSession {
    /// Creates a session with an empty history. `starter` indexes into
    /// `players` and names the first turn holder.
    pub fn new(
        id: SessionId,
        players: [String; 2],
        initial_elos: [i32; 2],
        starter: usize,
        board: Board,
    ) -> Self {
        let turn = players[starter].clone();
        Self {
            id,
            players,
            initial_elos,
            shapes: Vec::new(),
            board,
            turn,
        }
    }

    /// The other participant, if `nickname` is one of the two.
    pub fn opponent_of(&self, nickname: &str) -> Option<&str> {
        let [a, b] = &self.players;
        if nickname == a {
            Some(b)
        } else if nickname == b {
            Some(a)
        } else {
            None
        }
    }

    /// True if `nickname` holds the turn.
    pub fn is_turn(&self, nickname: &str) -> bool {
        self.turn == nickname
    }

    /// Validates and applies one move.
    ///
    /// Turn ownership is enforced here: the reference server trusted
    /// clients to alternate, this one rejects out-of-turn submissions.
    /// Every rejection leaves history and turn pointer untouched so the
    /// mover may retry.
    #[instrument(skip(self, points), fields(id = %self.id, mover = nickname))]
    pub fn submit(&mut self, nickname: &str, points: &[Point]) -> Result<Shape, MoveError> {
        if !self.is_turn(nickname) {
            debug!(turn = %self.turn, "submission out of turn");
            return Err(MoveError::NotYourTurn);
        }
        let next = self
            .opponent_of(nickname)
            .ok_or(MoveError::NotYourTurn)?
            .to_owned();
        let shape = shape::validate(points, &self.board, &self.shapes, Connectivity::Chained)?;
        self.shapes.push(shape.clone());
        self.turn = next;
        Ok(shape)
    }

    /// True while at least one legal shape can still be placed.
    ///
    /// Exhaustively enumerates 3-cell combinations of the remaining
    /// playable cells. The scan deliberately uses the stricter
    /// [`Connectivity::Pairwise`] rule, diverging from the live-move
    /// rule; some path-topology placements a player could still make are
    /// not considered. Cost is C(remaining, 3), bounded by the fixed
    /// board size.
    pub fn remaining_move_exists(&self) -> bool {
        let occupied: HashSet<Point> = self
            .shapes
            .iter()
            .flat_map(|s| s.points().iter().copied())
            .collect();
        let free: Vec<Point> = self
            .board
            .playable_cells()
            .filter(|p| !occupied.contains(p))
            .collect();
        for i in 0..free.len() {
            for j in (i + 1)..free.len() {
                if !board::within_reach(free[i], free[j]) {
                    continue;
                }
                for k in (j + 1)..free.len() {
                    let candidate = [free[i], free[j], free[k]];
                    if shape::validate(&candidate, &self.board, &self.shapes, Connectivity::Pairwise)
                        .is_ok()
                    {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(
            session_id("ada", "ben"),
            ["ada".to_owned(), "ben".to_owned()],
            [1000, 1000],
            0,
            Board::default(),
        )
    }

    #[test]
    fn test_session_id_is_deterministic() {
        assert_eq!(session_id("ada", "ben"), "ada-ben");
    }

    #[test]
    fn test_accepted_move_flips_turn() {
        let mut s = session();
        assert!(s.is_turn("ada"));
        s.submit("ada", &[Point(0, 0), Point(1, 1), Point(2, 0)])
            .unwrap();
        assert!(s.is_turn("ben"));
        assert_eq!(s.shapes().len(), 1);
    }

    #[test]
    fn test_out_of_turn_submission_is_rejected_without_mutation() {
        let mut s = session();
        assert_eq!(
            s.submit("ben", &[Point(0, 0), Point(1, 1), Point(2, 0)]),
            Err(MoveError::NotYourTurn)
        );
        assert!(s.is_turn("ada"));
        assert!(s.shapes().is_empty());
    }

    #[test]
    fn test_rejection_leaves_turn_with_mover() {
        let mut s = session();
        assert_eq!(
            s.submit("ada", &[Point(0, 0), Point(1, 1), Point(6, 6)]),
            Err(MoveError::InvalidSausage)
        );
        assert!(s.is_turn("ada"));
        assert!(s.shapes().is_empty());
    }

    #[test]
    fn test_cells_are_never_reused() {
        let mut s = session();
        s.submit("ada", &[Point(0, 0), Point(1, 1), Point(2, 0)])
            .unwrap();
        assert_eq!(
            s.submit("ben", &[Point(2, 0), Point(3, 1), Point(4, 0)]),
            Err(MoveError::InvalidSausage)
        );
    }

    #[test]
    fn test_fresh_board_has_remaining_moves() {
        assert!(session().remaining_move_exists());
    }

    #[test]
    fn test_exhausted_board_has_no_remaining_moves() {
        // A 3x3 board holds five playable cells; one sausage leaves two,
        // short of a trio.
        let mut s = GameSession::new(
            session_id("ada", "ben"),
            ["ada".to_owned(), "ben".to_owned()],
            [1000, 1000],
            0,
            Board::new(3, 3),
        );
        s.submit("ada", &[Point(0, 0), Point(1, 1), Point(2, 0)])
            .unwrap();
        assert!(!s.remaining_move_exists());
    }

    #[test]
    fn test_scan_ignores_path_only_placements() {
        // On a 5x1 board the only free trio is the path (0,0)-(2,0)-(4,0),
        // placeable live but invisible to the pairwise scan.
        let mut s = GameSession::new(
            session_id("ada", "ben"),
            ["ada".to_owned(), "ben".to_owned()],
            [1000, 1000],
            0,
            Board::new(5, 1),
        );
        assert!(!s.remaining_move_exists());
        assert!(
            s.submit("ada", &[Point(0, 0), Point(2, 0), Point(4, 0)])
                .is_ok()
        );
    }
}
