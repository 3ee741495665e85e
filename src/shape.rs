//! Sausage shapes and move legality.
//!
//! A sausage is exactly three distinct playable cells. Legality composes
//! an adjacency rule with a non-crossing rule against every shape already
//! placed in the session. Two adjacency policies exist side by side:
//! live moves use the lenient chained rule, the endgame scan the strict
//! pairwise rule. The divergence is inherited behavior and kept as two
//! named policies rather than unified.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::board::{self, Board, Point};

/// Why a proposed move was rejected.
///
/// The display strings are the exact messages sent back to the submitter
/// in `invalid_move` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Not exactly three pairwise-distinct points.
    #[display("You must select exactly 3 different points")]
    WrongPointCount,
    /// A point is outside the board or of odd parity.
    #[display("Invalid position on the board")]
    OffBoard,
    /// The adjacency or non-crossing rule failed.
    #[display("Invalid sausage")]
    InvalidSausage,
    /// The submitter does not hold the turn.
    #[display("Not your turn")]
    NotYourTurn,
}

/// Which adjacency rule a candidate must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Live-move rule: every point must be within reach of at least one
    /// of the other two. Permits a path topology whose far ends exceed
    /// the distance bound.
    Chained,
    /// Endgame-scan rule: all three pairwise distances must be within
    /// reach.
    Pairwise,
}

/// An accepted sausage: three distinct playable cells. Immutable once
/// placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape(pub [Point; 3]);

impl Shape {
    /// The three cells of the sausage.
    pub fn points(&self) -> &[Point; 3] {
        &self.0
    }

    /// The three edges of the sausage in cyclic order.
    fn edges(&self) -> [(Point, Point); 3] {
        let [a, b, c] = self.0;
        [(a, b), (b, c), (c, a)]
    }

    /// True if the shape satisfies the given adjacency policy.
    pub fn connected(&self, policy: Connectivity) -> bool {
        let [a, b, c] = self.0;
        match policy {
            Connectivity::Chained => self.0.iter().enumerate().all(|(i, &p)| {
                self.0
                    .iter()
                    .enumerate()
                    .any(|(j, &q)| i != j && board::within_reach(p, q))
            }),
            Connectivity::Pairwise => {
                board::within_reach(a, b)
                    && board::within_reach(a, c)
                    && board::within_reach(b, c)
            }
        }
    }

    /// True if the two shapes share any cell.
    pub fn overlaps(&self, other: &Shape) -> bool {
        self.0.iter().any(|p| other.0.contains(p))
    }

    /// True if the two shapes share a cell or any pair of their edges
    /// properly intersects.
    pub fn crosses(&self, other: &Shape) -> bool {
        if self.overlaps(other) {
            return true;
        }
        self.edges().into_iter().any(|(a, b)| {
            other
                .edges()
                .into_iter()
                .any(|(c, d)| board::segments_cross(a, b, c, d))
        })
    }
}

/// Validates a candidate move against the board and the session's shape
/// history, short-circuiting at the first failure.
pub fn validate(
    points: &[Point],
    board: &Board,
    history: &[Shape],
    policy: Connectivity,
) -> Result<Shape, MoveError> {
    let [a, b, c]: [Point; 3] = points
        .try_into()
        .map_err(|_| MoveError::WrongPointCount)?;
    if a == b || a == c || b == c {
        return Err(MoveError::WrongPointCount);
    }
    for p in [a, b, c] {
        if !board.is_playable(p) {
            return Err(MoveError::OffBoard);
        }
    }
    let shape = Shape([a, b, c]);
    if !shape.connected(policy) {
        return Err(MoveError::InvalidSausage);
    }
    if history.iter().any(|placed| shape.crosses(placed)) {
        return Err(MoveError::InvalidSausage);
    }
    Ok(shape)
}
