//! Wire protocol: JSON messages tagged by an `action` discriminator.
//!
//! The transport delivers one JSON object per line. Field names and
//! action tags are part of the protocol surface the presentation client
//! depends on, so they are pinned by tests.

use serde::{Deserialize, Serialize};

use crate::board::Point;
use crate::lobby::LobbyEntry;

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Set or change the player's nickname.
    Nickname {
        /// The new nickname.
        nickname: String,
    },
    /// Invite another player by nickname.
    Invite {
        /// Nickname of the invitee.
        opponent: String,
    },
    /// Answer a pending invitation.
    InviteResponse {
        /// True to accept, false to decline.
        accept: bool,
    },
    /// Propose a sausage placement.
    Ovals {
        /// Exactly three `(col, row)` pairs.
        ovals: Vec<Point>,
    },
    /// Claim that the game is over.
    GameOver {
        /// Nickname of the claimed winner.
        winner: String,
    },
    /// Leave the current game.
    PlayerQuit,
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full waiting roster, elo descending.
    LobbyUpdate {
        /// Waiting players.
        players: Vec<LobbyEntry>,
    },
    /// An invitation arrived for this player.
    InviteRequest {
        /// Inviter nickname.
        from: String,
        /// Inviter elo.
        from_elo: i32,
        /// Absolute elo gap.
        elo_diff: i32,
        /// True if the client must auto-accept.
        forced: bool,
    },
    /// The invitation could not be made.
    InviteError {
        /// Human-readable reason.
        message: String,
    },
    /// The invitee declined.
    InviteRejected {
        /// Human-readable notice.
        message: String,
    },
    /// A match begins.
    StartGame {
        /// Opponent nickname.
        opponent: String,
        /// Opponent elo.
        opponent_elo: i32,
        /// True if this player holds the first turn.
        your_turn: bool,
    },
    /// The opponent placed a sausage.
    Ovals {
        /// The accepted placement.
        ovals: Vec<Point>,
    },
    /// Turn pointer changed.
    TurnUpdate {
        /// True if this player may move now.
        your_turn: bool,
    },
    /// This player's placement was accepted.
    ValidMove {
        /// The accepted placement, echoed back.
        ovals: Vec<Point>,
    },
    /// This player's placement was rejected.
    InvalidMove {
        /// Rejection reason.
        message: String,
    },
    /// New elo after a concluded session.
    EloUpdate {
        /// Elo after the transfer.
        new_elo: i32,
        /// Signed change applied.
        elo_change: i32,
    },
    /// The session ended.
    GameOver {
        /// Winner nickname.
        winner: String,
    },
    /// The opponent's connection went away.
    OpponentDisconnected,
}
