//! Sausage Server - authoritative multiplayer server for the sausage
//! placement board game.
//!
//! Two players take turns placing "sausages" (three connected cells) on a
//! checkerboard-parity grid. The server owns all the rules: a lobby with
//! elo-gated invitations, per-session turn enforcement and geometric move
//! validation, exhaustive endgame detection, and a zero-sum elo transfer
//! when a session concludes.
//!
//! # Architecture
//!
//! - **board / shape**: pure grid geometry and move legality
//! - **session**: one match's history, turn pointer and endgame scan
//! - **lobby / rating**: invitation gating, roster, elo transfer
//! - **registry**: the single owner of players and sessions, routing
//!   every inbound message
//! - **server**: tokio TCP edge speaking newline-delimited JSON tagged
//!   by an `action` discriminator
//!
//! All state is in-memory only; a process restart loses every player,
//! session and rating.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod board;
pub mod cli;
pub mod lobby;
pub mod protocol;
pub mod rating;
pub mod registry;
pub mod server;
pub mod session;
pub mod shape;

pub use board::{Board, Point};
pub use lobby::{InviteRuling, LobbyEntry};
pub use protocol::{ClientMessage, ServerMessage};
pub use registry::{ConnId, Invitation, Registry, Status};
pub use session::{GameSession, SessionId};
pub use shape::{Connectivity, MoveError, Shape};
