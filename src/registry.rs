//! Connection registry: the authoritative owner of players and sessions.
//!
//! Every inbound protocol message is routed through [`Registry::dispatch`]
//! while the caller holds the registry lock, so no two mutating operations
//! touching the same player or session ever interleave. Outbound sends go
//! through per-connection mpsc outboxes and are fire-and-forget.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::board::{Board, Point};
use crate::lobby::{self, InviteRuling};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::rating::{self, INITIAL_ELO};
use crate::session::{self, GameSession, SessionId};

/// Identifier of one connection, assigned by the transport edge.
pub type ConnId = u64;

/// Whether a player is free for matchmaking or in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// In the lobby, available for invitations.
    Waiting,
    /// In an active session.
    Playing,
}

/// A pending invitation, held only on the invitee. A newer invite to the
/// same invitee overwrites it; invitations are never queued.
#[derive(Debug, Clone)]
pub struct Invitation {
    /// Inviter nickname.
    pub from: String,
    /// Inviter elo at invitation time.
    pub from_elo: i32,
    /// Absolute elo gap at invitation time.
    pub elo_diff: i32,
}

/// One connected player. Created on connect, destroyed on disconnect;
/// elo persists only for the lifetime of the connection.
#[derive(Debug)]
struct Player {
    nickname: String,
    elo: i32,
    status: Status,
    pending_invitation: Option<Invitation>,
    opponent: Option<ConnId>,
    session: Option<SessionId>,
    outbox: UnboundedSender<ServerMessage>,
}

impl Player {
    /// Fire-and-forget send; a closed outbox means the connection is
    /// already going away.
    fn send(&self, msg: ServerMessage) {
        let _ = self.outbox.send(msg);
    }
}

/// Owns every connected player and active session and routes all inbound
/// protocol operations to them.
#[derive(Debug)]
pub struct Registry {
    board: Board,
    players: BTreeMap<ConnId, Player>,
    sessions: HashMap<SessionId, GameSession>,
    rng: StdRng,
}

impl Registry {
    /// Creates a registry for the given board with OS randomness for the
    /// first-turn choice.
    pub fn new(board: Board) -> Self {
        Self::with_rng(board, StdRng::from_os_rng())
    }

    /// Creates a registry with an explicit random source, letting tests
    /// force deterministic first-turn outcomes.
    pub fn with_rng(board: Board, rng: StdRng) -> Self {
        Self {
            board,
            players: BTreeMap::new(),
            sessions: HashMap::new(),
            rng,
        }
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Current elo of a connection, if present.
    pub fn elo_of(&self, id: ConnId) -> Option<i32> {
        self.players.get(&id).map(|p| p.elo)
    }

    /// Routes one inbound message to its handler.
    #[instrument(skip(self, msg), fields(conn = id))]
    pub fn dispatch(&mut self, id: ConnId, msg: ClientMessage) {
        match msg {
            ClientMessage::Nickname { nickname } => self.set_nickname(id, nickname),
            ClientMessage::Invite { opponent } => self.invite(id, &opponent),
            ClientMessage::InviteResponse { accept } => self.invite_response(id, accept),
            ClientMessage::Ovals { ovals } => self.submit_ovals(id, &ovals),
            ClientMessage::GameOver { winner } => self.claim_game_over(id, &winner),
            ClientMessage::PlayerQuit => self.player_quit(id),
        }
    }

    /// Registers a freshly connected player and broadcasts the lobby.
    #[instrument(skip(self, outbox), fields(conn = id))]
    pub fn connect(&mut self, id: ConnId, outbox: UnboundedSender<ServerMessage>) {
        info!("player connected");
        self.players.insert(
            id,
            Player {
                nickname: "anonymous".to_owned(),
                elo: INITIAL_ELO,
                status: Status::Waiting,
                pending_invitation: None,
                opponent: None,
                session: None,
                outbox,
            },
        );
        self.broadcast_lobby();
    }

    /// Removes a disconnected player. A player mid-game forfeits to the
    /// opponent through the canonical session end.
    #[instrument(skip(self), fields(conn = id))]
    pub fn disconnect(&mut self, id: ConnId) {
        if let Some(player) = self.players.get(&id) {
            info!(nickname = %player.nickname, "removing player");
            if player.status == Status::Playing
                && let (Some(opponent_id), Some(session_id)) =
                    (player.opponent, player.session.clone())
                && let Some(opponent) = self.players.get(&opponent_id)
            {
                let winner = opponent.nickname.clone();
                opponent.send(ServerMessage::OpponentDisconnected);
                self.end_session(&session_id, &winner);
            }
        }
        self.players.remove(&id);
        self.broadcast_lobby();
    }

    /// Renames a player and re-broadcasts the lobby.
    #[instrument(skip(self), fields(conn = id))]
    pub fn set_nickname(&mut self, id: ConnId, nickname: String) {
        if let Some(player) = self.players.get_mut(&id) {
            info!(%nickname, "nickname set");
            player.nickname = nickname;
            self.broadcast_lobby();
        }
    }

    /// Handles an invitation attempt.
    ///
    /// Unknown or non-waiting targets fail silently. An elo gap above the
    /// maximum is reported to the inviter only; otherwise the invitation
    /// is recorded on the invitee, overwriting any pending one without
    /// notifying the superseded inviter.
    #[instrument(skip(self), fields(conn = id))]
    pub fn invite(&mut self, id: ConnId, opponent: &str) {
        let Some(from) = self.players.get(&id) else {
            return;
        };
        let (from_nick, from_elo) = (from.nickname.clone(), from.elo);
        let Some(to_id) = self.find_by_nickname(opponent) else {
            debug!(opponent, "invite target unknown");
            return;
        };
        let to = &self.players[&to_id];
        if to.status != Status::Waiting {
            debug!(opponent, "invite target not waiting");
            return;
        }
        let diff = (from_elo - to.elo).abs();
        match lobby::rule_invite(from_elo, to.elo) {
            InviteRuling::TooFar => {
                warn!(diff, "invite refused, elo gap too large");
                self.players[&id].send(ServerMessage::InviteError {
                    message: format!("ELO difference too large ({diff} > 300)"),
                });
            }
            ruling => {
                let forced = ruling == InviteRuling::Forced;
                info!(opponent, diff, forced, "invitation sent");
                if let Some(to) = self.players.get_mut(&to_id) {
                    to.pending_invitation = Some(Invitation {
                        from: from_nick.clone(),
                        from_elo,
                        elo_diff: diff,
                    });
                    to.send(ServerMessage::InviteRequest {
                        from: from_nick,
                        from_elo,
                        elo_diff: diff,
                        forced,
                    });
                }
            }
        }
    }

    /// Consumes the player's pending invitation.
    ///
    /// Accepting starts a session if the inviter is still waiting; if the
    /// inviter got matched elsewhere in the meantime the response is
    /// dropped silently. The invitation is cleared regardless of outcome.
    #[instrument(skip(self), fields(conn = id))]
    pub fn invite_response(&mut self, id: ConnId, accept: bool) {
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        let Some(invitation) = player.pending_invitation.take() else {
            return;
        };
        let invitee_nick = player.nickname.clone();
        let Some(inviter_id) = self.find_by_nickname(&invitation.from) else {
            return;
        };
        if self.players[&inviter_id].status != Status::Waiting {
            debug!(inviter = %invitation.from, "inviter no longer waiting");
            return;
        }
        if accept {
            self.start_session(id, inviter_id);
        } else {
            info!(inviter = %invitation.from, "invitation declined");
            self.players[&inviter_id].send(ServerMessage::InviteRejected {
                message: format!("{invitee_nick} declined your invitation"),
            });
        }
    }

    /// Starts a match between the accepting invitee and the inviter.
    ///
    /// Both players become Playing, are cross-linked, and the elo
    /// snapshot is frozen now. The first turn holder is drawn from the
    /// injected random source.
    fn start_session(&mut self, accepter: ConnId, inviter: ConnId) {
        let a = &self.players[&accepter];
        let b = &self.players[&inviter];
        let id = session::session_id(&a.nickname, &b.nickname);
        let nicknames = [a.nickname.clone(), b.nickname.clone()];
        let elos = [a.elo, b.elo];
        let starter = usize::from(self.rng.random_bool(0.5));
        info!(
            session = %id,
            players = ?nicknames,
            starter = %nicknames[starter],
            "session started"
        );
        self.sessions.insert(
            id.clone(),
            GameSession::new(id.clone(), nicknames.clone(), elos, starter, self.board),
        );

        let pair = [(accepter, 0usize), (inviter, 1usize)];
        for (conn, my_idx) in pair {
            let other_idx = 1 - my_idx;
            if let Some(player) = self.players.get_mut(&conn) {
                player.status = Status::Playing;
                player.opponent = Some(pair[other_idx].0);
                player.session = Some(id.clone());
                player.send(ServerMessage::StartGame {
                    opponent: nicknames[other_idx].clone(),
                    opponent_elo: elos[other_idx],
                    your_turn: my_idx == starter,
                });
            }
        }
    }

    /// Handles a sausage placement proposal.
    ///
    /// Submissions from players not in a session are ignored. Rejections
    /// go back to the submitter only and mutate nothing. An accepted move
    /// is echoed to the mover, forwarded to the opponent, flips the turn,
    /// and then triggers the endgame scan.
    #[instrument(skip(self, ovals), fields(conn = id))]
    pub fn submit_ovals(&mut self, id: ConnId, ovals: &[Point]) {
        let Some(player) = self.players.get(&id) else {
            return;
        };
        if player.status != Status::Playing {
            debug!("ovals from non-playing player ignored");
            return;
        }
        let nickname = player.nickname.clone();
        let (Some(session_id), Some(opponent_id)) = (player.session.clone(), player.opponent)
        else {
            return;
        };
        let Some(game) = self.sessions.get_mut(&session_id) else {
            return;
        };
        match game.submit(&nickname, ovals) {
            Err(error) => {
                debug!(%error, "move rejected");
                self.players[&id].send(ServerMessage::InvalidMove {
                    message: error.to_string(),
                });
            }
            Ok(shape) => {
                let placed = shape.points().to_vec();
                let shapes = game.shapes().len();
                let finished = !game.remaining_move_exists();
                info!(session = %session_id, shapes, "move accepted");
                self.players[&id].send(ServerMessage::ValidMove {
                    ovals: placed.clone(),
                });
                if let Some(opponent) = self.players.get(&opponent_id) {
                    opponent.send(ServerMessage::Ovals { ovals: placed });
                }
                self.players[&id].send(ServerMessage::TurnUpdate { your_turn: false });
                if let Some(opponent) = self.players.get(&opponent_id) {
                    opponent.send(ServerMessage::TurnUpdate { your_turn: true });
                }
                if finished {
                    info!(session = %session_id, winner = %nickname, "no moves remain");
                    self.end_session(&session_id, &nickname);
                }
            }
        }
    }

    /// Handles an explicit end-of-game claim from a playing client.
    #[instrument(skip(self), fields(conn = id))]
    pub fn claim_game_over(&mut self, id: ConnId, winner: &str) {
        let Some(player) = self.players.get(&id) else {
            return;
        };
        if player.status != Status::Playing || player.opponent.is_none() {
            return;
        }
        let Some(session_id) = player.session.clone() else {
            return;
        };
        info!(winner, "game over claimed");
        self.end_session(&session_id, winner);
    }

    /// Handles a voluntary quit: the opponent is notified and credited
    /// with the win, the quitter returns to the lobby.
    #[instrument(skip(self), fields(conn = id))]
    pub fn player_quit(&mut self, id: ConnId) {
        if let Some(player) = self.players.get(&id)
            && player.status == Status::Playing
            && let (Some(opponent_id), Some(session_id)) =
                (player.opponent, player.session.clone())
            && let Some(opponent) = self.players.get(&opponent_id)
        {
            let winner = opponent.nickname.clone();
            info!(winner = %winner, "player quit mid-game");
            opponent.send(ServerMessage::OpponentDisconnected);
            self.end_session(&session_id, &winner);
        }
        if let Some(player) = self.players.get_mut(&id) {
            player.status = Status::Waiting;
            player.opponent = None;
            player.session = None;
        }
        self.broadcast_lobby();
    }

    /// Ends a session, transferring elo from loser to winner.
    ///
    /// The sole elo-transfer path, shared by explicit claims, automatic
    /// no-moves detection and disconnect forfeits. Idempotent: a session
    /// id already removed is a no-op. A winner nickname matching neither
    /// participant credits the second player, mirroring the claim
    /// handler's lack of a participant check.
    #[instrument(skip(self))]
    pub fn end_session(&mut self, session_id: &str, winner: &str) {
        let Some(game) = self.sessions.remove(session_id) else {
            debug!(session_id, "end on unknown session ignored");
            return;
        };
        let [first, second] = game.players().clone();
        let [first_elo, second_elo] = *game.initial_elos();
        let (winner_nick, winner_elo, loser_nick, loser_elo) = if winner == first {
            (first, first_elo, second, second_elo)
        } else {
            (second, second_elo, first, first_elo)
        };
        let awarded = rating::transfer(winner_elo, loser_elo);
        info!(session_id, winner = %winner_nick, awarded, "session ended");

        for (nick, change) in [(winner_nick, awarded), (loser_nick, -awarded)] {
            if let Some(conn) = self.find_by_nickname(&nick)
                && let Some(player) = self.players.get_mut(&conn)
            {
                player.elo += change;
                player.status = Status::Waiting;
                player.opponent = None;
                player.session = None;
                let new_elo = player.elo;
                player.send(ServerMessage::EloUpdate {
                    new_elo,
                    elo_change: change,
                });
                player.send(ServerMessage::GameOver {
                    winner: winner.to_owned(),
                });
            }
        }
        self.broadcast_lobby();
    }

    /// First connection carrying `nickname`, in connection order.
    ///
    /// Nicknames are asserted unique by convention, not enforced at the
    /// protocol layer; with a collision the earliest connection wins.
    fn find_by_nickname(&self, nickname: &str) -> Option<ConnId> {
        self.players
            .iter()
            .find(|(_, p)| p.nickname == nickname)
            .map(|(id, _)| *id)
    }

    /// Sends the waiting roster (elo descending, ties in connection
    /// order) to every connected player, Playing ones included.
    fn broadcast_lobby(&self) {
        let roster = lobby::roster(
            self.players
                .values()
                .filter(|p| p.status == Status::Waiting)
                .map(|p| (p.nickname.as_str(), p.elo)),
        );
        debug!(waiting = roster.len(), "broadcasting lobby");
        for player in self.players.values() {
            player.send(ServerMessage::LobbyUpdate {
                players: roster.clone(),
            });
        }
    }
}
