//! Zero-sum elo transfer at session end.

/// Elo every player starts with for the lifetime of the process.
pub const INITIAL_ELO: i32 = 1000;
/// Largest elo gap across which an invitation is allowed, and the clamp
/// applied to the transfer delta.
pub const MAX_ELO_DIFFERENCE: i32 = 300;
/// Gap from which a downward invitation becomes declinable.
pub const HIGH_ELO_DIFFERENCE: i32 = 200;
/// Base points awarded to the winner before the delta adjustment.
pub const BASE_AWARD: i32 = 100;

/// Points the winner takes from the loser.
///
/// Computed from the elo snapshot frozen at session start, ordered by who
/// the declared winner actually is. The delta is signed: a winner who
/// started below the loser is awarded less than the base. Floor division
/// (`div_euclid`) keeps parity with the reference scoring for negative
/// deltas.
pub fn transfer(winner_elo: i32, loser_elo: i32) -> i32 {
    let delta = (winner_elo - loser_elo).min(MAX_ELO_DIFFERENCE);
    BASE_AWARD + delta.div_euclid(3)
}
