//! Lobby rules: invitation gating and the waiting roster.

use serde::{Deserialize, Serialize};

use crate::rating::{HIGH_ELO_DIFFERENCE, MAX_ELO_DIFFERENCE};

/// One row of the waiting roster broadcast to every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntry {
    /// Player nickname.
    pub name: String,
    /// Current elo.
    pub elo: i32,
}

/// Builds the waiting roster sorted by elo descending.
///
/// The sort is stable, so ties keep the caller's iteration order. Each
/// receiving client is responsible for excluding itself from the rendered
/// list.
pub fn roster<'a>(waiting: impl Iterator<Item = (&'a str, i32)>) -> Vec<LobbyEntry> {
    let mut entries: Vec<LobbyEntry> = waiting
        .map(|(name, elo)| LobbyEntry {
            name: name.to_owned(),
            elo,
        })
        .collect();
    entries.sort_by_key(|entry| std::cmp::Reverse(entry.elo));
    entries
}

/// How an invitation between two elos is ruled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteRuling {
    /// Gap above the maximum: no invitation, the inviter gets an error.
    TooFar,
    /// Gap in the high band with the stronger player inviting down: the
    /// invitee may decline.
    Declinable,
    /// Anything else: the invitee's client is expected to auto-accept.
    Forced,
}

/// Applies the elo gate to an invitation.
pub fn rule_invite(from_elo: i32, to_elo: i32) -> InviteRuling {
    let diff = (from_elo - to_elo).abs();
    if diff > MAX_ELO_DIFFERENCE {
        InviteRuling::TooFar
    } else if diff >= HIGH_ELO_DIFFERENCE && from_elo > to_elo {
        InviteRuling::Declinable
    } else {
        InviteRuling::Forced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_above_300_is_refused() {
        assert_eq!(rule_invite(1301, 1000), InviteRuling::TooFar);
        assert_eq!(rule_invite(1000, 1301), InviteRuling::TooFar);
    }

    #[test]
    fn test_high_band_downward_is_declinable() {
        assert_eq!(rule_invite(1250, 1000), InviteRuling::Declinable);
        assert_eq!(rule_invite(1200, 1000), InviteRuling::Declinable);
        assert_eq!(rule_invite(1300, 1000), InviteRuling::Declinable);
    }

    #[test]
    fn test_high_band_upward_is_forced() {
        assert_eq!(rule_invite(1000, 1250), InviteRuling::Forced);
    }

    #[test]
    fn test_small_gap_is_forced() {
        assert_eq!(rule_invite(1199, 1000), InviteRuling::Forced);
        assert_eq!(rule_invite(1000, 1000), InviteRuling::Forced);
    }

    #[test]
    fn test_roster_sorts_by_elo_descending() {
        let entries = roster([("ada", 1000), ("ben", 1200), ("cleo", 900)].into_iter());
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ben", "ada", "cleo"]);
    }

    #[test]
    fn test_roster_ties_keep_input_order() {
        let entries = roster([("ada", 1000), ("ben", 1000)].into_iter());
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ada", "ben"]);
    }
}
