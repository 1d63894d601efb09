//! Podium tallies computed from the standings + players stores. This is a
//! read-only consumer of the aggregated data, like any external view.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::stores::{PlayerStore, StandingStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRankingEntry {
    pub player_id: u64,
    pub name: Option<String>,
    pub total_top3: u32,
    pub first: u32,
    pub second: u32,
    pub third: u32,
}

impl PlayerRankingEntry {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unknown)")
    }
}

/// Tally podium finishes per resolved player. Players without a top-3
/// placement do not appear. Ordering: total podiums, then 1sts, 2nds, 3rds,
/// all descending, with player ID ascending as the final tiebreaker.
pub fn compute_player_rankings(
    standings: &StandingStore,
    players: &PlayerStore,
) -> Vec<PlayerRankingEntry> {
    let mut tallies: BTreeMap<u64, PlayerRankingEntry> = BTreeMap::new();
    for standing in standings.values() {
        let Some(player_id) = standing.player_id else {
            continue;
        };
        if !(1..=3).contains(&standing.placement) {
            continue;
        }
        let entry = tallies.entry(player_id).or_insert_with(|| PlayerRankingEntry {
            player_id,
            name: players.get(&player_id).and_then(|p| p.name.clone()),
            total_top3: 0,
            first: 0,
            second: 0,
            third: 0,
        });
        match standing.placement {
            1 => entry.first += 1,
            2 => entry.second += 1,
            _ => entry.third += 1,
        }
        entry.total_top3 += 1;
    }

    let mut rankings: Vec<PlayerRankingEntry> = tallies.into_values().collect();
    rankings.sort_by(compare_entries);
    rankings
}

fn compare_entries(a: &PlayerRankingEntry, b: &PlayerRankingEntry) -> Ordering {
    b.total_top3
        .cmp(&a.total_top3)
        .then(b.first.cmp(&a.first))
        .then(b.second.cmp(&a.second))
        .then(b.third.cmp(&a.third))
        .then(a.player_id.cmp(&b.player_id))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::stores::{PlayerRecord, StandingRecord};

    use super::compute_player_rankings;

    fn standing(id: u64, player_id: Option<u64>, placement: u32) -> (u64, StandingRecord) {
        (
            id,
            StandingRecord {
                id,
                tournament_id: 100,
                event_id: 200,
                player_id,
                placement,
            },
        )
    }

    fn player(id: u64, name: &str) -> (u64, PlayerRecord) {
        (
            id,
            PlayerRecord {
                id,
                name: Some(name.to_string()),
                standings: vec![],
            },
        )
    }

    #[test]
    fn podium_tallies_and_ordering() {
        let standings = BTreeMap::from([
            standing(300, Some(1), 1),
            standing(301, Some(2), 2),
            standing(302, Some(1), 1),
            standing(303, Some(2), 1),
            standing(304, Some(2), 3),
            standing(305, Some(3), 4),
            standing(306, None, 1),
        ]);
        let players = BTreeMap::from([player(1, "Alice"), player(2, "Bob"), player(3, "Cara")]);

        let rankings = compute_player_rankings(&standings, &players);
        assert_eq!(rankings.len(), 2, "off-podium and unresolved rows drop out");

        // Bob has three podiums to Alice's two.
        assert_eq!(rankings[0].player_id, 2);
        assert_eq!(rankings[0].total_top3, 3);
        assert_eq!(rankings[0].first, 1);
        assert_eq!(rankings[0].second, 1);
        assert_eq!(rankings[0].third, 1);

        assert_eq!(rankings[1].player_id, 1);
        assert_eq!(rankings[1].first, 2);
    }

    #[test]
    fn equal_tallies_break_by_firsts_then_id() {
        let standings = BTreeMap::from([
            standing(300, Some(1), 2),
            standing(301, Some(2), 1),
            standing(302, Some(3), 1),
        ]);
        let players = BTreeMap::new();

        let rankings = compute_player_rankings(&standings, &players);
        assert_eq!(rankings[0].player_id, 2, "a win beats a runner-up finish");
        assert_eq!(rankings[1].player_id, 3);
        assert_eq!(rankings[2].player_id, 1);
        assert_eq!(rankings[0].display_name(), "(unknown)");
    }
}
