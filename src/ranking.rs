//! Player rankings derived from completed games.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, GameStatus};

/// Aggregate record for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    pub player: String,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub games_played: usize,
    /// wins / games_played
    pub win_ratio: f64,
}

#[derive(Default)]
struct Tally {
    wins: usize,
    losses: usize,
    draws: usize,
}

/// Recompute rankings from scratch over every won or drawn game.
///
/// Games that are still running or were cancelled are skipped, so a player
/// only shows up once they have finished at least one game. Ordered by
/// descending win ratio, then descending wins, then name.
pub fn compute_rankings<'a, I>(games: I) -> Vec<RankRecord>
where
    I: IntoIterator<Item = &'a GameState>,
{
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for game in games {
        match game.status() {
            GameStatus::Won(winner) => {
                let loser = if winner == game.player1() {
                    game.player2()
                } else {
                    game.player1()
                };
                tallies.entry(winner.as_str()).or_default().wins += 1;
                tallies.entry(loser).or_default().losses += 1;
            }
            GameStatus::Draw => {
                tallies.entry(game.player1()).or_default().draws += 1;
                tallies.entry(game.player2()).or_default().draws += 1;
            }
            GameStatus::InProgress | GameStatus::Cancelled => {}
        }
    }

    let mut records: Vec<RankRecord> = tallies
        .into_iter()
        .map(|(player, t)| {
            let games_played = t.wins + t.losses + t.draws;
            RankRecord {
                player: player.to_string(),
                wins: t.wins,
                losses: t.losses,
                draws: t.draws,
                games_played,
                win_ratio: t.wins as f64 / games_played as f64,
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.win_ratio
            .total_cmp(&a.win_ratio)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| a.player.cmp(&b.player))
    });
    records
}
