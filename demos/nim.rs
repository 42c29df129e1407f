//! Nim example for the search engine
//!
//! Two engines play normal-play Nim against each other on a transposition
//! graph. Positions are fingerprinted by their piles and the player to move,
//! so every order of moves reaching the same piles shares statistics.
//!
//! Usage: `cargo run --example nim -- 3 4 5`

use std::collections::hash_map::DefaultHasher;
use std::env;
use std::fmt;
use std::hash::{Hash, Hasher};

use mcts_engine::{ExpandHint, FrontierAction, MCTSConfig, Problem, Score, MCTS};

fn main() {
    // Initialize logging
    env_logger::init();

    let mut piles: Vec<u8> = env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    if piles.is_empty() {
        piles = vec![3, 4, 5];
    }

    println!("MCTS Nim Example");
    println!("================");
    println!();

    let config = MCTSConfig::default().with_max_episodes(20_000);

    let mut to_move = 0;
    while piles.iter().any(|&p| p > 0) {
        println!("Piles: {:?}  (nim-sum {})", piles, nim_sum(&piles));

        let mut mcts = MCTS::graph(Nim::new(&piles, to_move), config.clone());
        let take = match mcts.search() {
            Ok(take) => take,
            Err(e) => {
                println!("Error: {}", e);
                return;
            }
        };

        let stat = mcts.stat(&[take]);
        println!("Player {} takes {}  [{}]", to_move + 1, take, stat);
        println!(
            "  {} nodes, {} transpositions, {:.0} episodes/s",
            mcts.arena().len(),
            mcts.get_statistics().transpositions,
            mcts.get_statistics().episodes_per_second()
        );

        piles[take.pile] -= take.count;
        to_move = 1 - to_move;
    }

    println!();
    println!("Player {} takes the last object and wins!", 2 - to_move);
}

fn nim_sum(piles: &[u8]) -> u8 {
    piles.iter().fold(0, |acc, p| acc ^ p)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Take {
    pile: usize,
    count: u8,
}

impl fmt::Display for Take {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from pile {}", self.count, self.pile)
    }
}

fn first_player(counter: &[f64; 2]) -> f64 {
    counter[0]
}

fn second_player(counter: &[f64; 2]) -> f64 {
    counter[1]
}

/// Search cursor: wins are counted per player
struct Nim {
    start: Vec<u8>,
    start_to_move: usize,
    piles: Vec<u8>,
    to_move: usize,
}

impl Nim {
    fn new(piles: &[u8], to_move: usize) -> Self {
        Nim {
            start: piles.to_vec(),
            start_to_move: to_move,
            piles: piles.to_vec(),
            to_move,
        }
    }
}

impl Problem for Nim {
    type Action = Take;
    type Counter = [f64; 2];

    fn root(&mut self) {
        self.piles.clone_from(&self.start);
        self.to_move = self.start_to_move;
    }

    fn expand(&mut self, _hint: ExpandHint) -> Vec<FrontierAction<Take>> {
        self.piles
            .iter()
            .enumerate()
            .flat_map(|(pile, &size)| (1..=size).map(move |count| Take { pile, count }))
            .map(FrontierAction::new)
            .collect()
    }

    fn select(&mut self, take: &Take) -> bool {
        match self.piles.get_mut(take.pile) {
            Some(size) if *size >= take.count => {
                *size -= take.count;
                self.to_move = 1 - self.to_move;
                true
            }
            _ => false,
        }
    }

    fn score(&self) -> Score<[f64; 2]> {
        let mut counter = [0.5, 0.5];
        if self.piles.iter().all(|&p| p == 0) {
            counter = [0.0, 0.0];
            counter[1 - self.to_move] = 1.0;
        }
        let objective = if self.to_move == 0 {
            first_player
        } else {
            second_player
        };
        Score::new(counter, objective)
    }

    fn hash(&self) -> Option<u64> {
        let mut hasher = DefaultHasher::new();
        self.piles.hash(&mut hasher);
        self.to_move.hash(&mut hasher);
        Some(hasher.finish())
    }
}
