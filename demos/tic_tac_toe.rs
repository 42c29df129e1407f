//! Tic-Tac-Toe example for the search engine
//!
//! Play X against the engine. Each engine move is a fresh tree search from
//! the current position.

use std::fmt;
use std::io::{self, Write};

use mcts_engine::{ExpandHint, FrontierAction, MCTSConfig, Problem, Score, MCTS};

fn main() {
    // Initialize logging
    env_logger::init();

    println!("MCTS Tic-Tac-Toe Example");
    println!("========================");
    println!();

    // Set up a new game
    let mut board = Board::default();

    // Create search configuration
    let config = MCTSConfig::default()
        .with_exploration_constant(1.414)
        .with_max_episodes(10_000);

    // Main game loop
    while !board.is_over() {
        // Display the board
        println!("{}", board);

        if board.to_move == Mark::X {
            // Human player (X)
            print!("Your move (enter row column, e.g. '1 2'): ");
            if io::stdout().flush().is_err() {
                return;
            }

            let mut input = String::new();
            match io::stdin().read_line(&mut input) {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }

            let coords: Vec<usize> = input
                .split_whitespace()
                .filter_map(|s| s.parse::<usize>().ok())
                .collect();

            if coords.len() != 2 || coords[0] > 2 || coords[1] > 2 {
                println!("Invalid move! Enter row and column (0-2).");
                continue;
            }

            if !board.play(coords[0] * 3 + coords[1]) {
                println!("Illegal move! Try again.");
            }
        } else {
            // Engine player (O)
            println!("Engine is thinking...");

            let mut mcts = MCTS::tree(TicTacToe::new(board), config.clone());
            match mcts.search() {
                Ok(cell) => {
                    println!("Engine chooses: row {}, col {}", cell / 3, cell % 3);
                    board.play(cell);

                    println!("Chosen edge: {}", mcts.stat(&[cell]));
                    println!("{}", mcts.get_statistics().summary());
                }
                Err(e) => {
                    println!("Error: {}", e);
                    break;
                }
            }
        }
    }

    // Show final state
    println!("{}", board);
    match board.winner() {
        Some(Mark::X) => println!("You win!"),
        Some(Mark::O) => println!("The engine wins!"),
        None => println!("It's a draw!"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    X,
    O,
}

impl Mark {
    fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Board {
    cells: [Option<Mark>; 9],
    to_move: Mark,
}

impl Default for Board {
    fn default() -> Self {
        Board {
            cells: [None; 9],
            to_move: Mark::X,
        }
    }
}

impl Board {
    const LINES: [[usize; 3]; 8] = [
        [0, 1, 2],
        [3, 4, 5],
        [6, 7, 8],
        [0, 3, 6],
        [1, 4, 7],
        [2, 5, 8],
        [0, 4, 8],
        [2, 4, 6],
    ];

    fn winner(&self) -> Option<Mark> {
        Self::LINES.iter().find_map(|&[a, b, c]| match self.cells[a] {
            Some(mark) if self.cells[b] == Some(mark) && self.cells[c] == Some(mark) => Some(mark),
            _ => None,
        })
    }

    fn is_over(&self) -> bool {
        self.winner().is_some() || self.cells.iter().all(Option::is_some)
    }

    fn play(&mut self, cell: usize) -> bool {
        if cell >= 9 || self.cells[cell].is_some() || self.is_over() {
            return false;
        }
        self.cells[cell] = Some(self.to_move);
        self.to_move = self.to_move.other();
        true
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  0 1 2")?;
        for row in 0..3 {
            write!(f, "{} ", row)?;
            for col in 0..3 {
                let symbol = match self.cells[row * 3 + col] {
                    Some(Mark::X) => 'X',
                    Some(Mark::O) => 'O',
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn x_score(counter: &[f64; 2]) -> f64 {
    counter[0]
}

fn o_score(counter: &[f64; 2]) -> f64 {
    counter[1]
}

/// Search cursor over a board: `[X result, O result]`, draws worth half
struct TicTacToe {
    start: Board,
    board: Board,
}

impl TicTacToe {
    fn new(start: Board) -> Self {
        TicTacToe { start, board: start }
    }
}

impl Problem for TicTacToe {
    type Action = usize;
    type Counter = [f64; 2];

    fn root(&mut self) {
        self.board = self.start;
    }

    fn expand(&mut self, _hint: ExpandHint) -> Vec<FrontierAction<usize>> {
        if self.board.is_over() {
            return Vec::new();
        }
        (0..9)
            .filter(|&cell| self.board.cells[cell].is_none())
            .map(FrontierAction::new)
            .collect()
    }

    fn select(&mut self, cell: &usize) -> bool {
        self.board.play(*cell)
    }

    fn score(&self) -> Score<[f64; 2]> {
        let counter = match self.board.winner() {
            Some(Mark::X) => [1.0, 0.0],
            Some(Mark::O) => [0.0, 1.0],
            None => [0.5, 0.5],
        };
        let objective = match self.board.to_move {
            Mark::X => x_score,
            Mark::O => o_score,
        };
        Score::new(counter, objective)
    }
}
