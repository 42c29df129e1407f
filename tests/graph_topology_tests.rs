use std::collections::{HashMap, HashSet};
use std::fmt;

use mcts_engine::{
    heap, ExpandHint, FrontierAction, Graph, GraphSearch, MCTSConfig, NodeId, Problem, Score, MCTS,
};
use mcts_engine::score::maximize;

// A corridor: exactly one action per ply
#[derive(Clone, Debug)]
struct Chain {
    length: usize,
    depth: usize,
}

impl Problem for Chain {
    type Action = usize;
    type Counter = f64;

    fn root(&mut self) {
        self.depth = 0;
    }

    fn expand(&mut self, _hint: ExpandHint) -> Vec<FrontierAction<usize>> {
        if self.depth == self.length {
            return Vec::new();
        }
        vec![FrontierAction::new(self.depth)]
    }

    fn select(&mut self, _action: &usize) -> bool {
        self.depth += 1;
        true
    }

    fn score(&self) -> Score<f64> {
        Score::new(1.0, maximize)
    }

    fn hash(&self) -> Option<u64> {
        Some(self.depth as u64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Item(u8);

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item{}", self.0)
    }
}

// Collect items in any order; the state is the set collected so far
#[derive(Clone, Debug)]
struct Collect {
    items: u8,
    picks: usize,
    mask: u32,
}

impl Collect {
    fn new(items: u8, picks: usize) -> Self {
        Collect { items, picks, mask: 0 }
    }
}

impl Problem for Collect {
    type Action = Item;
    type Counter = f64;

    fn root(&mut self) {
        self.mask = 0;
    }

    fn expand(&mut self, _hint: ExpandHint) -> Vec<FrontierAction<Item>> {
        if self.mask.count_ones() as usize == self.picks {
            return Vec::new();
        }
        (0..self.items)
            .filter(|i| self.mask & (1 << i) == 0)
            .map(|i| FrontierAction::new(Item(i)))
            .collect()
    }

    fn select(&mut self, action: &Item) -> bool {
        self.mask |= 1 << action.0;
        true
    }

    fn score(&self) -> Score<f64> {
        Score::new(self.mask as f64 / 8.0, maximize)
    }

    fn hash(&self) -> Option<u64> {
        Some(self.mask as u64)
    }
}

#[test]
fn test_chain_is_fully_covered() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = MCTSConfig::default()
        .with_max_speculative_expansions(0)
        .with_max_episodes(10)
        .with_seed(0);
    let mut mcts = MCTS::graph(Chain { length: 3, depth: 0 }, config);
    mcts.search().unwrap();

    let arena = mcts.arena();
    assert_eq!(arena.len(), 4);
    assert_eq!(arena.edge_count(), 3);

    // Each episode reaches one node deeper than the last until the end
    let rollouts: Vec<f64> = mcts.stat(&[0, 1, 2]).0.iter().map(|s| s.num_rollouts).collect();
    assert_eq!(rollouts, vec![10.0, 9.0, 8.0]);
    assert_eq!(mcts.get_statistics().terminal_visits, 7);
    assert_eq!(mcts.get_statistics().max_depth, 3);
}

#[test]
fn test_episode_touches_only_its_path() {
    let config = MCTSConfig::default()
        .with_max_speculative_expansions(0)
        .with_seed(3);
    let mut mcts = MCTS::graph(Collect::new(3, 3), config);
    mcts.search_for_episodes(200).unwrap();
    assert_eq!(mcts.arena().len(), 8);

    let snapshot = |mcts: &GraphSearch<Collect>| -> HashMap<(NodeId, Item), f64> {
        mcts.arena()
            .iter()
            .flat_map(|(id, node)| {
                node.edges()
                    .iter()
                    .map(move |e| ((id, *e.action()), e.num_rollouts()))
            })
            .collect()
    };

    for _ in 0..10 {
        let before = snapshot(&mcts);
        let root_before = mcts.arena().root_rollouts();
        mcts.episode().unwrap();
        let after = snapshot(&mcts);

        let path: HashSet<(NodeId, Item)> = mcts
            .forward_path()
            .steps()
            .iter()
            .map(|step| (step.node, step.action))
            .collect();
        assert_eq!(path.len(), 3);
        assert_eq!(mcts.arena().root_rollouts(), root_before + 1.0);

        assert_eq!(before.len(), after.len());
        for (key, n) in &after {
            let gained = n - before[key];
            if path.contains(key) {
                assert_eq!(gained, 1.0, "path edge {:?}", key);
            } else {
                assert_eq!(gained, 0.0, "off-path edge {:?}", key);
            }
        }
    }
}

#[test]
fn test_commuting_actions_meet_in_one_node() {
    let config = MCTSConfig::default().with_max_episodes(50).with_seed(2);
    let mut mcts = MCTS::graph(Collect::new(2, 2), config);
    mcts.search().unwrap();

    // root, {0}, {1}, {0, 1}
    assert_eq!(mcts.arena().len(), 4);
    let both = mcts.topology().lookup(0b11).expect("full set should be known");
    assert_eq!(mcts.topology().in_degrees()[&both], 2);
    assert_eq!(mcts.get_statistics().transpositions, 1);

    let via_first = mcts.stat(&[Item(0), Item(1)]);
    let via_second = mcts.stat(&[Item(1), Item(0)]);
    assert_eq!(via_first.len(), 2);
    assert_eq!(via_second.len(), 2);
}

#[test]
fn test_graph_needs_fewer_nodes_than_tree() {
    let config = MCTSConfig::default().with_max_episodes(500).with_seed(4);

    let mut tree = MCTS::tree(Collect::new(4, 3), config.clone());
    let mut graph = MCTS::graph(Collect::new(4, 3), config);
    tree.search().unwrap();
    graph.search().unwrap();

    // 1 + 4 + 6 + 4 subsets versus 1 + 4 + 12 + 24 sequences
    assert_eq!(graph.arena().len(), 15);
    assert_eq!(tree.arena().len(), 41);
    assert!(graph.arena().edge_count() < tree.arena().edge_count());
}

#[test]
fn test_heaps_stay_valid_with_shared_nodes() {
    let config = MCTSConfig::default().with_seed(6);
    let mut mcts = MCTS::graph(Collect::new(5, 4), config);

    for _ in 0..300 {
        mcts.episode().unwrap();
        for (id, node) in mcts.arena().iter() {
            assert!(heap::is_heap(node.edges()), "node {} lost its heap order", id);
        }
    }
    assert_eq!(mcts.arena().root_rollouts(), 300.0);
}

#[test]
fn test_custom_fingerprinter() {
    // Every child collapses into one node per depth
    fn by_depth(parent: u64, _action: &str) -> u64 {
        parent + 1
    }

    let problem = Chain { length: 3, depth: 0 };
    let graph: Graph<usize, f64> = Graph::with_fingerprinter(by_depth);
    let config = MCTSConfig::default()
        .with_max_speculative_expansions(0)
        .with_max_episodes(20)
        .with_seed(1);

    struct Unhashed(Chain);
    impl Problem for Unhashed {
        type Action = usize;
        type Counter = f64;
        fn root(&mut self) {
            self.0.root()
        }
        fn expand(&mut self, hint: ExpandHint) -> Vec<FrontierAction<usize>> {
            self.0.expand(hint)
        }
        fn select(&mut self, action: &usize) -> bool {
            self.0.select(action)
        }
        fn score(&self) -> Score<f64> {
            self.0.score()
        }
    }

    let mut mcts = MCTS::new(Unhashed(problem), graph, config);
    mcts.search().unwrap();
    assert_eq!(mcts.arena().len(), 4);
    assert_eq!(mcts.topology().lookup(3).map(NodeId::index), Some(3));
}
