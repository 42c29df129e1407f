use mcts_engine::{
    heap, ExpandHint, FrontierAction, MCTSConfig, NodeId, PriorityPolicy, Problem, Score, MCTS,
};
use mcts_engine::score::maximize;

// Single-step game: pick an arm, get its payout
#[derive(Clone, Debug)]
struct Bandit {
    payouts: Vec<f64>,
    priors: Option<Vec<f64>>,
    chosen: Option<usize>,
}

impl Bandit {
    fn new(payouts: Vec<f64>) -> Self {
        Bandit {
            payouts,
            priors: None,
            chosen: None,
        }
    }

    fn with_priors(mut self, priors: Vec<f64>) -> Self {
        self.priors = Some(priors);
        self
    }
}

impl Problem for Bandit {
    type Action = usize;
    type Counter = f64;

    fn root(&mut self) {
        self.chosen = None;
    }

    fn expand(&mut self, _hint: ExpandHint) -> Vec<FrontierAction<usize>> {
        if self.chosen.is_some() {
            return Vec::new();
        }
        (0..self.payouts.len())
            .map(|i| {
                let weight = self.priors.as_ref().map_or(1.0, |p| p[i]);
                FrontierAction::new(i).with_weight(weight)
            })
            .collect()
    }

    fn select(&mut self, action: &usize) -> bool {
        self.chosen = Some(*action);
        true
    }

    fn score(&self) -> Score<f64> {
        Score::new(self.chosen.map_or(0.0, |i| self.payouts[i]), maximize)
    }
}

#[test]
fn test_every_arm_tried_before_any_repeat() {
    let _ = env_logger::builder().is_test(true).try_init();

    let payouts: Vec<f64> = (0..20).map(|i| i as f64 / 20.0).collect();
    let config = MCTSConfig::default()
        .with_max_speculative_expansions(0)
        .with_seed(3);
    let mut mcts = MCTS::tree(Bandit::new(payouts), config);

    for _ in 0..20 {
        mcts.episode().unwrap();
    }

    let root = mcts.root();
    assert_eq!(root.edges().len(), 20);
    for edge in root.edges() {
        assert_eq!(edge.num_rollouts(), 1.0, "arm {} visited unevenly", edge.action());
    }
}

#[test]
fn test_heap_order_after_every_episode() {
    let payouts: Vec<f64> = (0..12).map(|i| ((i * 7) % 12) as f64 / 12.0).collect();
    for policy in [PriorityPolicy::Uct, PriorityPolicy::Pucb] {
        let config = MCTSConfig::default().with_policy(policy).with_seed(11);
        let mut mcts = MCTS::tree(Bandit::new(payouts.clone()), config);

        for _ in 0..200 {
            mcts.episode().unwrap();
            assert!(heap::is_heap(mcts.root().edges()));

            // The heap root is the best edge
            let top = mcts.root().edges()[0].priority();
            assert!(mcts.root().edges().iter().all(|e| e.priority() >= top));
        }
    }
}

#[test]
fn test_rollouts_are_conserved() {
    let payouts = vec![0.2, 0.9, 0.4, 0.6];
    let config = MCTSConfig::default().with_max_episodes(300).with_seed(5);
    let mut mcts = MCTS::tree(Bandit::new(payouts), config);
    mcts.search().unwrap();

    let total: f64 = mcts.root().edges().iter().map(|e| e.num_rollouts()).sum();
    assert_eq!(total, 300.0);
    assert_eq!(mcts.arena().root_rollouts(), 300.0);
    assert_eq!(mcts.root().child_rollouts(), 300.0);
}

#[test]
fn test_uct_converges_on_best_arm() {
    let payouts = vec![0.1, 0.3, 0.8, 0.5, 0.2];
    let config = MCTSConfig::default()
        .with_max_episodes(2_000)
        .with_seed(21);
    let mut mcts = MCTS::tree(Bandit::new(payouts), config);

    assert_eq!(mcts.search().unwrap(), 2);
    let best = mcts.stat(&[2]);
    assert!(best.last().unwrap().num_rollouts > 1_000.0);
}

#[test]
fn test_pucb_converges_on_best_arm() {
    let payouts = vec![0.1, 0.3, 0.8, 0.5, 0.2];
    let config = MCTSConfig::default()
        .with_policy(PriorityPolicy::Pucb)
        .with_max_episodes(2_000)
        .with_seed(21);
    let mut mcts = MCTS::graph(Bandit::new(payouts), config);

    assert_eq!(mcts.search().unwrap(), 2);
}

#[test]
fn test_pucb_follows_priors() {
    // Equal payouts: only the priors separate the arms
    let payouts = vec![0.5; 4];
    let config = MCTSConfig::default()
        .with_policy(PriorityPolicy::Pucb)
        .with_max_episodes(400)
        .with_seed(2);
    let problem = Bandit::new(payouts).with_priors(vec![0.1, 0.1, 0.7, 0.1]);
    let mut mcts = MCTS::tree(problem, config);

    assert_eq!(mcts.search().unwrap(), 2);
    let edge = mcts.root().edge(&2).unwrap();
    assert!((edge.prior_weight() - 0.7).abs() < 1e-12);
}

#[test]
fn test_priorities_are_negated_policy_values() {
    let payouts = vec![0.25, 0.75];
    let config = MCTSConfig::default()
        .with_max_speculative_expansions(0)
        .with_exploration_constant(1.0)
        .with_seed(0);
    let mut mcts = MCTS::tree(Bandit::new(payouts), config);
    mcts.episode().unwrap();

    // One arm visited once: its priority is -(mean + C*sqrt(ln 1 / 1)) = -mean,
    // the other is still unvisited.
    let root = mcts.root();
    let unvisited = &root.edges()[0];
    assert_eq!(unvisited.num_rollouts(), 0.0);
    assert_eq!(unvisited.priority(), f64::NEG_INFINITY);
    let visited = &root.edges()[1];
    assert_eq!(visited.priority(), -visited.mean());
    assert_eq!(mcts.forward_path().len(), 1);
    assert_eq!(mcts.forward_path().steps()[0].node, NodeId::ROOT);
}
