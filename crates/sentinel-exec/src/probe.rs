use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Source of the periodic "did the Main Agent connection drop" decision.
pub trait ConnectionProbe {
    fn connection_lost(&mut self) -> bool;
}

#[derive(Debug, Clone)]
pub struct RandomProbe {
    rng: StdRng,
    probability: f64,
}

impl RandomProbe {
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl ConnectionProbe for RandomProbe {
    fn connection_lost(&mut self) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Replays fixed outcomes, then reports a healthy connection forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProbe {
    outcomes: VecDeque<bool>,
}

impl ScriptedProbe {
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
        }
    }

    pub fn stable() -> Self {
        Self::default()
    }
}

impl ConnectionProbe for ScriptedProbe {
    fn connection_lost(&mut self) -> bool {
        self.outcomes.pop_front().unwrap_or(false)
    }
}
