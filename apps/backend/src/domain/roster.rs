use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One participating AI model. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelIdentity {
    pub id: String,
    pub display_name: String,
}

impl ModelIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// The configured pool of models a bout draws from.
#[derive(Debug, Clone)]
pub struct Roster {
    models: Vec<ModelIdentity>,
}

impl Roster {
    /// A bout needs a prompter, two contestants and at least one judge.
    pub const MIN_MODELS: usize = 3;

    pub fn new(models: Vec<ModelIdentity>) -> Result<Self, AppError> {
        if models.len() < Self::MIN_MODELS {
            return Err(AppError::config(format!(
                "roster needs at least {} models, got {}",
                Self::MIN_MODELS,
                models.len()
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for model in &models {
            if !seen.insert(model.id.as_str()) {
                return Err(AppError::config(format!(
                    "duplicate model id in roster: {}",
                    model.id
                )));
            }
        }
        Ok(Self { models })
    }

    /// Parse the `BOUT_MODELS` env format: comma-separated `id=Display Name`
    /// entries; a bare `id` doubles as its own display name.
    pub fn parse(spec: &str) -> Result<Self, AppError> {
        let models = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((id, name)) => ModelIdentity::new(id.trim(), name.trim()),
                None => ModelIdentity::new(entry, entry),
            })
            .collect();
        Self::new(models)
    }

    pub fn models(&self) -> &[ModelIdentity] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Role assignment for one round: who prompts, who competes, who judges.
///
/// Judges are every roster model not currently contesting; the prompter
/// judges too unless it is also a contestant (it never is under the built-in
/// policies).
#[derive(Debug, Clone)]
pub struct Casting {
    pub prompter: ModelIdentity,
    pub contestants: [ModelIdentity; 2],
    pub judges: Vec<ModelIdentity>,
}

/// How prompter and contestants are chosen each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastingPolicy {
    /// Deterministic walk of the roster keyed on the round number. With at
    /// least three models the contestant pair always differs from the
    /// previous round's pair.
    Rotation,
    /// Uniformly random distinct prompter and contestants.
    Random,
}

impl CastingPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rotation" => Some(Self::Rotation),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    pub fn cast(&self, roster: &Roster, round_no: u64) -> Casting {
        let models = roster.models();
        let n = models.len();
        let (p, a, b) = match self {
            CastingPolicy::Rotation => {
                let p = ((round_no - 1) % n as u64) as usize;
                (p, (p + 1) % n, (p + 2) % n)
            }
            CastingPolicy::Random => {
                let mut rng = rand::rng();
                let picks = sample(&mut rng, n, 3);
                (picks.index(0), picks.index(1), picks.index(2))
            }
        };

        let contestants = [models[a].clone(), models[b].clone()];
        let judges = models
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != a && *i != b)
            .map(|(_, m)| m.clone())
            .collect();

        Casting {
            prompter: models[p].clone(),
            contestants,
            judges,
        }
    }
}
