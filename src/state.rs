use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use crate::models::config::GameConfig;
use crate::models::game::GameSession;
use crate::notifier::Notifier;

/// Shared handles for the single running table. All engine operations
/// serialize on the session mutex; the notifier is the injected transport.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<GameSession>>,
    pub notifier: Arc<dyn Notifier>,
    pub rng: Arc<Mutex<StdRng>>,
    pub config: Arc<GameConfig>,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>, config: GameConfig) -> Self {
        Self::with_rng(notifier, config, StdRng::from_entropy())
    }

    /// Deterministic variant for tests: every shuffle and autonomous pick
    /// draws from the seeded generator.
    pub fn with_seed(notifier: Arc<dyn Notifier>, config: GameConfig, seed: u64) -> Self {
        Self::with_rng(notifier, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(notifier: Arc<dyn Notifier>, config: GameConfig, rng: StdRng) -> Self {
        AppState {
            session: Arc::new(Mutex::new(GameSession::new())),
            notifier,
            rng: Arc::new(Mutex::new(rng)),
            config: Arc::new(config),
        }
    }
}
