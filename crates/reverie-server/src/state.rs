//! Shared application state for the control-surface server.

use rand::rngs::StdRng;
use rand::SeedableRng;
use reverie_engine::chronicle::ChronicleRequest;
use reverie_engine::config::MechanicsConfig;
use reverie_engine::{MindContext, Oracle, OracleError, SilentOracle};
use reverie_oracle::LiveOracle;
use reverie_store::Store;
use reverie_types::{ChronicleDraft, MindDecision};
use tokio::sync::Mutex;

/// Oracle selection, dispatched by enum because async trait methods are
/// not dyn-compatible.
pub enum OracleHandle {
    /// A real LLM-backed oracle.
    Live(LiveOracle),
    /// The silent oracle, used when no API key is configured and in
    /// tests.
    Silent(SilentOracle),
}

impl Oracle for OracleHandle {
    async fn decide(&self, context: &MindContext) -> Result<Option<MindDecision>, OracleError> {
        match self {
            Self::Live(o) => o.decide(context).await,
            Self::Silent(o) => o.decide(context).await,
        }
    }

    async fn chronicle(
        &self,
        request: &ChronicleRequest,
    ) -> Result<Option<ChronicleDraft>, OracleError> {
        match self {
            Self::Live(o) => o.chronicle(request).await,
            Self::Silent(o) => o.chronicle(request).await,
        }
    }
}

/// Shared state for the Axum application, injected via `State` as an
/// `Arc<AppState>`.
pub struct AppState {
    /// The durable store.
    pub store: Store,
    /// The configured oracle.
    pub oracle: OracleHandle,
    /// Hidden mechanical parameters for the engine.
    pub mechanics: MechanicsConfig,
    /// Shared secret authorizing the run-one-turn RPC. When empty, the
    /// RPC refuses all callers.
    pub shared_secret: String,
    /// Serializes turn execution and owns the engine RNG. `try_lock`
    /// failure means a turn is already running.
    pub turn: Mutex<StdRng>,
}

impl AppState {
    /// Create application state with an OS-seeded RNG.
    pub fn new(
        store: Store,
        oracle: OracleHandle,
        mechanics: MechanicsConfig,
        shared_secret: String,
    ) -> Self {
        Self {
            store,
            oracle,
            mechanics,
            shared_secret,
            turn: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create application state with a fixed RNG seed, for
    /// deterministic tests.
    pub fn with_seed(
        store: Store,
        oracle: OracleHandle,
        mechanics: MechanicsConfig,
        shared_secret: String,
        seed: u64,
    ) -> Self {
        Self {
            store,
            oracle,
            mechanics,
            shared_secret,
            turn: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}
