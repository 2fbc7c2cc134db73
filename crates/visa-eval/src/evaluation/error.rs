use crate::catalog::ApplicationMode;

/// Failure raised while scoring; the orchestrator turns it into `EVALUATION_FAILED`.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("scoring weight `{component}` is not configured for {mode} applications")]
    MissingWeight {
        mode: ApplicationMode,
        component: &'static str,
    },
    #[error("no scoring strategy is registered for {0} applications")]
    StrategyUnavailable(ApplicationMode),
    #[error("strategy `{strategy}` failed: {message}")]
    Strategy {
        strategy: &'static str,
        message: String,
    },
}

/// Raised when a specialized strategy cannot be built from the catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyInitError {
    #[error("no mode configuration is loaded for {0} applications")]
    MissingModeConfig(ApplicationMode),
    #[error("scoring weight `{component}` is not configured for {mode} applications")]
    MissingWeight {
        mode: ApplicationMode,
        component: &'static str,
    },
}
