#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cannot change {0} while a simulation is running")]
    Busy(&'static str),
    #[error("config error: {0}")]
    Config(String),
}
