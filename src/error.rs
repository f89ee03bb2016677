/*
Centralized error kinds (spec §7). Call sites construct these at the
point of failure and propagate them as `anyhow::Error` via `?` or
`bail!`, same as the rest of the engine.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("format error: {0}")]
    Format(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sql error: {0}")]
    Sql(String),
    #[error("semantic error: {0}")]
    Semantic(String),
}
