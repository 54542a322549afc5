/// Core error type for the bot.
///
/// Adapter crates map their transport errors into `External` so handlers can
/// log and drop them uniformly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("routing error: {0}")]
    Routing(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
