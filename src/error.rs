use std::io;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("player {0} is already in the world")]
    DuplicatePlayer(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server runtime failed: {0}")]
    Serve(#[source] io::Error),
}
