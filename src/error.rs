use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Represents the chat node's Error.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Address parse error: {0}")]
    AddressParse(#[from] libp2p::multiaddr::Error),

    #[error("Address info error: {0}")]
    AddressInfo(&'static str),

    #[error("Connect error: {0}")]
    Connect(String),

    #[error("Stream open error: {0}")]
    StreamOpen(#[from] libp2p_stream::OpenStreamError),

    #[error("Channel Send Error: {0}")]
    ChannelSend(String),

    #[error(transparent)]
    ChannelRecv(#[from] async_channel::RecvError),
}

impl<T> From<async_channel::SendError<T>> for Error {
    fn from(error: async_channel::SendError<T>) -> Self {
        Error::ChannelSend(error.to_string())
    }
}
