use crate::polymarket::data_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("target address is required")]
    MissingTargetAddress,

    #[error("poll interval must be greater than zero")]
    InvalidPollInterval,

    #[error(transparent)]
    Client(#[from] ClientError),
}
