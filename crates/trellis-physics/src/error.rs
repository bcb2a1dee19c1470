#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid engine config: {message}")]
    InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
