#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] trellis_core::Error),
    #[error(transparent)]
    Physics(#[from] trellis_physics::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
