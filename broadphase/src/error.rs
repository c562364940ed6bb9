use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BroadphaseError {
    InvalidCellDimension { dim: f32 },
    InvalidCellCount { count: usize },
}

pub type BroadphaseResult<T> = Result<T, BroadphaseError>;

impl fmt::Display for BroadphaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadphaseError::InvalidCellDimension { dim } => {
                write!(
                    f,
                    "grid cell dimension must be finite and positive (dim: {})",
                    dim
                )
            }
            BroadphaseError::InvalidCellCount { count } => {
                write!(
                    f,
                    "grid cell count must be greater than zero (count: {})",
                    count
                )
            }
        }
    }
}

impl std::error::Error for BroadphaseError {}
