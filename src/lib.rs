// Library exports for steady-emotion - emotion label smoothing and session accounting

pub mod config;
pub mod error;
pub mod feedback;
pub mod models;
pub mod report;
pub mod session;
pub mod source;
pub mod stabilizer;
pub mod window;

pub use error::{Result, SteadyEmotionError};
pub use models::{LabelFrame, Observation};
pub use report::SessionReport;
pub use stabilizer::{EmotionStabilizer, StabilizerConfig};
