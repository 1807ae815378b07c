use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by order intake. An empty selection is not an error
/// (see `Placement::NoSelection`); malformed quantities are coerced to a
/// default and never surface at all.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("order persistence failed: {0}")]
    Persistence(BoxedError),
}
