use thiserror::Error;

pub type ViewResult<T> = Result<T, ViewError>;

#[derive(Debug, Error)]
pub enum ViewError {
    /// A component adopted resize awareness without supplying its reaction hook.
    ///
    /// Programmer error. Never retried.
    #[error("contract violation: component `{component}` must provide `{hook}`")]
    ContractViolation {
        component: &'static str,
        hook: &'static str,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("render error [{component}]: {source}")]
    Render {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("platform error: {0}")]
    Platform(String),
}

impl ViewError {
    #[inline]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ViewError::ContractViolation { .. })
    }
}
