use thiserror::Error;

use crate::dns::DnsError;

use super::AddressFamily;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("recipient '{recipient}' has no domain part")]
    MissingDomain { recipient: String },
    #[error("server must be given as @host, got '{server}'")]
    InvalidServer { server: String },
    #[error("server {server} is not an {family} address")]
    FamilyMismatch {
        server: String,
        family: AddressFamily,
    },
    #[error("invalid recipient domain: {0}")]
    Domain(#[source] DnsError),
    #[error("failed to resolve {domain}: {source}")]
    MxLookup {
        domain: String,
        #[source]
        source: DnsError,
    },
}

impl SelectError {
    /// Usage problems that are reported before any network activity.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::MxLookup { .. })
    }
}
