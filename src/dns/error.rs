use thiserror::Error;

use super::RecordKind;

/// Failures surfaced by [`lookup`](super::lookup) and the domain helpers.
///
/// A query that was answered without records is not an error; see
/// [`LookupRecords`](super::LookupRecords).
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    /// The query itself failed: timeout, SERVFAIL, NXDOMAIN and the like.
    #[error("{kind} lookup failed for {domain}: {source}")]
    Lookup {
        domain: String,
        kind: RecordKind,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl DnsError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(
        domain: impl Into<String>,
        kind: RecordKind,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Lookup {
            domain: domain.into(),
            kind,
            source,
        }
    }
}
