use std::collections::BTreeMap;
use std::net::IpAddr;

use trust_dns_resolver::{
    Resolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::ResolveErrorKind,
    proto::op::ResponseCode,
};

use super::{DnsError, DnsRecord, RecordKind};

/// Capability every resolver backend exposes: answer records for one query.
///
/// Implementations return `Ok(vec![])` when the query succeeded but carried no
/// data for the requested type, and an error when the query itself failed.
pub trait LookupRecords {
    fn lookup_records(&self, domain: &str, kind: RecordKind) -> Result<Vec<DnsRecord>, DnsError>;
}

/// Query `domain` for `kind` and return the ordered record values.
pub fn lookup<R>(resolver: &R, domain: &str, kind: RecordKind) -> Result<Vec<String>, DnsError>
where
    R: LookupRecords + ?Sized,
{
    let records = resolver.lookup_records(domain, kind)?;
    Ok(order_records(
        records.into_iter().filter(|record| record.kind == kind),
    ))
}

/// Group values by preference, sort each group, then concatenate the groups
/// by ascending preference.
pub fn order_records<I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = DnsRecord>,
{
    let mut groups: BTreeMap<u16, Vec<String>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.preference)
            .or_default()
            .push(record.value);
    }

    let mut ordered = Vec::new();
    for (_, mut values) in groups {
        values.sort();
        ordered.extend(values);
    }
    ordered
}

/// Trim `domain` and convert it to its ASCII (punycode) form.
pub fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(DnsError::idna)
}

// Exchange names come back fully qualified; compare them without the root dot.
pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// [`LookupRecords`] backed by the synchronous trust-dns resolver.
///
/// Each instance owns its own resolver context, so workers never share
/// resolver state.
pub struct SystemResolver {
    inner: Resolver,
}

impl SystemResolver {
    /// Use the platform configuration (`/etc/resolv.conf` on Unix, the
    /// registry on Windows).
    pub fn from_system_conf() -> Result<Self, DnsError> {
        let inner = Resolver::from_system_conf().map_err(DnsError::resolver_init)?;
        Ok(Self { inner })
    }

    /// Query the given nameservers over UDP/TCP port 53 instead of the
    /// platform configuration.
    pub fn with_nameservers(nameservers: &[IpAddr]) -> Result<Self, DnsError> {
        if nameservers.is_empty() {
            return Self::from_system_conf();
        }
        let group = NameServerConfigGroup::from_ips_clear(nameservers, 53, true);
        let config = ResolverConfig::from_parts(None, Vec::new(), group);
        let inner =
            Resolver::new(config, ResolverOpts::default()).map_err(DnsError::resolver_init)?;
        Ok(Self { inner })
    }
}

impl LookupRecords for SystemResolver {
    fn lookup_records(&self, domain: &str, kind: RecordKind) -> Result<Vec<DnsRecord>, DnsError> {
        let answer = match self.inner.lookup(domain, kind.record_type()) {
            Ok(answer) => answer,
            Err(err) => {
                if is_no_data(err.kind()) {
                    return Ok(Vec::new());
                }
                return Err(DnsError::lookup(domain, kind, err));
            }
        };

        let records = answer
            .record_iter()
            .filter(|record| record.record_type() == kind.record_type())
            .filter_map(|record| record.data())
            .filter_map(DnsRecord::from_rdata)
            .collect();
        Ok(records)
    }
}

/// Whether a failed lookup is really an answered query with nothing in it.
///
/// The resolver folds every non-answer response (NXDOMAIN, SERVFAIL, REFUSED,
/// ...) into `NoRecordsFound`; only a `NOERROR` response means the name
/// exists without data of this type.
pub(super) fn is_no_data(kind: &ResolveErrorKind) -> bool {
    match kind {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            answered_without_data(*response_code)
        }
        _ => false,
    }
}

pub(super) fn answered_without_data(code: ResponseCode) -> bool {
    code == ResponseCode::NoError
}
