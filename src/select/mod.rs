//! Endpoint selection: turns a recipient (and an optional `@server`) into the
//! ordered list of hosts the probe loop will try.
//!
//! The policy is the classic MX-with-implicit-A/AAAA fallback, with two
//! deliberate quirks: a failing MX query is fatal for the target, while an
//! exchange whose address lookups all fail is kept by name so that the
//! connect step can still try it.

mod error;
mod types;

pub use error::SelectError;
pub use types::AddressFamily;

use std::net::IpAddr;

use tracing::debug;

use crate::dns::{self, LookupRecords, RecordKind};

/// Build the endpoint list for `recipient`, or for `server` when one is given.
pub fn select_endpoints<R>(
    resolver: &R,
    recipient: &str,
    server: Option<&str>,
    family: AddressFamily,
) -> Result<Vec<String>, SelectError>
where
    R: LookupRecords + ?Sized,
{
    match server {
        Some(server) => select_for_server(resolver, server, family),
        None => {
            let domain = recipient_domain(recipient)?;
            select_for_domain(resolver, &domain, family)
        }
    }
}

/// Domain part of `recipient` (after the last `@`), IDNA-normalised.
pub fn recipient_domain(recipient: &str) -> Result<String, SelectError> {
    let domain = match recipient.rsplit_once('@') {
        Some((_, domain)) if !domain.trim().is_empty() => domain,
        _ => {
            return Err(SelectError::MissingDomain {
                recipient: recipient.to_string(),
            });
        }
    };
    dns::normalize_domain(domain).map_err(SelectError::Domain)
}

/// Validate the `@host` positional form and return `host`.
pub fn parse_server_arg(arg: &str) -> Result<&str, SelectError> {
    match arg.strip_prefix('@') {
        Some(host) if !host.trim().is_empty() => Ok(host.trim()),
        _ => Err(SelectError::InvalidServer {
            server: arg.to_string(),
        }),
    }
}

fn parse_literal(server: &str) -> Option<IpAddr> {
    let unbracketed = server
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(server);
    unbracketed.parse().ok()
}

fn select_for_server<R>(
    resolver: &R,
    server: &str,
    family: AddressFamily,
) -> Result<Vec<String>, SelectError>
where
    R: LookupRecords + ?Sized,
{
    if let Some(ip) = parse_literal(server) {
        if !family.allows(&ip) {
            return Err(SelectError::FamilyMismatch {
                server: server.to_string(),
                family,
            });
        }
        return Ok(vec![ip.to_string()]);
    }

    let (mut endpoints, _) = resolve_addresses(resolver, server, family);
    if endpoints.is_empty() {
        debug!(server, "no addresses resolved, connecting by name");
        endpoints.push(server.to_string());
    }
    Ok(endpoints)
}

fn select_for_domain<R>(
    resolver: &R,
    domain: &str,
    family: AddressFamily,
) -> Result<Vec<String>, SelectError>
where
    R: LookupRecords + ?Sized,
{
    let exchanges = dns::lookup(resolver, domain, RecordKind::Mx).map_err(|source| {
        SelectError::MxLookup {
            domain: domain.to_string(),
            source,
        }
    })?;

    if exchanges.is_empty() {
        debug!(domain, "no MX records, falling back on A/AAAA");
        let (endpoints, _) = resolve_addresses(resolver, domain, family);
        return Ok(endpoints);
    }

    let mut endpoints = Vec::new();
    for exchange in &exchanges {
        let (addresses, any_ok) = resolve_addresses(resolver, exchange, family);
        endpoints.extend(addresses);
        if !any_ok {
            debug!(exchange = %exchange, "could not resolve exchange, keeping it by name");
            endpoints.push(exchange.clone());
        }
    }
    Ok(endpoints)
}

/// A then AAAA lookups for `name`, restricted to `family`. The flag reports
/// whether at least one attempted lookup succeeded (possibly with no data).
fn resolve_addresses<R>(resolver: &R, name: &str, family: AddressFamily) -> (Vec<String>, bool)
where
    R: LookupRecords + ?Sized,
{
    let mut addresses = Vec::new();
    let mut any_ok = false;
    for kind in family.record_kinds() {
        match dns::lookup(resolver, name, *kind) {
            Ok(values) => {
                any_ok = true;
                addresses.extend(values);
            }
            Err(err) => debug!(host = name, %kind, error = %err, "address lookup failed"),
        }
    }
    (addresses, any_ok)
}
