//! DNS lookups for MX, A and AAAA records.
//!
//! [`lookup`] is the entry point used by the address selector. It queries a
//! [`LookupRecords`] implementation, keeps the records of the requested kind
//! and returns their values ordered by preference (ascending), then
//! alphabetically inside one preference group.

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{LookupRecords, SystemResolver, lookup, normalize_domain, order_records};
pub use types::{DnsRecord, RecordKind};
