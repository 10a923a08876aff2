use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use smtpping::{AddressFamily, PingOptions, parse_server_arg};

#[derive(Parser, Debug)]
#[command(
    name = "smtpping",
    version,
    about = "Measure SMTP round-trip latency, phase by phase",
    after_help = "If no @server is given, the recipient domain's MX records are used, \
                  falling back on its A/AAAA records."
)]
pub struct Cli {
    /// recipient address
    pub recipient: String,

    /// explicit server as @host, @ipv4 or @[ipv6]
    pub server: Option<String>,

    /// TCP port
    #[arg(short, long, default_value_t = 25)]
    pub port: u16,

    /// pause between pings (ms)
    #[arg(short, long, default_value_t = 1000)]
    pub wait: u64,

    /// number of pings, 0 = until interrupted
    #[arg(short, long, default_value_t = 0)]
    pub count: u32,

    /// generated message size (KiB)
    #[arg(short, long, default_value_t = 10)]
    pub size: usize,

    /// send this file as the message instead of a generated one
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// HELO name
    #[arg(short = 'H', long, default_value = "example.org")]
    pub helo: String,

    /// envelope sender, empty for the null sender
    #[arg(short = 'S', long, default_value = "")]
    pub sender: String,

    /// number of independent workers
    #[arg(short = 'P', long, default_value_t = 1)]
    pub parallel: usize,

    /// print delivered messages per second
    #[arg(short, long)]
    pub rate: bool,

    /// only print the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// verbose logging on stderr
    #[arg(short, long)]
    pub debug: bool,

    /// IPv4 only
    #[arg(short = '4')]
    pub ipv4: bool,

    /// IPv6 only
    #[arg(short = '6')]
    pub ipv6: bool,

    /// local address to bind before connecting
    #[arg(short, long)]
    pub bind: Option<IpAddr>,

    /// connect/read/write timeout (ms), 0 = none
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,

    /// query this nameserver instead of the system ones (repeatable)
    #[arg(long = "nameserver")]
    pub nameservers: Vec<IpAddr>,

    /// summary format: human|json
    #[arg(long, default_value = "human")]
    pub format: String,

    /// write one CSV row per successful ping (feature `with-csv`)
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    #[cfg(feature = "with-serde")]
    Json,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Reject contradictory flags before anything touches the network.
    pub fn validate(&self) -> Result<()> {
        let family = self.family()?;
        if self.parallel == 0 {
            bail!("--parallel must be at least 1");
        }
        self.server()?;
        if let Some(bind) = self.bind {
            if !family.allows(&bind) {
                bail!("bind address {bind} does not match the {family} restriction");
            }
        }
        self.format()?;
        #[cfg(not(feature = "with-csv"))]
        if self.csv.is_some() {
            bail!("--csv requires the 'with-csv' feature");
        }
        if self.csv.is_some() && self.parallel > 1 {
            bail!("--csv is only available with a single worker");
        }
        Ok(())
    }

    pub fn family(&self) -> Result<AddressFamily> {
        match (self.ipv4, self.ipv6) {
            (true, true) => bail!("-4 and -6 are mutually exclusive"),
            (true, false) => Ok(AddressFamily::V4),
            (false, true) => Ok(AddressFamily::V6),
            (false, false) => Ok(AddressFamily::Any),
        }
    }

    pub fn server(&self) -> Result<Option<&str>> {
        match &self.server {
            Some(arg) => Ok(Some(parse_server_arg(arg)?)),
            None => Ok(None),
        }
    }

    pub fn format(&self) -> Result<Format> {
        match self.format.as_str() {
            "human" => Ok(Format::Human),
            #[cfg(feature = "with-serde")]
            "json" => Ok(Format::Json),
            #[cfg(not(feature = "with-serde"))]
            "json" => bail!("--format json requires the 'with-serde' feature"),
            other => bail!("unknown --format '{other}', use: human|json"),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_millis(self.timeout))
    }

    pub fn ping_options(&self) -> Result<PingOptions> {
        Ok(PingOptions {
            port: self.port,
            count: self.count,
            wait: Duration::from_millis(self.wait),
            family: self.family()?,
        })
    }
}
