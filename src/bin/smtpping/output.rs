use anyhow::Result;
use smtpping::{Phase, PingSummary};

use crate::args::Format;

pub fn header(recipient: &str, endpoint: &str, port: u16, data_size: usize) -> String {
    let host = endpoint.trim_start_matches('[').trim_end_matches(']');
    format!("PING {recipient} ([{host}]:{port}): {data_size} bytes (SMTP DATA)")
}

pub fn attempt_line<I>(seq: u32, phases: I) -> String
where
    I: IntoIterator<Item = (Phase, f64)>,
{
    let mut line = format!("seq={seq}");
    for (phase, millis) in phases {
        line.push_str(&format!(", {phase}={millis:.2} ms"));
    }
    line
}

pub fn rate_line(delivered: u64) -> String {
    format!("rate: {delivered} e-mail messages/s")
}

pub fn summary_text(summary: &PingSummary) -> String {
    let endpoint = match &summary.pinned {
        Some(endpoint) if summary.sent_any() => endpoint,
        _ => return "--- no pings were sent ---".to_string(),
    };

    let mut lines = vec![
        format!("--- {endpoint} SMTP ping statistics ---"),
        format!("{} e-mail messages transmitted", summary.transmitted),
    ];
    for line in summary.stats.report() {
        lines.push(format!(
            "{} min/avg/max = {:.2}/{:.2}/{:.2} ms",
            line.phase, line.min, line.avg, line.max
        ));
    }
    lines.join("\n")
}

pub fn print_summary(summary: &PingSummary, format: Format) -> Result<()> {
    match format {
        Format::Human => {
            println!();
            println!("{}", summary_text(summary));
            if summary.cancelled {
                println!("Aborted by Control-C");
            }
        }
        #[cfg(feature = "with-serde")]
        Format::Json => println!("{}", serde_json::to_string_pretty(summary)?),
    }
    Ok(())
}

#[cfg(feature = "with-csv")]
pub use csv_log::CsvLog;

#[cfg(feature = "with-csv")]
mod csv_log {
    use std::fs::File;
    use std::path::Path;

    use anyhow::{Context, Result};
    use smtpping::Phase;

    /// One row per successful ping.
    pub struct CsvLog {
        writer: csv::Writer<File>,
    }

    impl CsvLog {
        pub fn create(path: &Path) -> Result<Self> {
            let file = File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            let mut writer = csv::Writer::from_writer(file);
            let mut header = vec!["seq".to_string(), "endpoint".to_string()];
            header.extend(Phase::ALL.iter().map(|phase| phase.name().to_string()));
            writer.write_record(&header)?;
            Ok(Self { writer })
        }

        pub fn record<I>(&mut self, seq: u32, endpoint: &str, phases: I) -> Result<()>
        where
            I: IntoIterator<Item = (Phase, f64)>,
        {
            let mut record = vec![seq.to_string(), endpoint.to_string()];
            record.extend(phases.into_iter().map(|(_, millis)| format!("{millis:.3}")));
            self.writer.write_record(&record)?;
            Ok(())
        }

        pub fn flush(&mut self) -> Result<()> {
            self.writer.flush()?;
            Ok(())
        }
    }
}
