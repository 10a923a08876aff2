mod args;
mod logging;
mod output;

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use smtpping::{
    AddressFamily, CancelToken, Envelope, LookupRecords, PingEvent, PingSummary, Pinger,
    RateCounter, SystemResolver, TcpDialer, fan_out, message, recipient_domain,
    select_endpoints, spawn_reporter,
};
use tracing::{error, info_span};

use args::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli);

    cli.validate()?;
    if cli.server()?.is_none() {
        recipient_domain(&cli.recipient)?;
    }
    let envelope = Envelope::new(&cli.helo, &cli.sender, &cli.recipient, payload(&cli)?);

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel()).context("install SIGINT handler")?;

    let counter = cli.rate.then(RateCounter::new);
    let reporter_stop = CancelToken::new();
    let reporter = counter.clone().map(|counter| {
        spawn_reporter(
            counter,
            reporter_stop.clone(),
            Duration::from_secs(1),
            |delivered| println!("{}", output::rate_line(delivered)),
        )
    });

    let results = fan_out(cli.parallel, |worker| {
        let _span = (cli.parallel > 1).then(|| info_span!("worker", id = worker).entered());
        run_worker(&cli, &envelope, &cancel, counter.clone())
    });

    reporter_stop.cancel();
    if let Some(handle) = reporter {
        handle
            .join()
            .map_err(|_| anyhow!("rate reporter panicked"))?;
    }

    if cli.parallel == 1 {
        for result in results {
            output::print_summary(&result?, cli.format()?)?;
        }
    } else {
        for (worker, result) in results.into_iter().enumerate() {
            if let Err(err) = result {
                error!(worker, "{err:#}");
            }
        }
    }
    Ok(())
}

fn payload(cli: &Cli) -> Result<Vec<u8>> {
    match &cli.file {
        Some(path) => {
            let raw = fs::read(path)
                .with_context(|| format!("read message file {}", path.display()))?;
            Ok(message::from_bytes(&raw))
        }
        None => Ok(message::generate(&cli.sender, &cli.recipient, cli.size)),
    }
}

/// A failed MX query ends the target like an unreachable one: it is reported
/// and the worker pings nothing. Usage errors still abort.
fn endpoints_or_nothing<R>(resolver: &R, cli: &Cli, family: AddressFamily) -> Result<Vec<String>>
where
    R: LookupRecords + ?Sized,
{
    match select_endpoints(resolver, &cli.recipient, cli.server()?, family) {
        Ok(endpoints) => Ok(endpoints),
        Err(err) if err.is_configuration_error() => {
            Err(err).with_context(|| format!("select endpoints for {}", cli.recipient))
        }
        Err(err) => {
            error!("{err}");
            Ok(Vec::new())
        }
    }
}

/// One isolated worker: its own resolver, endpoint list, reconnect loop and
/// statistics.
fn run_worker(
    cli: &Cli,
    envelope: &Envelope,
    cancel: &CancelToken,
    counter: Option<RateCounter>,
) -> Result<PingSummary> {
    let options = cli.ping_options()?;
    let resolver =
        SystemResolver::with_nameservers(&cli.nameservers).context("initialise DNS resolver")?;
    let endpoints = endpoints_or_nothing(&resolver, cli, options.family)?;

    let dialer = TcpDialer::new()
        .with_bind(cli.bind)
        .with_timeout(cli.timeout());
    let mut pinger = Pinger::new(envelope, dialer, options).with_cancel(cancel.clone());
    if let Some(counter) = counter {
        pinger = pinger.with_rate_counter(counter);
    }

    #[cfg(feature = "with-csv")]
    let mut csv = cli
        .csv
        .as_deref()
        .map(output::CsvLog::create)
        .transpose()?;
    #[cfg(feature = "with-csv")]
    let mut csv_error = None;

    let summary = pinger.run(&endpoints, |event| match event {
        PingEvent::Target {
            endpoint,
            port,
            data_size,
            ..
        } => println!(
            "{}",
            output::header(&cli.recipient, endpoint, port, data_size)
        ),
        PingEvent::Reply {
            seq,
            endpoint,
            timings,
        } => {
            if !cli.quiet {
                println!("{}", output::attempt_line(seq, timings.iter_millis()));
            }
            #[cfg(feature = "with-csv")]
            if let Some(log) = csv.as_mut() {
                if let Err(err) = log.record(seq, endpoint, timings.iter_millis()) {
                    csv_error.get_or_insert(err);
                }
            }
            #[cfg(not(feature = "with-csv"))]
            let _ = endpoint;
        }
        PingEvent::Failed { .. } | PingEvent::Unresolvable { .. } => {}
    });

    #[cfg(feature = "with-csv")]
    {
        if let Some(err) = csv_error {
            return Err(err.context("write CSV log"));
        }
        if let Some(log) = csv.as_mut() {
            log.flush()?;
        }
    }

    Ok(summary)
}
