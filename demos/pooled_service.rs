// ABOUTME: Example application driving the pooled service with concurrent senders
// ABOUTME: Shows configuration, startup, shared use behind an Arc and shutdown

use argh::FromArgs;
use s2a::client::RetryConfig;
use s2a::{ServiceConfig, SmsService};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Send a batch of texts through a pool of gateway sessions
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// gateway host:port
    #[argh(option, short = 'a')]
    address: String,

    /// the account name
    #[argh(option, short = 'u')]
    username: String,

    /// the password
    #[argh(option)]
    password: String,

    /// number of sessions to open (default: 2)
    #[argh(option, short = 'n', default = "2")]
    pool_size: usize,

    /// seconds between reconnect attempts for broken sessions (default: 10)
    #[argh(option, default = "10")]
    retry_interval: u64,

    /// seconds to wait for a free session before giving up
    #[argh(option)]
    checkout_timeout: Option<u64>,

    /// the recipient telephone number
    #[argh(option, short = 't')]
    to: String,

    /// how many texts to send (default: 5)
    #[argh(option, short = 'c', default = "5")]
    count: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let level = if cli_args.debugging {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = ServiceConfig::new(cli_args.address, cli_args.username, cli_args.password)
        .with_pool_size(cli_args.pool_size)
        .with_retry(RetryConfig::new(Duration::from_secs(cli_args.retry_interval)))
        .with_checkout_timeout(cli_args.checkout_timeout.map(Duration::from_secs));

    let service = Arc::new(SmsService::connect(config).await?);

    let mut handles = Vec::with_capacity(cli_args.count);
    for i in 0..cli_args.count {
        let service = service.clone();
        let to = cli_args.to.clone();
        handles.push(tokio::spawn(async move {
            let text = format!("Message {} of batch", i + 1);
            (i, service.send_text(&to, &text).await)
        }));
    }

    let mut message_ids = Vec::new();
    for handle in handles {
        match handle.await? {
            (i, Ok(message_id)) => {
                info!("Text {i} accepted as {message_id}");
                message_ids.push(message_id);
            }
            (i, Err(e)) => warn!("Text {i} failed: {e}"),
        }
    }

    for message_id in &message_ids {
        let status = service.check_status(message_id).await;
        println!("{message_id}: success={} {}", status.success, status.error);
    }

    let status = service.status();
    println!("Pool: {} of {} sessions idle", status.available, status.size);

    service.shutdown().await;
    Ok(())
}
