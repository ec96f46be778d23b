// ABOUTME: Example application sending one text over a single Socket-to-Air session
// ABOUTME: Dials, authenticates, sends, optionally queries the delivery status and closes

use argh::FromArgs;
use s2a::client::{Credentials, ProtocolSession, TextMessage};
use std::error::Error;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Example application to show the simplest case of sending a text message
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the account name
    #[argh(option, short = 'u')]
    username: String,

    /// the password
    #[argh(option)]
    password: String,

    /// the hostname or IP address of the gateway (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the port to use when connecting to the gateway (default: 8000)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// the message to send
    #[argh(option, short = 'm')]
    message: String,

    /// the recipient telephone number
    #[argh(option, short = 't')]
    to: String,

    /// send to an international number
    #[argh(switch, short = 'i')]
    international: bool,

    /// minutes the gateway keeps retrying delivery (default: deliver immediately)
    #[argh(option, short = 'e')]
    expiry: Option<u64>,

    /// query the delivery status after sending
    #[argh(switch, short = 'c')]
    check: bool,
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

    let host = cli_args.host.unwrap_or_else(|| "localhost".to_owned());
    let port = cli_args.port.unwrap_or(8000);

    let mut session = ProtocolSession::new(format!("{host}:{port}"));
    session
        .dial_and_authenticate(&Credentials::new(cli_args.username, cli_args.password))
        .await
        .map_err(|e| {
            eprintln!("Connection/authentication failed: {e}");
            e
        })?;

    println!("Connected and authenticated successfully");

    let message = if cli_args.international {
        TextMessage::international(&cli_args.to, &cli_args.message)
    } else {
        TextMessage::new(&cli_args.to, &cli_args.message)
    }
    .with_expiry(cli_args.expiry.map(|minutes| Duration::from_secs(minutes * 60)));

    let result = match session.send_text(&message).await {
        Ok(message_id) => {
            println!("Message sent successfully! Message ID: {message_id}");
            if cli_args.check {
                match session.check_status(&message_id).await {
                    Ok(()) => println!("Message delivered"),
                    Err(e) => println!("Not delivered yet: {e}"),
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to send message: {e}");
            Err(e.into())
        }
    };

    session.close().await;
    result
}
