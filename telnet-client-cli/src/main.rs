//! Thin CLI front-end for `telnet-client` (spec.md §6).

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use telnet_client::{ClientConfig, Error, TelnetClient};
use tracing::level_filters::LevelFilter;

/// Connect to a Telnet NVT, optionally log in, run one or more commands, and
/// print the collected output.
#[derive(Debug, Parser)]
#[command(name = "telnet-client-cli", version, about)]
struct Args {
    /// Remote host name or IP address.
    #[arg(short = 'H', long)]
    host: String,

    /// Remote TCP port.
    #[arg(short = 'P', long)]
    port: u16,

    /// Username to send at the login prompt, if any.
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Password to send at the password prompt, if any.
    #[arg(short = 'p', long)]
    pass: Option<String>,

    /// A command to run after connecting (and logging in, if requested).
    /// May be repeated; commands run in the order given.
    #[arg(short = 'c', long = "cmd")]
    commands: Vec<String>,

    /// Regular expression matching the shell prompt.
    #[arg(long, default_value = "[$#>]\\s*$")]
    prompt: String,

    /// Regular expression matching the login/username prompt.
    #[arg(long)]
    login_prompt: Option<String>,

    /// Regular expression matching the password prompt.
    #[arg(long)]
    password_prompt: Option<String>,

    /// Strip ANSI/ASCII control sequences from every returned line.
    #[arg(long)]
    prune_ctrl_seq: bool,

    /// Enable verbose (debug) protocol logging from the NVT filter.
    #[arg(short = 'd', long)]
    debug: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbosity: u8,

    /// Connect timeout, in seconds.
    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Socket (per-byte) timeout, in seconds. Omit for no timeout.
    #[arg(long)]
    socket_timeout_secs: Option<u64>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // clap exits 0 itself for --help/--version; anything else is a
            // usage error, which spec.md §6 says should exit 1.
            let _ = e.print();
            return if e.exit_code() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    let default_level = match args.verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    if let Err(e) = telnet_client::logging::init(default_level) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let socket_timeout = args.socket_timeout_secs.map(Duration::from_secs);
    let mut config = ClientConfig::new(
        args.host.clone(),
        args.port,
        Duration::from_secs(args.connect_timeout_secs),
        socket_timeout,
        "",
        None,
    )?;
    config.set_regex_prompt(&args.prompt)?;
    config.set_prune_control_sequences(args.prune_ctrl_seq);
    config.set_debug(args.debug);

    let mut client = TelnetClient::from_config(config);
    client.connect()?;

    if let (Some(user), Some(pass)) = (&args.user, &args.pass) {
        client.login(
            user,
            pass,
            args.login_prompt.as_deref(),
            args.password_prompt.as_deref(),
        )?;
    }

    for cmd in &args.commands {
        let lines = client.exec(cmd, true)?;
        for line in lines {
            println!("{}", String::from_utf8_lossy(&line));
        }
    }

    client.disconnect()
}
