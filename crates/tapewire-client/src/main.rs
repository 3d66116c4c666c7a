//! Tapewire command-line client.
//!
//! # Usage
//!
//! ```bash
//! # Run a rule program locally, one line per step
//! tapewire run --rules "10110 21101" --tape 0000
//!
//! # Same, one step per second
//! tapewire run --rules "10110 21101" --tape 0000 --interval-ms 1000
//!
//! # Store a rule program on the server, then fetch and run it elsewhere
//! tapewire send --id alice "10110 21101"
//! tapewire fetch-run --id bob --tape 0000
//!
//! # Print the server's shared slot
//! tapewire request --id carol --host 192.0.2.7 --port 12345
//! ```

use std::{
    error::Error,
    io::{self, Write},
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use tapewire_client::{
    ClientConfig, ClientEngine, ClientEvent, ConnectionState, DEFAULT_HOST, DEFAULT_PORT,
};
use tapewire_core::{
    ChannelObserver, MachineRunner, RuleSet, RunnerConfig, Tape, TapeMachine,
};
use tapewire_proto::{ServerMessage, command::MESSAGE_STORED};
use tokio::{sync::mpsc, time};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// How long to wait for the server to answer a request.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Tapewire Turing machine client
#[derive(Parser, Debug)]
#[command(name = "tapewire")]
#[command(about = "Run binary Turing machines and share rule programs through a Tapewire server")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a rule program locally
    Run(RunArgs),

    /// Store a payload in the server's shared slot
    Send(SendArgs),

    /// Print the server's shared slot
    Request(ServerArgs),

    /// Fetch a rule program from the server's shared slot and run it locally
    FetchRun(FetchRunArgs),
}

#[derive(Args, Debug)]
struct ServerArgs {
    /// Client id to register with
    #[arg(long)]
    id: String,

    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT.to_string())]
    port: String,
}

#[derive(Args, Debug)]
struct MachineArgs {
    /// Initial tape, `0`/`1` characters
    #[arg(long)]
    tape: String,

    /// Stop after this many steps if the machine has not halted
    #[arg(long, default_value = "1000")]
    max_steps: u64,

    /// Step on a timer instead of as fast as possible
    #[arg(long)]
    interval_ms: Option<u64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Rule program, whitespace-separated 5-character rules
    #[arg(long)]
    rules: String,

    #[command(flatten)]
    machine: MachineArgs,
}

#[derive(Args, Debug)]
struct SendArgs {
    #[command(flatten)]
    server: ServerArgs,

    /// Text to store
    payload: String,
}

#[derive(Args, Debug)]
struct FetchRunArgs {
    #[command(flatten)]
    server: ServerArgs,

    #[command(flatten)]
    machine: MachineArgs,
}

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    match cli.command {
        Command::Run(args) => run_machine(args.rules.parse()?, &args.machine).await,
        Command::Send(args) => send(&args).await,
        Command::Request(args) => request(&args).await,
        Command::FetchRun(args) => fetch_run(&args).await,
    }
}

async fn run_machine(rules: RuleSet, args: &MachineArgs) -> CliResult {
    let tape: Tape = args.tape.parse()?;
    let mut machine = TapeMachine::new(tape, rules);
    writeln!(io::stdout(), "{}", machine.snapshot())?;

    let Some(interval_ms) = args.interval_ms else {
        let mut out = io::stdout().lock();
        for _ in 0..args.max_steps {
            let outcome = machine.step();
            writeln!(out, "{}", machine.snapshot())?;
            if outcome.is_halted() {
                break;
            }
        }
        return Ok(());
    };

    let (observer, mut events) = ChannelObserver::channel();
    machine.set_observer(observer);

    let config = RunnerConfig {
        interval: Duration::from_millis(interval_ms),
        max_steps: Some(args.max_steps),
    };
    let runner = MachineRunner::spawn(machine, config);

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            writeln!(io::stdout(), "{}", event.snapshot())?;
        }
        Ok::<_, io::Error>(())
    });

    // Dropping the machine drops its observer, which ends the printer
    drop(runner.wait().await?);
    printer.await??;
    Ok(())
}

type Events = mpsc::UnboundedReceiver<ClientEvent>;

async fn connect(args: &ServerArgs) -> CliResult<(ClientEngine, Events)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut engine = ClientEngine::new(ClientConfig::default(), tx);
    engine.connect(&args.id, &args.host, &args.port).await?;
    Ok((engine, rx))
}

/// Next server line other than the greeting.
async fn next_reply(events: &mut Events) -> CliResult<String> {
    let reply = time::timeout(REPLY_TIMEOUT, async {
        let mut welcomed = false;
        while let Some(event) = events.recv().await {
            match event {
                ClientEvent::MessageReceived(line) => {
                    let message = ServerMessage::parse(&line);
                    if message.ends_session(welcomed) {
                        return Err(format!("session ended by server: {line}"));
                    }
                    if !welcomed && message == ServerMessage::Welcome {
                        welcomed = true;
                        continue;
                    }
                    return Ok(line);
                },
                ClientEvent::StatusChanged { state: ConnectionState::Disconnected, detail } => {
                    return Err(detail);
                },
                ClientEvent::StatusChanged { .. } | ClientEvent::RulesReceived(_) => {},
            }
        }
        Err("event channel closed".to_string())
    })
    .await;

    match reply {
        Ok(Ok(line)) => Ok(line),
        Ok(Err(detail)) => Err(detail.into()),
        Err(_) => Err("no reply from server".into()),
    }
}

async fn send(args: &SendArgs) -> CliResult {
    let (mut engine, mut events) = connect(&args.server).await?;
    engine.send(&args.payload).await?;

    let reply = next_reply(&mut events).await;
    engine.disconnect().await;

    let reply = reply?;
    if reply != MESSAGE_STORED {
        return Err(format!("unexpected reply: {reply}").into());
    }
    writeln!(io::stdout(), "{reply}")?;
    Ok(())
}

async fn request(args: &ServerArgs) -> CliResult {
    let (mut engine, mut events) = connect(args).await?;
    engine.request_data().await?;

    let reply = next_reply(&mut events).await;
    engine.disconnect().await;

    writeln!(io::stdout(), "{}", reply?)?;
    Ok(())
}

async fn fetch_run(args: &FetchRunArgs) -> CliResult {
    let (mut engine, mut events) = connect(&args.server).await?;
    engine.request_data().await?;

    let reply = next_reply(&mut events).await;
    engine.disconnect().await;

    let reply = reply?;
    let rules = match ServerMessage::parse(&reply) {
        ServerMessage::Data(text) => RuleSet::from_text(text)?,
        _ => return Err(format!("server has no rule program: {reply}").into()),
    };
    run_machine(rules, &args.machine).await
}
