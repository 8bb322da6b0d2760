use chess_rival::{run_uci_engine_with_config, EngineConfig, UCIConfig};
use clap::{Arg, Command};
use tracing_subscriber::EnvFilter;

/// UCI chess engine binary
///
/// Speaks the UCI protocol on stdin/stdout so any UCI GUI (Arena, Cute Chess,
/// BanksiaGUI, ...) can play against it.
///
/// UCI Options:
/// - Difficulty: Easy, Medium or Hard (default Medium)
/// - HardEngine: Hybrid or Playout search for Hard (default Hybrid)
/// - PlayoutTime: playout budget in ms when `go` gives no time (default 5000)
/// - ParallelPlayouts: run playout sweeps on all cores (default false)
/// - OwnBook: use the built-in opening book (default true)
/// - Seed: fixed random seed, empty for entropy
///
/// Logging goes to stderr and is controlled by `RUST_LOG`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Chess Rival UCI")
        .version(env!("CARGO_PKG_VERSION"))
        .about("UCI engine front end")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON engine configuration used as the option defaults"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Start with UCI debug output enabled")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let engine = match matches.get_one::<String>("config") {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    run_uci_engine_with_config(UCIConfig {
        enable_debug: matches.get_flag("debug"),
        engine,
        ..UCIConfig::default()
    })?;
    Ok(())
}
