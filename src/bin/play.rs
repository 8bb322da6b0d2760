use chess::{Color, Piece, Square};
use chess_rival::{
    ChessRules, Difficulty, EngineConfig, EngineError, GameSession, HardEngine, MoveSelector,
    RulesEngine,
};
use clap::{Arg, ArgAction, Command};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Play a game against the engine in the terminal
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Chess Rival")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Play chess against a tiered engine in the terminal")
        .arg(
            Arg::new("difficulty")
                .short('d')
                .long("difficulty")
                .value_name("LEVEL")
                .help("Engine strength (easy = random, medium = one ply, hard = search)")
                .value_parser(["easy", "medium", "hard"]),
        )
        .arg(
            Arg::new("hard_engine")
                .long("hard-engine")
                .value_name("ENGINE")
                .help("Search used on hard difficulty")
                .value_parser(["hybrid", "playout"]),
        )
        .arg(
            Arg::new("time_limit")
                .short('t')
                .long("time-limit")
                .value_name("SECONDS")
                .help("Thinking time per move for the playout search")
                .value_parser(clap::value_parser!(u64).range(0..=600)),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .help("Run playout sweeps on all cores")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("Seed for reproducible engine play")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("ai_color")
                .short('c')
                .long("ai-color")
                .value_name("COLOR")
                .help("Colour played by the engine")
                .value_parser(["white", "black"])
                .default_value("black"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON engine configuration; flags override it"),
        )
        .arg(
            Arg::new("fen")
                .long("fen")
                .value_name("FEN")
                .help("Start from this position instead of the initial one"),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(level) = matches.get_one::<String>("difficulty") {
        config.difficulty = level.parse::<Difficulty>()?;
    }
    if let Some(engine) = matches.get_one::<String>("hard_engine") {
        config.hard_engine = engine.parse::<HardEngine>()?;
    }
    if let Some(seconds) = matches.get_one::<u64>("time_limit") {
        config.playout_time_ms = seconds * 1000;
    }
    if matches.get_flag("parallel") {
        config = config.with_parallel_playouts(true);
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    config.validate()?;

    let ai_color = match matches.get_one::<String>("ai_color").map(String::as_str) {
        Some("white") => Color::White,
        _ => Color::Black,
    };

    let rules = ChessRules::new();
    let mut session = match matches.get_one::<String>("fen") {
        Some(fen) => GameSession::from_fen(rules, fen)?,
        None => GameSession::new(rules),
    };
    let mut selector = MoveSelector::standard(config)?;

    println!(
        "Chess Rival: engine plays {} on {} difficulty",
        color_name(ai_color),
        selector.config().difficulty
    );
    println!("Enter moves as SAN (Nf3) or coordinates (g1f3). Commands: undo, new, moves, quit");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        println!("{}", render_board(&session));

        if session.is_game_over() {
            match session.result() {
                Some(result) => println!("Game over: {}", result),
                None => println!("Game over"),
            }
            println!("{}", session.history());
            print!("Type 'new' for another game or 'quit': ");
        } else if session.side_to_move() == ai_color {
            println!("Engine is thinking...");
            let chess_move = session.ai_move(&mut selector)?;
            let notation = session
                .history()
                .last()
                .map(|r| r.notation.clone())
                .unwrap_or_else(|| chess_move.to_string());
            println!("Engine plays {}", notation);
            continue;
        } else {
            print!("{} to move> ", color_name(session.side_to_move()));
        }
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let input = line.trim();

        match input {
            "" => {}
            "quit" | "exit" => break,
            "new" => session.new_game(),
            "moves" => {
                let position = session.position();
                let mut listed: Vec<String> = session
                    .legal_moves()
                    .into_iter()
                    .map(|m| session.rules().to_notation(position, m))
                    .collect();
                listed.sort();
                println!("{}", listed.join(" "));
            }
            "undo" => {
                // Take back the engine's reply too so it is the human's turn again
                let mut undone = 0;
                while undone < 2 {
                    match session.undo() {
                        Ok(_) => undone += 1,
                        Err(EngineError::NothingToUndo) => break,
                        Err(e) => return Err(e.into()),
                    }
                    if session.side_to_move() != ai_color {
                        break;
                    }
                }
                if undone == 0 {
                    println!("Nothing to undo");
                }
            }
            text => {
                if let Err(e) = session.play_notation(text) {
                    println!("{}", e);
                }
            }
        }
    }

    Ok(())
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

fn render_board(session: &GameSession<ChessRules>) -> String {
    let rules = session.rules();
    let position = session.position();
    let mut out = String::new();

    for rank in (0..8).rev() {
        out.push_str(&format!("{} ", rank + 1));
        for file in 0..8 {
            let square = Square::make_square(chess::Rank::from_index(rank), chess::File::from_index(file));
            let symbol = match rules.piece_at(position, square) {
                Some((piece, color)) => piece_symbol(piece, color),
                None => '.',
            };
            out.push(' ');
            out.push(symbol);
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h");
    out
}

fn piece_symbol(piece: Piece, color: Color) -> char {
    let symbol = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => symbol.to_ascii_uppercase(),
        Color::Black => symbol,
    }
}
