use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use connect_four::config::AppConfig;
use connect_four::game::{GameState, GameStatus, MoveOutcome};
use connect_four::service::GameService;
use connect_four::store::{FileStore, GameId};

/// Play Connect Four against a local data directory.
#[derive(Parser)]
#[command(name = "connect-four", about = "Turn-based Connect Four game service")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "connect4.toml")]
    config: PathBuf,

    /// Override the data directory from the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a user. Requires a unique user name
    CreateUser { name: String, email: String },
    /// Start a game; the first player moves first
    NewGame { player1: String, player2: String },
    /// Show the current state of a game
    Show { game: GameId },
    /// Drop a token into a column (1-7)
    Move {
        game: GameId,
        player: String,
        column: usize,
    },
    /// List a user's active games
    Games { user: String },
    /// Cancel and delete an unfinished game
    Cancel { game: GameId, user: String },
    /// Print every move of a game
    History { game: GameId },
    /// List scores, most holes remaining first
    Scores {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List players by win ratio
    Rankings,
    /// Print a config file with all default values
    DefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load_optional(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let config_missing = loaded.is_none();
    let mut config = loaded.unwrap_or_default();
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("parsing logging.filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if config_missing {
        warn!(path = %cli.config.display(), "config file not found, using defaults");
    }

    if let Command::DefaultConfig = cli.command {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    let store = FileStore::open(&config.store.data_dir)
        .with_context(|| format!("opening data dir {}", config.store.data_dir.display()))?;
    let service = GameService::new(store).with_default_score_limit(config.scores.default_limit);

    match cli.command {
        Command::CreateUser { name, email } => {
            let player = service.create_user(&name, &email)?;
            println!("User {} created!", player.name);
        }
        Command::NewGame { player1, player2 } => {
            let (id, game) = service.new_game(&player1, &player2)?;
            println!("Game {id}");
            print_game(&game);
            println!("Good luck. It's {}'s turn", game.whose_turn());
        }
        Command::Show { game } => {
            print_game(&service.get_game(game)?);
        }
        Command::Move {
            game,
            player,
            column,
        } => {
            let report = service.make_move(game, &player, column)?;
            print_game(&report.game);
            match report.outcome {
                MoveOutcome::Placed { next, .. } => println!("Now it's {next}'s turn."),
                MoveOutcome::ColumnFull { .. } => {
                    println!("This column is full, try another column")
                }
                MoveOutcome::Won { winner, .. } => println!("{winner} has won the game!"),
                MoveOutcome::Draw { .. } => println!("Game over - it's a draw"),
            }
        }
        Command::Games { user } => {
            for (id, game) in service.user_games(&user)? {
                println!(
                    "{id}  {} vs {}  ({}'s turn, {} holes left)",
                    game.player1(),
                    game.player2(),
                    game.whose_turn(),
                    game.holes_remaining()
                );
            }
        }
        Command::Cancel { game, user } => {
            service.cancel_game(game, &user)?;
            println!("Game cancelled and deleted.");
        }
        Command::History { game } => {
            for entry in service.game_history(game)? {
                println!(
                    "#{} {} -> column {} (row {})",
                    entry.sequence, entry.player, entry.column, entry.row
                );
                println!("{}\n", entry.board_after);
            }
        }
        Command::Scores { limit } => {
            for score in service.high_scores(limit)? {
                let result = match &score.winner {
                    Some(winner) => format!("won by {winner}"),
                    None => "draw".to_string(),
                };
                println!(
                    "{:>2} holes  {} vs {}  {result}",
                    score.holes_remaining, score.player1, score.player2
                );
            }
        }
        Command::Rankings => {
            for (rank, record) in service.rankings()?.iter().enumerate() {
                println!(
                    "{:>3}. {:<16} {:.3}  (W {} / L {} / D {})",
                    rank + 1,
                    record.player,
                    record.win_ratio,
                    record.wins,
                    record.losses,
                    record.draws
                );
            }
        }
        Command::DefaultConfig => unreachable!("handled before the store is opened"),
    }

    Ok(())
}

fn print_game(game: &GameState) {
    println!("{}", game.board());
    let status = match game.status() {
        GameStatus::InProgress => format!("in progress, {} to move", game.whose_turn()),
        GameStatus::Won(winner) => format!("won by {winner}"),
        GameStatus::Draw => "draw".to_string(),
        GameStatus::Cancelled => "cancelled".to_string(),
    };
    println!(
        "{} (Red) vs {} (Yellow): {status}, {} holes left",
        game.player1(),
        game.player2(),
        game.holes_remaining()
    );
}
