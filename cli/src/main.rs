use std::io::Write;
use std::sync::Arc;

use bynoral_cli::commands;
use bynoral_cli::logging;
use bynoral_cli::readline;
use bynoral_cli::CliContext;
use bynoral_core::{
    AppConfig, AppConfigExt, Clock, HeadlessSurface, PlaybackSurface, ShiftedClock, SystemClock,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Background audio that follows the time of day")]
struct Args {
    /// Start the clock at HH:MM today instead of the real time
    #[arg(long)]
    at: Option<String>,

    /// Run without an audio device
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let _log_guard = logging::init();

    let config = AppConfig::load();

    let clock: Arc<dyn Clock> = match &args.at {
        Some(at) => Arc::new(ShiftedClock::starting_at(commands::start_time_today(at)?)),
        None => Arc::new(SystemClock),
    };
    let store = Box::new(config.override_store());
    let surface = build_surface(&config, args.headless);

    let ctx = CliContext::start(config, store, clock, surface).await;
    commands::status(&ctx).await;

    loop {
        let Some(line) = readline()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[cfg(feature = "audio")]
fn build_surface(config: &AppConfig, headless: bool) -> Box<dyn PlaybackSurface> {
    if headless {
        Box::new(HeadlessSurface::new())
    } else {
        Box::new(bynoral_cli::audio::RodioSurface::new(config.volume))
    }
}

#[cfg(not(feature = "audio"))]
fn build_surface(_config: &AppConfig, headless: bool) -> Box<dyn PlaybackSurface> {
    if !headless {
        tracing::warn!("Built without the audio feature, running headless");
    }
    Box::new(HeadlessSurface::new())
}

#[derive(Parser)]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Current mode, what decides it and when it changes next
    Status,
    Play,
    Pause,
    Toggle,
    /// Force a mode until the override expires
    Mode {
        mode: String,
        #[arg(short, long, allow_negative_numbers = true)]
        minutes: Option<i64>,
    },
    /// Drop the override and follow the schedule
    Auto,
    /// Output level in percent
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },
    Schedule,
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "bynoral".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Status) => commands::status(ctx).await,
        Some(Commands::Play) => commands::play(ctx).await,
        Some(Commands::Pause) => commands::pause(ctx).await,
        Some(Commands::Toggle) => commands::toggle(ctx).await,
        Some(Commands::Mode { mode, minutes }) => commands::set_mode(ctx, mode, *minutes).await,
        Some(Commands::Auto) => commands::auto(ctx).await,
        Some(Commands::Volume { percent }) => commands::set_volume(ctx, *percent).await,
        Some(Commands::Schedule) => commands::schedule(ctx).await,
        Some(Commands::Config) => commands::show_config(ctx).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
