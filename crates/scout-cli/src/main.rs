use anyhow::{Context, Result};
use clap::ArgMatches;
use scout_cli::cli::{self, apply_generation, apply_probe, load_config, load_seeds};
use scout_cli::{render, HttpExists};
use scout_core::{CancellationToken, ProbeSession, SeedItem};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::command().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("probe", args)) => probe(args).await,
        Some(("candidates", args)) => candidates(args),
        Some(("conventions", args)) => conventions(args),
        _ => unreachable!("subcommand_required is set"),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn probe(args: &ArgMatches) -> Result<()> {
    let mut config = load_config(args)?;
    apply_generation(args, &mut config);
    apply_probe(args, &mut config);
    let session = ProbeSession::from_config(&config).context("invalid configuration")?;

    let seeds_path = args
        .get_one::<String>("seeds")
        .context("--seeds is required")?;
    let filter = args.get_one::<String>("filter").map(String::as_str);
    let seeds = load_seeds(Path::new(seeds_path), filter)?;
    if seeds.is_empty() {
        tracing::warn!("no seeds to probe");
    }

    let check = Arc::new(
        HttpExists::new(cli::transport_timeout(&config)).context("building HTTP client")?,
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; returning partial results");
            on_interrupt.cancel();
        }
    });

    let output = session.run_with_cancel(seeds, check, &cancel).await;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render::session_text(&output));
    }
    Ok(())
}

fn candidates(args: &ArgMatches) -> Result<()> {
    let mut config = load_config(args)?;
    apply_generation(args, &mut config);
    let session = ProbeSession::from_config(&config).context("invalid configuration")?;

    let code = args
        .get_one::<String>("code")
        .context("a code is required")?;
    let mut seed = SeedItem::new(code.as_str(), "");
    if let Some(title) = args.get_one::<String>("title") {
        seed = seed.with_title(title.as_str());
    }
    if let Some(date) = args.get_one::<chrono::NaiveDate>("date") {
        seed = seed.with_observed_date(*date);
    }

    print!("{}", render::candidates_text(&session.candidates(&seed)));
    Ok(())
}

fn conventions(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let registry = config
        .build_registry()
        .context("invalid convention table")?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&registry)?);
    } else {
        print!("{}", render::conventions_text(&registry));
    }
    Ok(())
}
