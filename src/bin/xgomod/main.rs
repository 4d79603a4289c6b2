//! xgomod CLI - inspect and edit XGo module manifests

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use xgomod::util::fs::absolute_path;
use xgomod::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();
    if let Err(e) = run(cli) {
        commands::report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("xgomod=debug")
    } else {
        EnvFilter::new("xgomod=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = match cli.dir {
        Some(dir) => GlobalContext::with_cwd(absolute_path(&dir))?,
        None => GlobalContext::new()?,
    };
    ctx.set_color(!cli.no_color && std::io::stderr().is_terminal());
    let color = ctx.color();
    miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().color(color).build())
    }))?;
    ctx.load_config();
    if cli.offline {
        ctx.set_offline(true);
    }

    match cli.command {
        Commands::Init(args) => commands::init::execute(&ctx, args),
        Commands::Fmt(args) => commands::fmt::execute(&ctx, args),
        Commands::Add(args) => commands::add::execute(&ctx, args),
        Commands::Classes(args) => commands::classes::execute(&ctx, args),
        Commands::Kind(args) => commands::kind::execute(&ctx, args),
        Commands::Lookup(args) => commands::lookup::execute(&ctx, args),
        Commands::Deps(args) => commands::deps::execute(&ctx, args),
        Commands::Scan(args) => commands::scan::execute(&ctx, args),
    }
}
