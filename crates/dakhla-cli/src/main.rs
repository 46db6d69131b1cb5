use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        // Domain errors were already emitted as a JSON envelope.
        if error.downcast_ref::<output::Reported>().is_none() {
            eprintln!("dkl error: {error:#}");
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();

    // `init` runs before any database exists.
    if let cli::Commands::Init = &cli.command {
        return commands::init::handle(&flags);
    }

    let ctx = context::AppContext::bootstrap(&flags).await?;

    match &cli.command {
        cli::Commands::Init => unreachable!("handled above"),
        cli::Commands::User { action } => commands::user::handle(action, &ctx).await,
        cli::Commands::School { action } => commands::school::handle(action, &ctx).await,
        cli::Commands::Student { action } => commands::student::handle(action, &ctx).await,
        cli::Commands::Certificate { action } => {
            commands::certificate::handle(action, &ctx).await
        }
        cli::Commands::Audit(args) => commands::audit::handle(args, &ctx).await,
        cli::Commands::Login(args) => commands::session::login(args, &ctx).await,
        cli::Commands::Logout => commands::session::logout(&ctx).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dakhla={default_level},dkl={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init tracing: {e}"))?;
    Ok(())
}
