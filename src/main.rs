use clap::Parser;
use tokio_util::sync::CancellationToken;

use msk::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    msk::logging::init(cli.verbose);

    // First Ctrl-C asks the running command to stop before its next I/O
    // step; a second one exits immediately.
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            std::process::exit(130);
        }
        handler_token.cancel();
    }) {
        tracing::warn!("could not install Ctrl-C handler: {e}");
    }

    let result = match cli.command {
        Commands::Add {
            ref name,
            ref generate,
        } => commands::add::execute(&cli, &cancel, name, generate),
        Commands::Get { ref name, print } => commands::get::execute(&cli, &cancel, name, print),
        Commands::Update {
            ref name,
            ref generate,
        } => commands::update::execute(&cli, &cancel, name, generate),
        Commands::Delete { ref name, force } => {
            commands::delete::execute(&cli, &cancel, name, force)
        }
        Commands::List => commands::list::execute(&cli, &cancel),
        Commands::Config { force } => commands::config::execute(&cli, force),
        Commands::Version => commands::version::execute(),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
