use clap::Parser;
use plugvault::cli::{init_tracing, Cli, Commands, Context};

fn main() {
    let cli = Cli::parse();

    let ctx = match Context::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            plugvault::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    init_tracing(&ctx.log_level);

    let result = match cli.command {
        Commands::Drivers => plugvault::cli::commands::drivers::execute(&ctx),
        Commands::Keygen {
            ref out,
            bits,
            force,
        } => plugvault::cli::commands::keygen::execute(&ctx, out, bits, force),
        Commands::Encrypt {
            ref file,
            ref driver,
            ref key,
        } => plugvault::cli::commands::encrypt::execute(&ctx, file, driver, key),
        Commands::Decrypt {
            entry,
            ref driver,
            ref output,
            force,
            ref key,
        } => plugvault::cli::commands::decrypt::execute(
            &ctx,
            entry,
            driver.as_deref(),
            output.as_deref(),
            force,
            key,
        ),
        Commands::List => plugvault::cli::commands::list::execute(&ctx),
        Commands::Version => plugvault::cli::commands::version::execute(),
    };

    if let Err(e) = result {
        plugvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
