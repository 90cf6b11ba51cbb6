use api_migrate_cli::Cli;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Usage errors exit 1 like every other failure; --help and --version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            if let Err(print_err) = err.print() {
                eprintln!("failed to print usage: {print_err}");
            }
            std::process::exit(code);
        }
    };

    let code = run_main(cli)?;
    std::process::exit(code);
}

#[tokio::main(flavor = "current_thread")]
async fn run_main(cli: Cli) -> anyhow::Result<i32> {
    api_migrate_cli::run(cli).await
}
