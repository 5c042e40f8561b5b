use clap::Parser;

fn main() -> anyhow::Result<()> {
    capsule::init();

    let cli = capsule::cli::Cli::parse();
    capsule::cli::run(cli, &mut std::io::stdout().lock())
}
