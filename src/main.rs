use clap::Parser as _;
use horizon_board::CliArgs;
use horizon_board::view::Effect;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("horizon_board=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    for effect in horizon_board::run(args).await? {
        match effect {
            Effect::Acknowledge(message) => println!("{message}"),
            Effect::Navigate(href) => println!("-> {href}"),
        }
    }
    Ok(())
}
