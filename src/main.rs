use clap::Parser;
use color_eyre::Result;
use stxy::{
    init_errors,
    init_logging,
    Poller,
};
use stxy_config::{
    Args,
    Config,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let config = Config::new(Args::parse())?;
    init_logging(config.debug)?;
    config.validate()?;

    let poller = Poller::from_config(&config).await?;

    tokio::select! {
        err = poller.run() => Err(err.into()),
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}
