use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use bacnode_datalink::BipTransport;
use bacnode_server::{BasicEngine, Driver, DriverExit};
use bacnode_tools::{load_config, HostNetwork, Overrides};
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bacnode-server", about = "BACnet/IP device server")]
struct Args {
    /// JSON configuration file. The sample device is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    overrides: Overrides,
    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    HostNetwork::discover().fill(&mut config.network_port);
    args.overrides.apply(&mut config);

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    loop {
        let device = config.build_device()?;
        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.network_port.udp_port));
        let transport = BipTransport::bind(bind_addr, config.network_port.to_bip_settings()).await?;
        println!(
            "Device {} ({}) listening on {}. Ctrl+C to stop.",
            config.device.instance,
            config.device.name,
            transport.local_addr()?
        );

        let mut driver = Driver::new(device, transport, BasicEngine::new(), config.driver_config());
        let shutdown = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for ctrl-c: {err}");
                std::future::pending::<()>().await;
            }
        };
        match driver.run(shutdown).await {
            DriverExit::Shutdown => break,
            DriverExit::Restart(network) => {
                if let Some(network) = network {
                    config.network_port = network;
                }
                info!("restarting device {}", config.device.instance);
            }
        }
    }
    Ok(())
}
