use anyhow::{Context, Result};
use chrono::Utc;
use factory_simulator::config::Config;
use factory_simulator::http;
use factory_simulator::layout::FactoryLayout;
use factory_simulator::mqtt::TelemetryPublisher;
use factory_simulator::runner::{self, Simulation};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,factory_simulator=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing()?;
    tracing::info!("starting smart factory edge simulator");

    let layout = match &config.layout_path {
        Some(path) => FactoryLayout::load(path)
            .with_context(|| format!("failed to load factory layout {}", path.display()))?,
        None => FactoryLayout::default(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let devices = layout
        .build_devices(Utc::now(), &mut rng)
        .context("failed to build factory devices")?;
    let (simulation, snapshots) = Simulation::new(devices, rng);

    let (publisher, mqtt_handle) = TelemetryPublisher::new(&config);

    let app = http::router(http::HttpState { devices: snapshots });
    let listener = tokio::net::TcpListener::bind(&config.http_bind)
        .await
        .with_context(|| format!("failed to bind {}", config.http_bind))?;
    tracing::info!(bind=%config.http_bind, "factory-simulator HTTP listening");
    let http_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("simulation stopped by user");
        }
        res = runner::run(config, simulation, publisher) => {
            if let Err(err) = res {
                tracing::error!(error=%err, "simulation loop exited");
            }
        }
        _ = http_handle => {}
    }

    mqtt_handle.abort();
    Ok(())
}
