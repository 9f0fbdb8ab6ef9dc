use anyhow::{Context, Result};
use edge_inference::config::Config;
use edge_inference::model::EdgeModel;
use edge_inference::state::EdgeState;
use edge_inference::{http, mqtt};
use futures::future;

fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,edge_inference=info".into());
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
    tracing::info!("starting smart factory ML edge module");

    let state = EdgeState::new(EdgeModel::new(), config.known_devices.clone());

    let mqtt_handle = if config.enable_mqtt {
        let mqtt_config = config.clone();
        let mqtt_state = state.clone();
        Some(tokio::spawn(async move {
            if let Err(err) = mqtt::run_listener(mqtt_config, mqtt_state).await {
                tracing::error!(error=%err, "mqtt listener exited");
            }
        }))
    } else {
        tracing::info!("MQTT listener disabled");
        None
    };

    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind(&config.http_bind)
        .await
        .with_context(|| format!("failed to bind {}", config.http_bind))?;
    tracing::info!(bind=%config.http_bind, devices=config.known_devices.len(), "edge module HTTP listening");
    let http_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
        _ = async {
            match mqtt_handle {
                Some(handle) => {
                    if let Err(err) = handle.await {
                        tracing::warn!(error=%err, "MQTT task failed");
                    }
                }
                None => future::pending::<()>().await,
            }
        } => {}
        _ = http_handle => {}
    }

    Ok(())
}
