use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_topic_prefix: String,
    pub mqtt_client_id: String,

    pub http_bind: String,

    pub telemetry_interval: Duration,
    pub device_delay: Duration,
    pub layout_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mqtt_url = env_string("FACTORY_MQTT_URL", Some("mqtt://127.0.0.1:1883".to_string()))?;
        let (mqtt_host, mqtt_port) = parse_mqtt_url(&mqtt_url)?;
        let mqtt_username = env_optional("FACTORY_MQTT_USERNAME");
        let mqtt_password = env_optional("FACTORY_MQTT_PASSWORD");
        let mqtt_topic_prefix =
            env_string("FACTORY_MQTT_TOPIC_PREFIX", Some("factory".to_string()))?;
        let mqtt_client_id = env_string(
            "FACTORY_SIM_MQTT_CLIENT_ID",
            Some("factory-simulator".to_string()),
        )?;

        let http_bind = env_string("FACTORY_SIM_HTTP_BIND", Some("127.0.0.1:9102".to_string()))?;

        let telemetry_interval = telemetry_interval(env_u64("TELEMETRY_INTERVAL", Some(30))?)?;
        let device_delay =
            Duration::from_millis(env_u64("FACTORY_SIM_DEVICE_DELAY_MS", Some(1000))?);
        let layout_path = env_optional("FACTORY_LAYOUT_PATH").map(PathBuf::from);
        let seed = match env_optional("FACTORY_SIM_SEED") {
            Some(raw) => Some(raw.parse::<u64>().context("invalid FACTORY_SIM_SEED")?),
            None => None,
        };

        Ok(Self {
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_topic_prefix,
            mqtt_client_id,
            http_bind,
            telemetry_interval,
            device_delay,
            layout_path,
            seed,
        })
    }
}

fn telemetry_interval(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(anyhow!("TELEMETRY_INTERVAL must be > 0"));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_mqtt_url(raw: &str) -> Result<(String, u16)> {
    let url = Url::parse(raw).context("invalid FACTORY_MQTT_URL")?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("FACTORY_MQTT_URL missing host"))?
        .to_string();
    Ok((host, url.port().unwrap_or(1883)))
}

fn env_string(key: &str, default: Option<String>) -> Result<String> {
    match env::var(key) {
        Ok(value) => Ok(value.trim().to_string()),
        Err(_) => default.ok_or_else(|| anyhow!("missing env var {key}")),
    }
}

fn env_u64(key: &str, default: Option<u64>) -> Result<u64> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid {key}")),
        Err(_) => default.ok_or_else(|| anyhow!("missing env var {key}")),
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mqtt_url_defaults_port() {
        assert_eq!(
            parse_mqtt_url("mqtt://broker.local").unwrap(),
            ("broker.local".to_string(), 1883)
        );
        assert_eq!(
            parse_mqtt_url("mqtt://10.0.0.5:8883").unwrap(),
            ("10.0.0.5".to_string(), 8883)
        );
        assert!(parse_mqtt_url("not a url").is_err());
    }

    #[test]
    fn zero_telemetry_interval_is_rejected() {
        let err = telemetry_interval(0).unwrap_err();
        assert!(err.to_string().contains("TELEMETRY_INTERVAL must be > 0"));
        assert_eq!(telemetry_interval(30).unwrap(), Duration::from_secs(30));
    }
}
