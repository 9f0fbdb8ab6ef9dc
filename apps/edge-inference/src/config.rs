use crate::devices::KnownDevices;
use anyhow::{anyhow, Context, Result};
use std::env;
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
    pub mqtt_keepalive_secs: u64,
    pub enable_mqtt: bool,

    pub http_bind: String,

    pub known_devices: KnownDevices,
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
        let mqtt_client_id =
            env_string("EDGE_MQTT_CLIENT_ID", Some("smart-factory-ml".to_string()))?;
        let mqtt_keepalive_secs = env_u64("EDGE_MQTT_KEEPALIVE_SECS", Some(30))?;
        let enable_mqtt = parse_enable_flag(env_optional("EDGE_ENABLE_MQTT").as_deref());

        let http_bind = env_string("EDGE_HTTP_BIND", Some("0.0.0.0:5000".to_string()))?;

        let known_devices = parse_known_devices(env_optional("EDGE_KNOWN_DEVICES").as_deref())?;

        Ok(Self {
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_topic_prefix,
            mqtt_client_id,
            mqtt_keepalive_secs,
            enable_mqtt,
            http_bind,
            known_devices,
        })
    }

    pub fn mqtt_keepalive(&self) -> Duration {
        Duration::from_secs(self.mqtt_keepalive_secs)
    }
}

fn parse_mqtt_url(raw: &str) -> Result<(String, u16)> {
    let url = Url::parse(raw).context("invalid FACTORY_MQTT_URL")?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("FACTORY_MQTT_URL missing host"))?
        .to_string();
    Ok((host, url.port().unwrap_or(1883)))
}

/// Unset means enabled; otherwise only `1` or `true` enable the listener.
fn parse_enable_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(true)
}

fn parse_known_devices(raw: Option<&str>) -> Result<KnownDevices> {
    let Some(raw) = raw else {
        return Ok(KnownDevices::default());
    };
    let known = KnownDevices::parse_list(raw);
    if known.is_empty() {
        return Err(anyhow!("EDGE_KNOWN_DEVICES lists no devices"));
    }
    Ok(known)
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
    fn enable_flag_defaults_on_and_accepts_truthy_values() {
        assert!(parse_enable_flag(None));
        assert!(parse_enable_flag(Some("1")));
        assert!(parse_enable_flag(Some("true")));
        assert!(parse_enable_flag(Some("TRUE")));
        assert!(!parse_enable_flag(Some("0")));
        assert!(!parse_enable_flag(Some("false")));
        assert!(!parse_enable_flag(Some("yes")));
    }

    #[test]
    fn known_devices_override_replaces_the_factory_list() {
        assert_eq!(parse_known_devices(None).unwrap(), KnownDevices::default());

        let known = parse_known_devices(Some("PLANT_A_01, PLANT_A_02")).unwrap();
        assert_eq!(known.len(), 2);
        assert!(known.contains("PLANT_A_01"));
        assert!(known.contains("PLANT_A_02"));
        assert!(!known.contains("LINE_1_CNC_01"));
    }

    #[test]
    fn blank_known_device_list_is_rejected() {
        let err = parse_known_devices(Some(" , ")).unwrap_err();
        assert!(err.to_string().contains("EDGE_KNOWN_DEVICES"));
    }
}
