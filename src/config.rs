use crate::models::Coordinate;
use crate::session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use anyhow::{anyhow, Context, Error};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub destination: Coordinate,
    pub bind_address: String,
    pub timeout: Duration,
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| var(name).ok_or_else(|| anyhow!("{} is not set", name));

        let destination = Coordinate::new(
            parse(&required("DESTINATION_LATITUDE")?, "DESTINATION_LATITUDE")?,
            parse(&required("DESTINATION_LONGITUDE")?, "DESTINATION_LONGITUDE")?,
        );
        if !destination.is_valid() {
            return Err(anyhow!("destination {} is out of range", destination));
        }

        let timeout_secs = match var("DIRECTIONS_TIMEOUT_SECS") {
            Some(v) => parse(&v, "DIRECTIONS_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let session_ttl = match var("SESSION_TTL_SECS") {
            Some(v) => Duration::from_secs(parse(&v, "SESSION_TTL_SECS")?),
            None => DEFAULT_SESSION_TTL,
        };
        let max_sessions = match var("MAX_SESSIONS") {
            Some(v) => parse(&v, "MAX_SESSIONS")?,
            None => DEFAULT_MAX_SESSIONS,
        };
        if max_sessions == 0 {
            return Err(anyhow!("MAX_SESSIONS must be at least 1"));
        }

        Ok(Self {
            api_key: required("DIRECTIONS_API_KEY")?,
            base_url: var("DIRECTIONS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            destination,
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned()),
            timeout: Duration::from_secs(timeout_secs),
            session_ttl,
            max_sessions,
        })
    }
}

fn parse<T>(value: &str, name: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().with_context(|| format!("invalid {}: {:?}", name, value))
}
