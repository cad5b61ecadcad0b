use std::net::IpAddr;
use log::info;
use reqwest::StatusCode;
use serde::Deserialize;
use super::address::Address;
use crate::{Result, TrackerError};

pub const DEFAULT_ENDPOINT: &str = "https://ipinfo.io/json";

#[derive(Debug, Deserialize)]
struct PublicIpResponse {
    ip: String,
}

/// Discovers the public address of the local network through a JSON
/// endpoint that reports the caller's IP in an `ip` field.
pub struct PublicIpResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl PublicIpResolver {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn resolve(&self) -> Result<Address> {
        let response = self.client.get(&self.endpoint).send().await?;

        if response.status() != StatusCode::OK {
            return Err(TrackerError::UnexpectedResponse(response.status().as_u16()));
        }

        let body: PublicIpResponse = response.json().await?;
        let ip: IpAddr = body.ip.trim().parse()
            .map_err(|_| TrackerError::Parse(format!("Invalid IP in public ip response: {}", body.ip)))?;

        info!("Discovered public address {}", ip);
        Ok(Address::public(ip))
    }
}

impl Default for PublicIpResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}
