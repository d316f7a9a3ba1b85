//! Demo authentication backend with simulated network latency.

use std::time::Duration;

use async_trait::async_trait;
use shared::{
    domain::{User, UserId},
    error::AuthError,
};
use tokio::time::sleep;
use tracing::debug;

use crate::AuthenticationGateway;

pub const DEMO_USERNAME: &str = "dayal";
pub const DEMO_PASSWORD: &str = "1234";
pub const DEMO_DISPLAY_NAME: &str = "Dayal";
pub const DEMO_TOKEN: &str = "token_abc_123";
pub const DEFAULT_DEMO_LATENCY: Duration = Duration::from_secs(1);

/// Accepts exactly one account: `dayal` (any letter case) with password `1234`.
#[derive(Debug, Clone)]
pub struct DemoAuthGateway {
    latency: Duration,
}

impl DemoAuthGateway {
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_DEMO_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for DemoAuthGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthenticationGateway for DemoAuthGateway {
    async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        debug!(username, latency_ms = self.latency.as_millis() as u64, "demo login");
        sleep(self.latency).await;

        if username.to_lowercase() == DEMO_USERNAME && password == DEMO_PASSWORD {
            Ok(User {
                id: UserId::new(),
                name: DEMO_DISPLAY_NAME.to_string(),
                token: DEMO_TOKEN.to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
