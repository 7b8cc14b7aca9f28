use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = "Keyhole/0.1 (https://github.com/trapdoorsec/keyhole)";

/// Default per-request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client shared by the prober and the crawler workers
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let timeout = Duration::from_secs(timeout_secs.max(1));

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout / 2)
        .pool_max_idle_per_host(50) // Connection pooling
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    Ok(client)
}
