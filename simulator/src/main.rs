mod telemetry;

use clap::Parser;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use telemetry::{generate_reading, SensorPayload};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Posts synthetic environmental readings to the ingestor on a fixed interval
#[derive(Debug, Parser)]
#[command(name = "simulator", version)]
struct Args {
    /// Ingestion endpoint
    #[arg(long, env = "SIMULATOR_ENDPOINT", default_value = "http://localhost:3000/api/data")]
    endpoint: String,

    /// Milliseconds between readings
    #[arg(long, env = "SIMULATOR_INTERVAL_MS", default_value_t = 2000)]
    interval_ms: u64,

    /// Stop after this many send attempts, successful or not
    #[arg(long, env = "SIMULATOR_COUNT")]
    count: Option<u64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting sensor simulator");
    info!("Endpoint: {}, interval: {}ms", args.endpoint, args.interval_ms);

    let client = match Client::builder().timeout(Duration::from_secs(10)).build() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    run(&client, &args, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;
}

/// Sends readings until `--count` attempts are made or `shutdown` resolves.
///
/// `shutdown` is raced against both the ticker and the in-flight request.
/// Returns the number of send attempts.
async fn run(client: &Client, args: &Args, shutdown: impl Future<Output = ()>) -> u64 {
    tokio::pin!(shutdown);

    let mut ticker = interval(Duration::from_millis(args.interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
        }

        let reading = generate_reading(&mut rand::thread_rng());
        tokio::select! {
            result = send_reading(client, &args.endpoint, &reading) => match result {
                Ok(()) => info!("Sent: {:?}", reading),
                Err(e) => warn!("Failed to send data: {}", e),
            },
            _ = &mut shutdown => {
                info!("Received shutdown signal, abandoning in-flight reading");
                break;
            }
        }

        attempts += 1;
        if args.count.is_some_and(|count| attempts >= count) {
            info!("Made {} send attempts, stopping", attempts);
            break;
        }
    }

    attempts
}

async fn send_reading(
    client: &Client,
    endpoint: &str,
    reading: &SensorPayload,
) -> reqwest::Result<()> {
    client
        .post(endpoint)
        .json(reading)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["simulator"]);

        assert_eq!(args.endpoint, "http://localhost:3000/api/data");
        assert_eq!(args.interval_ms, 2000);
        assert_eq!(args.count, None);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from([
            "simulator",
            "--endpoint",
            "http://10.0.0.5:3000/api/data",
            "--interval-ms",
            "500",
            "--count",
            "3",
        ]);

        assert_eq!(args.endpoint, "http://10.0.0.5:3000/api/data");
        assert_eq!(args.interval_ms, 500);
        assert_eq!(args.count, Some(3));
    }

    #[test]
    fn test_send_reading_reports_connection_failure() {
        tokio_test::block_on(async {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let client = Client::new();
            let reading = SensorPayload {
                temperature: 25.0,
                humidity: 50.0,
                air_quality: 100.0,
            };

            let result = send_reading(&client, &format!("http://{}/api/data", addr), &reading).await;
            assert!(result.is_err());
        });
    }

    fn args_for(endpoint: String, count: Option<u64>) -> Args {
        Args {
            endpoint,
            interval_ms: 1,
            count,
        }
    }

    #[tokio::test]
    async fn test_count_limits_attempts_even_when_sends_fail() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let args = args_for(format!("http://{}/api/data", addr), Some(3));
        let attempts = run(&Client::new(), &args, std::future::pending()).await;

        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_in_flight_request() {
        // Accepts connections at the OS level but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();
        let args = args_for(format!("http://{}/api/data", addr), None);

        let start = std::time::Instant::now();
        let attempts = run(
            &client,
            &args,
            tokio::time::sleep(Duration::from_millis(200)),
        )
        .await;

        assert_eq!(attempts, 0);
        assert!(start.elapsed() < Duration::from_secs(5));
        drop(listener);
    }
}
