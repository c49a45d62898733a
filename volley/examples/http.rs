use std::time::Duration;

use url::Url;
use volley::{LoadTestConfig, Reporter, StdoutReporter, run_load_test};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // A public placeholder API; point this at your own service.
    let config = LoadTestConfig::builder()
        .target_url(Url::parse("https://jsonplaceholder.typicode.com/posts/1")?)
        .total_requests(1_000)
        .concurrency(100)
        .connect_timeout(Duration::from_secs(5))
        .request_timeout(Duration::from_secs(5))
        .build();

    // Failed requests land in the report, not in the exit code; a non-zero
    // exit means the setup itself was wrong.
    let report = run_load_test(&config).await?;
    StdoutReporter.report(report).await
}
