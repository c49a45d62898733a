use std::sync::Arc;

use crate::aggregate::OutcomeTally;
use crate::config::LoadTestConfig;
use crate::executor::PoolExecutor;
use crate::probe::{ProcfsProbe, ResourceProbe};
use crate::report::LoadTestReport;
use crate::request::HttpRequester;
use crate::scenario::Scenario;

/// Run a complete load test: validate the parameters, fan the requests out
/// over the pool, and derive the report from the two bracketing snapshots.
///
/// Only setup problems surface as `Err`. Request failures are data: the
/// report is produced even when every single request fails.
pub async fn run_load_test(
    config: &LoadTestConfig,
) -> Result<LoadTestReport, Box<dyn std::error::Error>> {
    config.validate()?;
    let requester = Arc::new(HttpRequester::new(config)?);

    let probe = ProcfsProbe::new();
    let start = probe.snapshot();

    let tally: OutcomeTally = Scenario::<OutcomeTally, _, _, _>::builder()
        .name(format!("{} {}", config.method, config.target_url))
        .action(move || {
            let requester = Arc::clone(&requester);
            async move { requester.execute().await }
        })
        .executor(PoolExecutor::from_config(config))
        .build()
        .run()
        .await?;

    let end = probe.snapshot();
    Ok(LoadTestReport::derive(&start, &end, &tally))
}
