use crate::metrics::recorder::record_batch_launched;
use crate::scheduler::error::SchedulerResult;
use crate::scheduler::types::{LaunchPlan, LaunchSettings};
use crate::session::{run_session, Connector, SessionOutcome, SessionParams};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::info;

/// A spawned session that has not necessarily finished yet
#[derive(Debug)]
pub struct SessionHandle {
    pub index: usize,
    pub handle: JoinHandle<SessionOutcome>,
}

/// Spawn `settings.total` sessions in batches of `settings.batch_size`,
/// sleeping `settings.batch_delay` between batches.
///
/// Returns as soon as the last batch is spawned; sessions keep running in
/// the background until their own deadline. With `max_in_flight` set, a
/// session first queues for a slot and then gets the full `duration`.
pub async fn launch<C: Connector>(
    connector: Arc<C>,
    params: Arc<SessionParams>,
    settings: &LaunchSettings,
) -> SchedulerResult<Vec<SessionHandle>> {
    let plan = LaunchPlan::new(settings.total, settings.batch_size)?;
    let permits = settings.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));
    let batch_count = plan.batch_count();

    let mut handles = Vec::with_capacity(plan.total());

    for (batch_no, batch) in plan.batches().enumerate() {
        let size = batch.len();

        for index in batch {
            let connector = connector.clone();
            let params = params.clone();
            let permits = permits.clone();
            let duration = settings.duration;

            let handle = tokio::spawn(async move {
                // Held until the session's socket is gone. A closed semaphore
                // only means no cap is left to honour.
                let _permit = match permits {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };

                // The lifetime starts once a slot is held
                let deadline = Instant::now() + duration;
                run_session(&*connector, &params, index, deadline).await
            });

            handles.push(SessionHandle { index, handle });
        }

        record_batch_launched(size);
        info!("Launched {}/{}...", handles.len(), plan.total());

        if batch_no + 1 < batch_count {
            time::sleep(settings.batch_delay).await;
        }
    }

    Ok(handles)
}
