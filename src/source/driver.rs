//! Fixed-interval sampling loop.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use super::{ChannelSource, MetricsProvider};
use crate::data::{Dashboard, Monitor};

/// Start sampling every `interval` on the current tokio runtime.
///
/// The monitor moves into the background task and is only ever used there.
/// Each tick runs on the blocking pool because the CPU measurement sleeps.
/// A tick that overruns the interval delays the next one instead of
/// bunching them up, so the effective period is never shorter than one
/// sample.
///
/// The loop ends when the returned source is dropped or the handle is
/// aborted.
pub fn spawn_monitor<P>(monitor: Monitor<P>, interval: Duration) -> (ChannelSource, JoinHandle<()>)
where
    P: MetricsProvider + 'static,
{
    let (tx, source) = ChannelSource::create(monitor.description());
    let handle = tokio::spawn(drive(monitor, tx, interval));
    (source, handle)
}

async fn drive<P>(mut monitor: Monitor<P>, tx: watch::Sender<Option<Dashboard>>, interval: Duration)
where
    P: MetricsProvider + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tx.closed() => break,
        }

        let result = tokio::task::spawn_blocking(move || {
            let dashboard = monitor.tick();
            (monitor, dashboard)
        })
        .await;

        let dashboard = match result {
            Ok((returned, dashboard)) => {
                monitor = returned;
                dashboard
            }
            Err(e) => {
                error!(error = %e, "sampling task failed");
                return;
            }
        };

        if tx.send(Some(dashboard)).is_err() {
            break;
        }
    }

    debug!("sampling loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sampler::tests::ScriptedProvider;
    use crate::data::MonitorConfig;
    use crate::source::DataSource;

    async fn next_dashboard(source: &mut ChannelSource) -> Dashboard {
        loop {
            if let Some(dashboard) = source.poll() {
                return dashboard;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_spawn_monitor_publishes_ticks() {
        let monitor = Monitor::new(ScriptedProvider::default(), MonitorConfig::default());
        let (mut source, handle) = spawn_monitor(monitor, Duration::from_millis(10));
        assert_eq!(source.description(), "scripted");

        let first = next_dashboard(&mut source).await;
        let second = next_dashboard(&mut source).await;
        assert!(second.sequence > first.sequence);
        assert!(second.history.len() >= 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_loop_stops_when_source_dropped() {
        let monitor = Monitor::new(ScriptedProvider::default(), MonitorConfig::default());
        let (mut source, handle) = spawn_monitor(monitor, Duration::from_millis(5));
        next_dashboard(&mut source).await;

        drop(source);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop did not stop")
            .unwrap();
    }
}
