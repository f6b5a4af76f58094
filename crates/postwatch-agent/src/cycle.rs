//! The agent's probe → report → diff → persist cycle

use postwatch_api::{PostureSnapshot, ReportPayload};
use postwatch_probe::SystemProbe;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::sink::ReportSink;
use crate::state::{LocalAgentState, StateError, StateFile};

/// What a completed cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Posture changed (or first run) and the new state was persisted
    Reported,
    /// Posture identical to the previous cycle; local state untouched
    NoChange,
    /// Submission to the collector failed; local bookkeeping still ran
    SendFailed,
}

/// Outcome plus the snapshot the cycle observed
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub snapshot: PostureSnapshot,
}

/// Errors that abort a cycle
///
/// Only local state persistence failures do; probe and transport failures
/// degrade inside the cycle instead.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    State(#[from] StateError),
}

/// Run one full cycle
///
/// The report is submitted every cycle regardless of the diff outcome; the
/// diff gates only local persistence. A transport failure is logged, local
/// bookkeeping still runs, and the next scheduled cycle acts as the retry.
/// A cycle with no previous local state always counts as a change.
#[instrument(skip_all, fields(device_id = %device_id))]
pub async fn run_cycle(
    device_id: &str,
    probe: &dyn SystemProbe,
    state_file: &StateFile,
    sink: &dyn ReportSink,
) -> Result<CycleReport, CycleError> {
    let current = probe.sample().await;

    let payload = ReportPayload::from_snapshot(device_id, &current);
    let send_failed = match sink.submit(&payload).await {
        Ok(()) => {
            info!("report submitted");
            false
        }
        Err(e) => {
            warn!(error = %e, "report submission failed");
            true
        }
    };

    let previous = match state_file.load() {
        Ok(previous) => previous,
        Err(e) => {
            warn!(error = %e, "discarding unreadable local state");
            None
        }
    };

    let changed = previous.is_none_or(|state| state.last_snapshot != current);
    if changed {
        state_file.save(&LocalAgentState {
            last_snapshot: current.clone(),
        })?;
        info!("posture change persisted");
    } else {
        info!("no posture change");
    }

    let outcome = if send_failed {
        CycleOutcome::SendFailed
    } else if changed {
        CycleOutcome::Reported
    } else {
        CycleOutcome::NoChange
    };

    Ok(CycleReport {
        outcome,
        snapshot: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use async_trait::async_trait;
    use chrono::Utc;
    use postwatch_api::{
        AntivirusStatus, DiskEncryption, OsUpdateStatus, PostureSnapshot, SleepSetting,
    };
    use std::sync::Mutex;

    struct FixedProbe {
        snapshot: PostureSnapshot,
    }

    #[async_trait]
    impl SystemProbe for FixedProbe {
        async fn sample(&self) -> PostureSnapshot {
            self.snapshot.clone()
        }
    }

    struct RecordingSink {
        submissions: Mutex<Vec<ReportPayload>>,
        fail: bool,
    }

    impl RecordingSink {
        fn working() -> Self {
            Self {
                submissions: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                submissions: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn submission_count(&self) -> usize {
            self.submissions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        async fn submit(&self, payload: &ReportPayload) -> Result<(), SinkError> {
            self.submissions.lock().unwrap().push(payload.clone());
            if self.fail {
                Err(SinkError::Submit("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn snapshot_a() -> PostureSnapshot {
        PostureSnapshot {
            disk_encryption: DiskEncryption::Disabled,
            os_update: OsUpdateStatus::UpToDate,
            antivirus: AntivirusStatus::Active,
            sleep_settings: SleepSetting::Compliant { minutes: 5 },
            sampled_at: Utc::now(),
        }
    }

    fn snapshot_b() -> PostureSnapshot {
        PostureSnapshot {
            disk_encryption: DiskEncryption::Enabled,
            ..snapshot_a()
        }
    }

    fn state_file(test: &str) -> StateFile {
        let dir = std::env::temp_dir().join(format!("postwatch-cycle-test-{test}"));
        let _ = std::fs::remove_dir_all(&dir);
        StateFile::new(dir.join("state.json"))
    }

    #[tokio::test]
    async fn first_run_reports_and_persists() {
        let probe = FixedProbe {
            snapshot: snapshot_a(),
        };
        let sink = RecordingSink::working();
        let state = state_file("first-run");

        let report = run_cycle("d1", &probe, &state, &sink).await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::Reported);
        assert_eq!(sink.submission_count(), 1);
        assert_eq!(
            state.load().unwrap().unwrap().last_snapshot,
            snapshot_a()
        );
    }

    #[tokio::test]
    async fn identical_second_cycle_is_no_change_but_still_submits() {
        let probe = FixedProbe {
            snapshot: snapshot_a(),
        };
        let sink = RecordingSink::working();
        let state = state_file("identical");

        let first = run_cycle("d1", &probe, &state, &sink).await.unwrap();
        assert_eq!(first.outcome, CycleOutcome::Reported);

        let second = run_cycle("d1", &probe, &state, &sink).await.unwrap();
        assert_eq!(second.outcome, CycleOutcome::NoChange);

        // at-least-once: submission happens on every cycle regardless of diff
        assert_eq!(sink.submission_count(), 2);
    }

    #[tokio::test]
    async fn changed_posture_reports_and_replaces_state() {
        let sink = RecordingSink::working();
        let state = state_file("changed");
        state
            .save(&LocalAgentState {
                last_snapshot: snapshot_a(),
            })
            .unwrap();

        let probe = FixedProbe {
            snapshot: snapshot_b(),
        };
        let report = run_cycle("d1", &probe, &state, &sink).await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::Reported);
        assert_eq!(
            state.load().unwrap().unwrap().last_snapshot,
            snapshot_b()
        );
    }

    #[tokio::test]
    async fn send_failure_still_persists_state() {
        let probe = FixedProbe {
            snapshot: snapshot_a(),
        };
        let sink = RecordingSink::failing();
        let state = state_file("send-failure");

        let report = run_cycle("d1", &probe, &state, &sink).await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::SendFailed);
        assert!(state.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn send_failure_wins_over_no_change() {
        let probe = FixedProbe {
            snapshot: snapshot_a(),
        };
        let state = state_file("send-failure-no-change");
        state
            .save(&LocalAgentState {
                last_snapshot: snapshot_a(),
            })
            .unwrap();

        let sink = RecordingSink::failing();
        let report = run_cycle("d1", &probe, &state, &sink).await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::SendFailed);
    }

    #[tokio::test]
    async fn payload_carries_wire_strings() {
        let probe = FixedProbe {
            snapshot: snapshot_a(),
        };
        let sink = RecordingSink::working();
        let state = state_file("payload");

        run_cycle("device_001", &probe, &state, &sink).await.unwrap();

        let submissions = sink.submissions.lock().unwrap();
        assert_eq!(submissions[0].device_id, "device_001");
        assert_eq!(submissions[0].disk_encryption, "Disabled");
        assert_eq!(submissions[0].sleep_settings, "Sleep OK (5 min)");
    }

}
