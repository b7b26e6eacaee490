use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use sheetwright_domain::{CharacterDocument, CharacterId, ComputedSheet, DocumentEdit};

use super::session::{SaveOutcome, SaveRequest, SyncSession};
use super::state::SessionView;
use crate::config::SyncConfig;
use crate::ports::{CharacterPersistencePort, SavedSheet, SyncError};

enum Signal {
    Edited,
    Retry,
    Flush,
}

type SaveResult = (u64, Result<SavedSheet, SyncError>);

/// Session state shared between handles and the session task.
struct SessionCore {
    session: Mutex<SyncSession>,
    view: watch::Sender<SessionView>,
}

impl SessionCore {
    /// Mutate the session and publish the resulting view.
    ///
    /// The lock is never held across an await.
    fn update<R>(&self, f: impl FnOnce(&mut SyncSession) -> R) -> R {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut session);
        self.view.send_replace(session.view());
        result
    }

    fn read<R>(&self, f: impl FnOnce(&SyncSession) -> R) -> R {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }
}

/// Handle to an editing session running on its own task.
///
/// Edits are applied and published synchronously; saving happens in the
/// background. The task stops once every handle is dropped.
#[derive(Clone)]
pub struct SyncHandle {
    core: Arc<SessionCore>,
    signals: mpsc::UnboundedSender<Signal>,
}

impl SyncHandle {
    /// Run `session` on a new task. Must be called within a tokio runtime.
    pub fn spawn(
        session: SyncSession,
        port: Arc<dyn CharacterPersistencePort>,
        config: SyncConfig,
    ) -> Self {
        let (view, _) = watch::channel(session.view());
        let core = Arc::new(SessionCore {
            session: Mutex::new(session),
            view,
        });
        let (signals, rx) = mpsc::unbounded_channel();

        tokio::spawn(run_session(Arc::clone(&core), rx, port, config));

        Self { core, signals }
    }

    /// Load a character from the engine and start editing it.
    pub async fn open(
        port: Arc<dyn CharacterPersistencePort>,
        id: CharacterId,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        let record = port.load(id).await?;
        Ok(Self::spawn(SyncSession::from_record(record), port, config))
    }

    /// Create a character on the engine and start editing it.
    pub async fn create(
        port: Arc<dyn CharacterPersistencePort>,
        name: Option<String>,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        let record = port.create(name).await?;
        Ok(Self::spawn(SyncSession::from_record(record), port, config))
    }

    /// Apply an edit and return the recomputed sheet.
    pub fn edit(&self, edit: DocumentEdit) -> Result<ComputedSheet, SyncError> {
        if self.signals.is_closed() {
            return Err(SyncError::Closed);
        }
        let sheet = self
            .core
            .update(|session| session.apply_edit(edit).cloned())?;
        self.signal(Signal::Edited)?;
        Ok(sheet)
    }

    /// Resend the document after a failed save.
    pub fn retry(&self) -> Result<(), SyncError> {
        self.signal(Signal::Retry)
    }

    /// Save now instead of waiting out the debounce window.
    pub fn flush(&self) -> Result<(), SyncError> {
        self.signal(Signal::Flush)
    }

    pub fn view(&self) -> SessionView {
        self.core.view.borrow().clone()
    }

    /// Receive every published view.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.core.view.subscribe()
    }

    pub fn document(&self) -> CharacterDocument {
        self.core.read(|session| session.document().clone())
    }

    pub fn last_authoritative(&self) -> Option<ComputedSheet> {
        self.core.read(|session| session.last_authoritative().cloned())
    }

    fn signal(&self, signal: Signal) -> Result<(), SyncError> {
        self.signals.send(signal).map_err(|_| SyncError::Closed)
    }
}

async fn run_session(
    core: Arc<SessionCore>,
    mut signals: mpsc::UnboundedReceiver<Signal>,
    port: Arc<dyn CharacterPersistencePort>,
    config: SyncConfig,
) {
    let character_id = core.read(|session| session.character_id());
    let (results_tx, mut results) = mpsc::unbounded_channel::<SaveResult>();
    let mut deadline: Option<Instant> = None;
    let mut flush_requested = false;

    tracing::info!(character_id = %character_id, "Editing session started");

    let start_save = |request: Option<SaveRequest>| {
        if let Some(request) = request {
            send_save(
                Arc::clone(&port),
                character_id,
                request,
                config.request_timeout,
                results_tx.clone(),
            );
        }
    };

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(Signal::Edited) => {
                    deadline = Some(Instant::now() + config.debounce);
                }
                Some(Signal::Retry) => {
                    start_save(core.update(|session| session.retry()));
                }
                Some(Signal::Flush) => {
                    deadline = None;
                    let request = core.update(|session| session.begin_save());
                    flush_requested =
                        request.is_none() && core.read(|s| s.in_flight_revision().is_some());
                    start_save(request);
                }
                None => break,
            },
            () = wait_until(deadline) => {
                deadline = None;
                // With a save in flight this is a no-op; the response re-arms.
                start_save(core.update(|session| session.begin_save()));
            }
            Some((revision, result)) = results.recv() => {
                let mut outcome = core.update(|session| session.receive_save(revision, result));
                if outcome == SaveOutcome::Received {
                    // Subscribers get a turn to observe the reconciling view.
                    tokio::task::yield_now().await;
                    outcome = core.update(SyncSession::reconcile);
                }
                match outcome {
                    SaveOutcome::Superseded { .. } if flush_requested => {
                        flush_requested = false;
                        deadline = None;
                        start_save(core.update(|session| session.begin_save()));
                    }
                    SaveOutcome::Superseded { .. } => {
                        if deadline.is_none() {
                            deadline = Some(Instant::now() + config.debounce);
                        }
                    }
                    SaveOutcome::Stale | SaveOutcome::Received => {}
                    SaveOutcome::Applied { .. } | SaveOutcome::Failed => {
                        flush_requested = false;
                    }
                }
            }
        }
    }

    if core.read(|session| session.has_unsaved_edits()) {
        tracing::warn!(character_id = %character_id, "Editing session closed with unsaved edits");
    } else {
        tracing::info!(character_id = %character_id, "Editing session closed");
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn send_save(
    port: Arc<dyn CharacterPersistencePort>,
    character_id: CharacterId,
    request: SaveRequest,
    timeout: Duration,
    results: mpsc::UnboundedSender<SaveResult>,
) {
    tokio::spawn(async move {
        let SaveRequest { revision, document } = request;
        let result = tokio::time::timeout(timeout, port.save(character_id, revision, document))
            .await
            .unwrap_or_else(|_| Err(SyncError::Timeout(timeout)));
        // The session may have closed meanwhile.
        let _ = results.send((revision, result));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sync::SyncState;
    use crate::ports::MockCharacterPersistencePort;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use sheetwright_domain::{compute, Characteristic};
    use sheetwright_shared::CharacterRecord;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn saved(revision: u64, document: &CharacterDocument) -> SavedSheet {
        SavedSheet {
            revision,
            sheet: compute(document),
            saved_at: Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap(),
        }
    }

    /// Records every save and answers after `delay`.
    #[derive(Default)]
    struct RecordingPort {
        delay: Duration,
        failing: AtomicBool,
        saves: Mutex<Vec<(u64, CharacterDocument)>>,
    }

    impl RecordingPort {
        fn with_delay(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ..Self::default()
            })
        }

        fn saved_revisions(&self) -> Vec<u64> {
            self.saves.lock().unwrap().iter().map(|(r, _)| *r).collect()
        }
    }

    #[async_trait]
    impl CharacterPersistencePort for RecordingPort {
        async fn create(&self, _name: Option<String>) -> Result<CharacterRecord, SyncError> {
            Err(SyncError::Request("not used".into()))
        }

        async fn load(&self, id: CharacterId) -> Result<CharacterRecord, SyncError> {
            Err(SyncError::NotFound(id))
        }

        async fn save(
            &self,
            _id: CharacterId,
            revision: u64,
            document: CharacterDocument,
        ) -> Result<SavedSheet, SyncError> {
            self.saves.lock().unwrap().push((revision, document.clone()));
            tokio::time::sleep(self.delay).await;
            if self.failing.load(Ordering::SeqCst) {
                return Err(SyncError::Request("connection refused".into()));
            }
            Ok(saved(revision, &document))
        }
    }

    fn config() -> SyncConfig {
        SyncConfig {
            debounce: Duration::from_millis(400),
            request_timeout: Duration::from_secs(10),
        }
    }

    fn start(port: Arc<dyn CharacterPersistencePort>) -> SyncHandle {
        let session = SyncSession::new(CharacterId::new(), CharacterDocument::new("Aria"), 0);
        SyncHandle::spawn(session, port, config())
    }

    fn set_xp(xp: u64) -> DocumentEdit {
        DocumentEdit::SetXp { xp }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<SessionView>,
        pred: impl Fn(&SyncState) -> bool,
    ) -> SessionView {
        rx.wait_for(|view| pred(&view.state)).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn edit_is_visible_before_any_save() {
        let port = RecordingPort::with_delay(Duration::ZERO);
        let handle = start(port.clone());

        let sheet = handle
            .edit(DocumentEdit::SetCharacteristic {
                key: Characteristic::Body.key().to_string(),
                points: 8,
            })
            .unwrap();

        assert_eq!(sheet, compute(&handle.document()));
        let view = handle.view();
        assert_eq!(view.state, SyncState::Dirty);
        assert_eq!(view.sheet, sheet);
        assert!(view.has_unsaved_edits());
        assert!(port.saved_revisions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_are_debounced_into_one_save() {
        let port = RecordingPort::with_delay(Duration::ZERO);
        let handle = start(port.clone());
        let mut rx = handle.subscribe();

        for xp in [100, 200, 300] {
            handle.edit(set_xp(xp)).unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        // Last edit was 200ms ago.
        tokio::time::sleep(Duration::from_millis(199)).await;
        assert!(port.saved_revisions().is_empty());

        let view = wait_for(&mut rx, |s| *s == SyncState::Clean).await;

        assert_eq!(port.saved_revisions(), vec![3]);
        assert_eq!(port.saves.lock().unwrap()[0].1.xp, 300);
        assert_eq!(view.saved_revision, 3);
        assert_eq!(view.stats.saves_sent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn edits_during_save_start_a_new_cycle() {
        let port = RecordingPort::with_delay(Duration::from_millis(200));
        let handle = start(port.clone());
        let mut rx = handle.subscribe();

        handle.edit(set_xp(100)).unwrap();
        let first_document = handle.document();

        // Save for revision 1 goes out at 400ms and returns at 600ms.
        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(handle.view().state, SyncState::Saving { revision: 1 });

        handle.edit(set_xp(2_500)).unwrap();
        assert_eq!(handle.view().state, SyncState::Saving { revision: 1 });

        let view = wait_for(&mut rx, |s| *s == SyncState::Dirty).await;
        assert_eq!(view.saved_revision, 1);
        assert_eq!(view.sheet, compute(&handle.document()));
        assert_eq!(handle.last_authoritative(), Some(compute(&first_document)));

        let view = wait_for(&mut rx, |s| *s == SyncState::Clean).await;
        assert_eq!(port.saved_revisions(), vec![1, 2]);
        assert_eq!(view.saved_revision, 2);
        assert_eq!(view.stats.divergences, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reconciling_is_published_between_saving_and_clean() {
        let port = RecordingPort::with_delay(Duration::from_millis(50));
        let handle = start(port.clone());
        let mut rx = handle.subscribe();

        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().state.clone();
                let clean = state == SyncState::Clean;
                seen.push(state);
                if clean {
                    break;
                }
            }
            seen
        });

        handle.edit(set_xp(100)).unwrap();
        let seen = observer.await.unwrap();

        let saving = seen.iter().position(|s| *s == SyncState::Saving { revision: 1 });
        let reconciling = seen
            .iter()
            .position(|s| *s == SyncState::Reconciling { revision: 1 });
        assert!(saving.is_some(), "{seen:?}");
        assert!(reconciling > saving, "{seen:?}");
        assert_eq!(seen.last(), Some(&SyncState::Clean));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_waits_for_retry() {
        let port = RecordingPort::with_delay(Duration::ZERO);
        port.failing.store(true, Ordering::SeqCst);
        let handle = start(port.clone());
        let mut rx = handle.subscribe();

        handle.edit(set_xp(100)).unwrap();
        let view = wait_for(&mut rx, SyncState::is_error).await;
        assert_eq!(view.stats.saves_failed, 1);
        assert_eq!(view.sheet, compute(&handle.document()));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(port.saved_revisions(), vec![1]);

        port.failing.store(false, Ordering::SeqCst);
        handle.retry().unwrap();
        let view = wait_for(&mut rx, |s| *s == SyncState::Clean).await;
        assert_eq!(port.saved_revisions(), vec![1, 1]);
        assert_eq!(view.saved_revision, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_save_times_out() {
        let port = RecordingPort::with_delay(Duration::from_secs(30));
        let handle = start(port.clone());
        let mut rx = handle.subscribe();

        handle.edit(set_xp(100)).unwrap();
        let view = wait_for(&mut rx, SyncState::is_error).await;

        assert_eq!(
            view.state,
            SyncState::Error {
                message: "Save timed out after 10s".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn flush_skips_the_debounce_window() {
        let mut port = MockCharacterPersistencePort::new();
        port.expect_save()
            .times(1)
            .returning(|_, revision, document| Ok(saved(revision, &document)));
        let handle = start(Arc::new(port));
        let mut rx = handle.subscribe();

        let started = Instant::now();
        handle.edit(set_xp(100)).unwrap();
        handle.flush().unwrap();
        wait_for(&mut rx, |s| *s == SyncState::Clean).await;

        assert!(started.elapsed() < config().debounce);
    }

    #[tokio::test(start_paused = true)]
    async fn open_loads_record_then_saves_through_port() {
        let id = CharacterId::new();
        let document = CharacterDocument::new("Kest").with_level(4);
        let record = CharacterRecord {
            id: id.to_uuid(),
            revision: 5,
            saved_at: Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap(),
            sheet: compute(&document),
            document,
        };

        let mut port = MockCharacterPersistencePort::new();
        port.expect_load()
            .withf(move |requested| *requested == id)
            .times(1)
            .returning(move |_| Ok(record.clone()));
        port.expect_save()
            .withf(move |saved_id, revision, document| {
                *saved_id == id && *revision == 6 && document.name == "Kestrel"
            })
            .times(1)
            .returning(|_, revision, document| Ok(saved(revision, &document)));

        let handle = SyncHandle::open(Arc::new(port), id, config()).await.unwrap();
        assert_eq!(handle.view().revision, 5);
        let mut rx = handle.subscribe();

        handle
            .edit(DocumentEdit::SetName {
                name: "Kestrel".into(),
            })
            .unwrap();
        let view = wait_for(&mut rx, |s| *s == SyncState::Clean).await;
        assert_eq!(view.saved_revision, 6);
    }

    #[tokio::test]
    async fn open_surfaces_not_found() {
        let id = CharacterId::new();
        let mut port = MockCharacterPersistencePort::new();
        port.expect_load()
            .returning(|id| Err(SyncError::NotFound(id)));

        let err = SyncHandle::open(Arc::new(port), id, config())
            .await
            .err()
            .unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn refused_edit_is_reported() {
        let handle = start(RecordingPort::with_delay(Duration::ZERO));
        let err = handle
            .edit(DocumentEdit::RemoveSublimation { index: 2 })
            .unwrap_err();
        assert!(matches!(err, SyncError::Edit(_)));
        assert_eq!(handle.view().revision, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn task_stops_when_handles_are_dropped() {
        let handle = start(RecordingPort::with_delay(Duration::ZERO));
        let mut rx = handle.subscribe();
        drop(handle);

        assert!(rx.changed().await.is_err());
    }
}
