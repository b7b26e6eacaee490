use sheetwright_domain::{
    compute, CharacterDocument, CharacterId, ComputedSheet, DocumentEdit, DomainError,
};
use sheetwright_shared::CharacterRecord;

use super::state::{SessionView, SyncState, SyncStats};
use crate::ports::{SavedSheet, SyncError};

/// A save to send: the full document at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub revision: u64,
    pub document: CharacterDocument,
}

/// What a save response did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The authoritative sheet is now shown and the session is clean.
    Applied { diverged: bool },
    /// Saved, but newer edits arrived meanwhile; another save is needed.
    Superseded { diverged: bool },
    Failed,
    /// Not the answer to the in-flight save; nothing changed.
    Stale,
    /// Accepted and now `Reconciling`; [`SyncSession::reconcile`] settles it.
    Received,
}

struct InFlight {
    revision: u64,
    document: CharacterDocument,
}

/// An accepted save response waiting to be reconciled.
struct Received {
    revision: u64,
    document: CharacterDocument,
    sheet: ComputedSheet,
}

/// Editing-session state machine.
///
/// Every edit bumps the document revision and recomputes the sheet at once.
/// At most one save is in flight; it always carries the latest document at
/// the time it was started.
pub struct SyncSession {
    character_id: CharacterId,
    document: CharacterDocument,
    revision: u64,
    saved_revision: u64,
    sheet: ComputedSheet,
    last_authoritative: Option<ComputedSheet>,
    in_flight: Option<InFlight>,
    received: Option<Received>,
    state: SyncState,
    stats: SyncStats,
}

impl SyncSession {
    /// Start from a document already saved at `revision`.
    pub fn new(character_id: CharacterId, document: CharacterDocument, revision: u64) -> Self {
        let sheet = compute(&document);
        Self {
            character_id,
            document,
            revision,
            saved_revision: revision,
            sheet,
            last_authoritative: None,
            in_flight: None,
            received: None,
            state: SyncState::Clean,
            stats: SyncStats::default(),
        }
    }

    /// Start from a record loaded from the engine, showing its stored sheet.
    pub fn from_record(record: CharacterRecord) -> Self {
        let mut session = Self::new(
            CharacterId::from_uuid(record.id),
            record.document,
            record.revision,
        );
        session.note_divergence(record.revision, &record.sheet);
        session.sheet = record.sheet.clone();
        session.last_authoritative = Some(record.sheet);
        session
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn document(&self) -> &CharacterDocument {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn saved_revision(&self) -> u64 {
        self.saved_revision
    }

    /// The sheet to display.
    pub fn sheet(&self) -> &ComputedSheet {
        &self.sheet
    }

    /// Latest sheet the engine returned, possibly for an older revision.
    pub fn last_authoritative(&self) -> Option<&ComputedSheet> {
        self.last_authoritative.as_ref()
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn in_flight_revision(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|f| f.revision)
    }

    pub fn has_unsaved_edits(&self) -> bool {
        self.revision > self.saved_revision
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            character_id: self.character_id,
            state: self.state.clone(),
            revision: self.revision,
            saved_revision: self.saved_revision,
            sheet: self.sheet.clone(),
            stats: self.stats,
        }
    }

    /// Apply an edit and recompute. A refused edit changes nothing.
    pub fn apply_edit(&mut self, edit: DocumentEdit) -> Result<&ComputedSheet, DomainError> {
        let op = edit.op();
        self.document.apply(edit)?;
        self.revision += 1;
        self.sheet = compute(&self.document);

        // While saving, newer edits are noticed when the response is reconciled.
        if !matches!(
            self.state,
            SyncState::Saving { .. } | SyncState::Reconciling { .. }
        ) {
            self.state = SyncState::Dirty;
        }

        tracing::trace!(
            character_id = %self.character_id,
            revision = self.revision,
            op,
            "Edit applied"
        );
        Ok(&self.sheet)
    }

    /// Start a save of the current document, if one is due.
    ///
    /// Returns `None` unless the session is dirty with nothing in flight.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        if self.state != SyncState::Dirty || self.in_flight.is_some() {
            return None;
        }

        let request = SaveRequest {
            revision: self.revision,
            document: self.document.clone(),
        };
        self.in_flight = Some(InFlight {
            revision: request.revision,
            document: request.document.clone(),
        });
        self.state = SyncState::Saving {
            revision: request.revision,
        };
        self.stats.saves_sent += 1;

        tracing::debug!(
            character_id = %self.character_id,
            revision = request.revision,
            "Saving character"
        );
        Some(request)
    }

    /// Resend after a failure. Only valid in the error state.
    pub fn retry(&mut self) -> Option<SaveRequest> {
        if !self.state.is_error() {
            return None;
        }
        self.state = SyncState::Dirty;
        self.begin_save()
    }

    /// Apply the result of the save started for `revision`, reconciling at once.
    pub fn complete_save(
        &mut self,
        revision: u64,
        result: Result<SavedSheet, SyncError>,
    ) -> SaveOutcome {
        match self.receive_save(revision, result) {
            SaveOutcome::Received => self.reconcile(),
            other => other,
        }
    }

    /// Accept the result of the save started for `revision`.
    ///
    /// A successful answer moves the session to `Reconciling` and returns
    /// [`SaveOutcome::Received`]; anything else settles here.
    pub fn receive_save(
        &mut self,
        revision: u64,
        result: Result<SavedSheet, SyncError>,
    ) -> SaveOutcome {
        let sent = match self.in_flight.take() {
            Some(sent) if sent.revision == revision => sent,
            other => {
                self.in_flight = other;
                self.stats.stale_responses_ignored += 1;
                tracing::debug!(
                    character_id = %self.character_id,
                    revision,
                    in_flight = ?self.in_flight_revision(),
                    "Ignoring stale save response"
                );
                return SaveOutcome::Stale;
            }
        };

        let saved = match result {
            Ok(saved) if saved.revision == revision => saved,
            Ok(saved) => {
                self.stats.stale_responses_ignored += 1;
                return self.fail(
                    revision,
                    format!(
                        "engine answered revision {} for revision {revision}",
                        saved.revision
                    ),
                );
            }
            Err(error) => return self.fail(revision, error.to_string()),
        };

        self.saved_revision = revision;
        self.state = SyncState::Reconciling { revision };
        self.received = Some(Received {
            revision,
            document: sent.document,
            sheet: saved.sheet,
        });
        SaveOutcome::Received
    }

    /// Compare the received sheet with the local one and settle to `Clean`,
    /// or to `Dirty` when edits arrived meanwhile.
    ///
    /// Returns [`SaveOutcome::Stale`] when nothing was received.
    pub fn reconcile(&mut self) -> SaveOutcome {
        let Some(Received {
            revision,
            document,
            sheet,
        }) = self.received.take()
        else {
            return SaveOutcome::Stale;
        };
        let diverged = self.note_divergence_for(&document, revision, &sheet);

        if self.revision == revision {
            self.sheet = sheet.clone();
            self.last_authoritative = Some(sheet);
            self.state = SyncState::Clean;
            tracing::debug!(character_id = %self.character_id, revision, "Character clean");
            SaveOutcome::Applied { diverged }
        } else {
            self.last_authoritative = Some(sheet);
            self.state = SyncState::Dirty;
            tracing::debug!(
                character_id = %self.character_id,
                saved = revision,
                current = self.revision,
                "Edits arrived during save"
            );
            SaveOutcome::Superseded { diverged }
        }
    }

    fn fail(&mut self, revision: u64, message: String) -> SaveOutcome {
        self.stats.saves_failed += 1;
        tracing::warn!(
            character_id = %self.character_id,
            revision,
            error = %message,
            "Save failed"
        );
        self.state = SyncState::Error { message };
        SaveOutcome::Failed
    }

    fn note_divergence(&mut self, revision: u64, authoritative: &ComputedSheet) -> bool {
        let document = self.document.clone();
        self.note_divergence_for(&document, revision, authoritative)
    }

    /// Compare a local computation of `document` with the engine's sheet for it.
    fn note_divergence_for(
        &mut self,
        document: &CharacterDocument,
        revision: u64,
        authoritative: &ComputedSheet,
    ) -> bool {
        let local = compute(document);
        if &local == authoritative {
            return false;
        }

        self.stats.divergences += 1;
        tracing::error!(
            character_id = %self.character_id,
            revision,
            sections = ?local.differing_sections(authoritative),
            "Local sheet diverges from authoritative sheet"
        );
        true
    }
}
