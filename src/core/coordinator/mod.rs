//! # Coordinator Module
//!
//! The single mediator between the list, preview and status regions.
//!
//! Display regions never talk to each other. They either call the
//! coordinator directly from the foreground or queue [`Command`]s through
//! a [`CoordinatorHandle`]; the coordinator updates [`ListState`] and
//! [`PreviewDispatcher`] and pushes the results to the views.
//!
//! ## Threading
//! The coordinator and everything it owns live on one foreground thread.
//! Scans and thumbnail generation run elsewhere and their results are
//! picked up by [`SelectionCoordinator::process_pending`], together with
//! any queued commands.
//!
//! ## Example
//! ```rust,ignore
//! use dupe_browser::core::coordinator::SelectionCoordinator;
//!
//! let mut browser = SelectionCoordinator::builder()
//!     .status_view(|update: &StatusUpdate| println!("{}", update.label))
//!     .build()?;
//! browser.open_directory("/Users/me/Downloads");
//! browser.finish_scan(Duration::from_secs(60));
//! browser.select([0]);
//! ```

mod command;
mod config;
mod view;

pub use command::{Command, CoordinatorHandle};
pub use config::{BrowserBuilder, BrowserConfig};
pub use view::{DetachedView, PreviewView, StatusUpdate, StatusView};

use crate::core::fileops::FileOperations;
use crate::core::list::ListState;
use crate::core::model::Entry;
use crate::core::preview::{Preview, PreviewDispatcher};
use crate::core::scan::{DirectoryScanSession, ScanEpoch, ScanOutcome};
use crate::core::thumbnail::{
    PendingThumbnail, SlotBinding, SlotId, SlotImage, ThumbnailCache, ThumbnailFetch,
    ThumbnailKey, ThumbnailSlots,
};
use crate::error::FileOpError;
use crate::events::{
    DeleteEvent, Event, EventSender, ListEvent, SelectionEvent, ThumbnailEvent,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one delete action
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// Files moved to the trash
    pub trashed: Vec<PathBuf>,
    /// Files that could not be moved, with the reason
    pub failed: Vec<(PathBuf, FileOpError)>,
    /// Rows removed from the list (trashed or not)
    pub removed: usize,
}

impl DeleteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of opening a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Handed to the default application
    Opened(PathBuf),
    /// The file was gone; its row was dropped
    Vanished(PathBuf),
    /// No such row
    NoEntry,
}

/// What one [`SelectionCoordinator::process_pending`] pass did
#[derive(Debug, Default)]
pub struct PendingSummary {
    pub commands: usize,
    /// Epoch of a scan whose entries were applied
    pub scan: Option<ScanEpoch>,
    /// Slots that received a thumbnail (or a failure)
    pub delivered: Vec<SlotId>,
    /// Reports of delete commands
    pub deletes: Vec<DeleteReport>,
}

/// The mediator
pub struct SelectionCoordinator {
    list: ListState,
    preview: PreviewDispatcher,
    scan: DirectoryScanSession,
    thumbnails: ThumbnailCache,
    slots: ThumbnailSlots,
    pending: Vec<(SlotBinding, PendingThumbnail)>,
    file_ops: Arc<dyn FileOperations>,
    preview_view: Box<dyn PreviewView>,
    status_view: Box<dyn StatusView>,
    commands: Receiver<Command>,
    command_sender: Sender<Command>,
    events: EventSender,
}

impl SelectionCoordinator {
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    pub(crate) fn assemble(
        scan: DirectoryScanSession,
        thumbnails: ThumbnailCache,
        preview: PreviewDispatcher,
        file_ops: Arc<dyn FileOperations>,
        preview_view: Box<dyn PreviewView>,
        status_view: Box<dyn StatusView>,
        events: EventSender,
    ) -> Self {
        let (command_sender, commands) = unbounded();
        Self {
            list: ListState::new(),
            preview,
            scan,
            thumbnails,
            slots: ThumbnailSlots::new(),
            pending: Vec::new(),
            file_ops,
            preview_view,
            status_view,
            commands,
            command_sender,
            events,
        }
    }

    /// A handle display regions can queue commands through
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle::new(self.command_sender.clone())
    }

    // ---- directory ----------------------------------------------------

    /// Start browsing a directory. The list empties immediately and fills
    /// when the scan lands.
    pub fn open_directory(&mut self, directory: impl AsRef<Path>) -> ScanEpoch {
        let directory = directory.as_ref();

        self.list.set_directory(directory);
        self.list.clear();
        self.slots.clear();
        self.pending.clear();
        self.events
            .send(Event::List(ListEvent::Replaced { entries: 0 }));

        self.show_preview(None);
        self.report_status();

        self.scan.start(directory)
    }

    /// Block until the current scan lands and apply it
    pub fn finish_scan(&mut self, timeout: Duration) -> Option<ScanEpoch> {
        let outcome = self.scan.wait(timeout)?;
        Some(self.apply_scan(outcome))
    }

    fn apply_scan(&mut self, outcome: ScanOutcome) -> ScanEpoch {
        let entries = outcome.entries.len();
        self.list.replace_all(outcome.entries);
        self.events
            .send(Event::List(ListEvent::Replaced { entries }));
        outcome.epoch
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_busy()
    }

    // ---- selection ----------------------------------------------------

    /// Replace the selection and sync the preview and status regions
    pub fn select(&mut self, rows: impl IntoIterator<Item = usize>) {
        self.list.select(rows);
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        let single = self.list.single_selected().cloned();
        self.show_preview(single.as_ref());
        self.report_status();
    }

    fn show_preview(&mut self, entry: Option<&Entry>) {
        let preview = self.preview.show(entry);
        self.preview_view.show(preview);
    }

    fn report_status(&mut self) {
        let update = StatusUpdate::new(self.list.active_label(), self.list.selected_count());
        self.events.send(Event::Selection(SelectionEvent::Changed {
            label: update.label.clone(),
            count: update.count,
        }));
        self.status_view.update_selected(&update);
    }

    // ---- deletion -----------------------------------------------------

    /// Trash every selected file
    pub fn delete_selected_files(&mut self) -> DeleteReport {
        let targets = self.list.selected_indices();
        self.delete_rows(targets)
    }

    /// Trash the clicked row, or the whole selection if the row is in it
    pub fn delete_row(&mut self, row: usize) -> DeleteReport {
        let targets = if self.list.is_selected(row) {
            self.list.selected_indices()
        } else {
            vec![row]
        };
        self.delete_rows(targets)
    }

    fn delete_rows(&mut self, rows: Vec<usize>) -> DeleteReport {
        let targets: Vec<(usize, PathBuf)> = rows
            .into_iter()
            .filter_map(|row| self.list.get(row).map(|e| (row, e.path().to_path_buf())))
            .collect();

        let mut report = DeleteReport::default();
        if targets.is_empty() {
            return report;
        }

        // A playing video must let go of its file before it is moved.
        self.preview.hide();

        for (_, path) in &targets {
            match self.file_ops.trash(path) {
                Ok(()) => {
                    debug!("Trashed {}", path.display());
                    self.events
                        .send(Event::Delete(DeleteEvent::Trashed { path: path.clone() }));
                    report.trashed.push(path.clone());
                }
                Err(e) => {
                    warn!("Delete failed: {}", e);
                    self.events.send(Event::Delete(DeleteEvent::Failed {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                    report.failed.push((path.clone(), e));
                }
            }
        }

        report.removed = self
            .list
            .remove(targets.iter().map(|(row, _)| *row))
            .len();
        self.list.clear_selection();

        info!(
            "Deleted {} files ({} failed)",
            report.trashed.len(),
            report.failed.len()
        );
        self.events.send(Event::List(ListEvent::Removed {
            removed: report.removed,
            remaining: self.list.count(),
        }));
        self.events.send(Event::Delete(DeleteEvent::Completed {
            trashed: report.trashed.len(),
            failed: report.failed.len(),
        }));

        self.show_preview(None);
        self.report_status();
        report
    }

    // ---- opening ------------------------------------------------------

    /// Open a row with the default application.
    ///
    /// A row whose file has vanished is dropped. The preview only changes
    /// when that row was part of the selection.
    pub fn open_entry(&mut self, row: usize) -> Result<OpenOutcome, FileOpError> {
        let Some(path) = self.list.get(row).map(|e| e.path().to_path_buf()) else {
            return Ok(OpenOutcome::NoEntry);
        };

        if !self.file_ops.exists(&path) {
            debug!("{} vanished, dropping its row", path.display());
            let selected_before = self.list.selected_count();
            self.list.remove([row]);
            self.events
                .send(Event::List(ListEvent::Vanished { path: path.clone() }));
            if self.list.selected_count() != selected_before {
                self.sync_selection();
            }
            return Ok(OpenOutcome::Vanished(path));
        }

        self.file_ops.open_default(&path)?;
        Ok(OpenOutcome::Opened(path))
    }

    /// Open the file behind the "preview unavailable" placeholder.
    ///
    /// Returns `false` when no placeholder is shown.
    pub fn open_externally(&mut self) -> Result<bool, FileOpError> {
        match self.preview.external_target() {
            Some(path) => {
                self.file_ops.open_default(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The preview region went away; stop playback
    pub fn hide_preview(&mut self) {
        self.preview.hide();
    }

    // ---- thumbnails ---------------------------------------------------

    /// Bind a display slot to a row and request its thumbnail
    pub fn bind_thumbnail(&mut self, slot: SlotId, row: usize) -> &SlotImage {
        let Some(entry) = self.list.get(row) else {
            self.slots.unbind(slot);
            return self.slots.image(slot);
        };

        if !entry.content_type().has_thumbnail() {
            self.slots.bind_placeholder(slot);
            return self.slots.image(slot);
        }

        let key = ThumbnailKey::from(entry.path());
        let content_type = entry.content_type();
        let binding = self.slots.bind(slot, key.clone());

        match self.thumbnails.get_or_create(key, content_type) {
            ThumbnailFetch::Ready(thumbnail) => {
                self.slots.deliver(&binding, Ok(thumbnail));
            }
            ThumbnailFetch::Pending(handle) => self.pending.push((binding, handle)),
            ThumbnailFetch::Unsupported => self.slots.bind_placeholder(slot),
        }
        self.slots.image(slot)
    }

    pub fn unbind_thumbnail(&mut self, slot: SlotId) {
        self.slots.unbind(slot);
    }

    pub fn slot_image(&self, slot: SlotId) -> &SlotImage {
        self.slots.image(slot)
    }

    /// Number of thumbnail deliveries not yet picked up
    pub fn pending_thumbnails(&self) -> usize {
        self.pending.len()
    }

    fn collect_thumbnails(&mut self) -> Vec<SlotId> {
        let mut delivered = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());

        for (binding, handle) in self.pending.drain(..) {
            match handle.try_take() {
                None => waiting.push((binding, handle)),
                Some(result) => {
                    if self.slots.deliver(&binding, result) {
                        delivered.push(binding.slot());
                    } else {
                        debug!(
                            "Dropping stale thumbnail for {}",
                            binding.key().path().display()
                        );
                        self.events.send(Event::Thumbnail(ThumbnailEvent::StaleDropped {
                            path: binding.key().path().to_path_buf(),
                        }));
                    }
                }
            }
        }

        self.pending = waiting;
        delivered
    }

    /// Pump pending thumbnails until none are left or `timeout` passes
    pub fn settle_thumbnails(&mut self, timeout: Duration) -> Vec<SlotId> {
        let deadline = Instant::now() + timeout;
        let mut delivered = Vec::new();
        loop {
            delivered.extend(self.collect_thumbnails());
            if self.pending.is_empty() || Instant::now() >= deadline {
                return delivered;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    // ---- pump ---------------------------------------------------------

    /// Apply queued commands in arrival order, then pick up finished scans
    /// and thumbnails.
    pub fn process_pending(&mut self) -> PendingSummary {
        let mut summary = PendingSummary::default();

        while let Ok(command) = self.commands.try_recv() {
            summary.commands += 1;
            self.apply(command, &mut summary);
        }

        if let Some(outcome) = self.scan.poll() {
            summary.scan = Some(self.apply_scan(outcome));
        }

        summary.delivered = self.collect_thumbnails();
        summary
    }

    fn apply(&mut self, command: Command, summary: &mut PendingSummary) {
        match command {
            Command::OpenDirectory(directory) => {
                self.open_directory(directory);
            }
            Command::Select(rows) => self.select(rows),
            Command::DeleteSelected => summary.deletes.push(self.delete_selected_files()),
            Command::DeleteRow(row) => summary.deletes.push(self.delete_row(row)),
            Command::OpenEntry(row) => {
                if let Err(e) = self.open_entry(row) {
                    warn!("{}", e);
                }
            }
            Command::HidePreview => self.hide_preview(),
            Command::OpenExternally => {
                if let Err(e) = self.open_externally() {
                    warn!("{}", e);
                }
            }
            Command::BindThumbnail { slot, row } => {
                self.bind_thumbnail(slot, row);
            }
            Command::UnbindThumbnail(slot) => self.unbind_thumbnail(slot),
        }
    }

    // ---- state --------------------------------------------------------

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn preview(&self) -> &Preview {
        self.preview.current()
    }

    /// Whether a video preview is playing
    pub fn is_playing(&self) -> bool {
        self.preview.is_playing()
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ContentType, DuplicateGroup, FoundFile};
    use crate::core::preview::HeadlessPlaybackBackend;
    use crate::core::thumbnail::ThumbnailGenerator;
    use crate::error::{ScanError, ThumbnailError};
    use crate::events::EventChannel;
    use image::DynamicImage;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::fs;
    use std::rc::Rc;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);

    #[derive(Default)]
    struct FakeFiles {
        missing: Mutex<HashSet<PathBuf>>,
        locked: HashSet<PathBuf>,
        trashed: Mutex<Vec<PathBuf>>,
        opened: Mutex<Vec<PathBuf>>,
    }

    impl FileOperations for FakeFiles {
        fn exists(&self, path: &Path) -> bool {
            !self.missing.lock().unwrap().contains(path)
        }

        fn trash(&self, path: &Path) -> Result<(), FileOpError> {
            if self.locked.contains(path) {
                return Err(FileOpError::Trash {
                    path: path.to_path_buf(),
                    reason: "locked".to_string(),
                });
            }
            self.trashed.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn open_default(&self, path: &Path) -> Result<(), FileOpError> {
            self.opened.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    /// Holds `a1.jpg` until released; every image gets a size telling
    /// the files apart.
    struct GatedGenerator {
        gate: Receiver<()>,
    }

    impl ThumbnailGenerator for GatedGenerator {
        fn generate(
            &self,
            path: &Path,
            _content_type: ContentType,
        ) -> Result<DynamicImage, ThumbnailError> {
            if path.ends_with("a1.jpg") {
                let _ = self.gate.recv_timeout(WAIT);
                return Ok(DynamicImage::new_rgb8(2, 2));
            }
            Ok(DynamicImage::new_rgb8(3, 3))
        }
    }

    /// Rows: 0 a1.jpg, 1 a2.jpg, 2 b1.mp4, 3 c1.bin, 4 c2.bin
    const ROWS: [&str; 5] = ["a1.jpg", "a2.jpg", "b1.mp4", "c1.bin", "c2.bin"];

    struct Harness {
        dir: TempDir,
        browser: SelectionCoordinator,
        files: Arc<FakeFiles>,
        previews: Rc<RefCell<Vec<String>>>,
        statuses: Rc<RefCell<Vec<StatusUpdate>>>,
        playback: HeadlessPlaybackBackend,
    }

    impl Harness {
        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn label(&self, name: &str) -> String {
            self.path(name).display().to_string()
        }

        fn last_status(&self) -> StatusUpdate {
            self.statuses.borrow().last().cloned().unwrap()
        }

        fn last_preview(&self) -> Option<String> {
            self.previews.borrow().last().cloned()
        }
    }

    fn harness(configure: impl FnOnce(&Path, &mut FakeFiles)) -> Harness {
        harness_with(configure, |builder| builder)
    }

    fn harness_with(
        configure: impl FnOnce(&Path, &mut FakeFiles),
        customize: impl FnOnce(BrowserBuilder) -> BrowserBuilder,
    ) -> Harness {
        let dir = TempDir::new().unwrap();
        for name in ROWS {
            // Garbage everywhere: images and binaries never decode
            fs::write(dir.path().join(name), [0xFF, 0x00, 0xD8]).unwrap();
        }

        let mut files = FakeFiles::default();
        configure(dir.path(), &mut files);
        let files = Arc::new(files);

        let root = dir.path().to_path_buf();
        let detector = move |_: &Path| -> Result<Vec<DuplicateGroup>, ScanError> {
            let group = |names: &[&str]| {
                DuplicateGroup::new(names.iter().map(|n| FoundFile::classify(root.join(n))).collect())
            };
            Ok(vec![
                group(&ROWS[0..2]),
                group(&ROWS[2..3]),
                group(&ROWS[3..5]),
            ])
        };

        let previews = Rc::new(RefCell::new(Vec::new()));
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let playback = HeadlessPlaybackBackend::new();

        let preview_log = previews.clone();
        let status_log = statuses.clone();
        let builder = SelectionCoordinator::builder()
            .detector(Arc::new(detector))
            .file_operations(files.clone())
            .playback(Box::new(playback.clone()))
            .preview_view(move |p: &Preview| preview_log.borrow_mut().push(p.kind().to_string()))
            .status_view(move |u: &StatusUpdate| status_log.borrow_mut().push(u.clone()));
        let mut browser = customize(builder).build().unwrap();

        browser.open_directory(dir.path());
        browser.finish_scan(WAIT).unwrap();
        previews.borrow_mut().clear();
        statuses.borrow_mut().clear();

        Harness {
            dir,
            browser,
            files,
            previews,
            statuses,
            playback,
        }
    }

    fn plain() -> Harness {
        harness(|_, _| {})
    }

    #[test]
    fn open_directory_resets_regions_before_the_scan_lands() {
        let mut h = plain();
        h.browser.select([0, 1]);

        h.browser.open_directory("/elsewhere");

        assert_eq!(h.browser.list().count(), 0);
        assert_eq!(h.last_preview().as_deref(), Some("empty"));
        assert_eq!(h.last_status(), StatusUpdate::new("/elsewhere", 0));
        assert!(!h.last_status().delete_enabled);
    }

    #[test]
    fn multi_selection_shows_nothing_and_counts() {
        let mut h = plain();

        h.browser.select([0, 1]);

        assert_eq!(*h.previews.borrow(), vec!["empty"]);
        let status = h.last_status();
        assert_eq!(status.label, "2 selected");
        assert!(status.delete_enabled);
    }

    #[test]
    fn single_video_selection_plays_until_deselected() {
        let mut h = plain();

        h.browser.select([2]);
        assert_eq!(h.browser.preview().kind(), "video");
        assert_eq!(h.playback.live(), 1);
        assert_eq!(h.last_status().label, h.label("b1.mp4"));

        h.browser.select(Vec::new());
        assert_eq!(h.playback.live(), 0);
        assert_eq!(h.last_status().label, h.dir.path().display().to_string());
    }

    #[test]
    fn hide_preview_stops_playback() {
        let mut h = plain();
        h.browser.select([2]);
        h.browser.hide_preview();
        assert!(!h.browser.is_playing());
        assert_eq!(h.playback.live(), 0);
    }

    #[test]
    fn delete_continues_past_failures() {
        let mut h = harness(|dir, files| {
            files.locked.insert(dir.join("a1.jpg"));
        });
        h.browser.select([0, 1, 3]);

        let report = h.browser.delete_selected_files();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, h.path("a1.jpg"));
        assert_eq!(report.trashed, vec![h.path("a2.jpg"), h.path("c1.bin")]);
        assert_eq!(report.removed, 3);
        assert_eq!(h.browser.list().count(), 2);
        assert_eq!(h.browser.list().selected_count(), 0);
        assert_eq!(
            h.last_status(),
            StatusUpdate::new(h.dir.path().display().to_string(), 0)
        );
        assert_eq!(h.last_preview().as_deref(), Some("empty"));
    }

    #[test]
    fn delete_row_outside_selection_only_deletes_that_row() {
        let mut h = plain();
        h.browser.select([0, 1]);

        let report = h.browser.delete_row(4);

        assert_eq!(report.trashed, vec![h.path("c2.bin")]);
        assert_eq!(h.browser.list().count(), 4);
    }

    #[test]
    fn delete_row_inside_selection_deletes_the_selection() {
        let mut h = plain();
        h.browser.select([0, 1]);

        let report = h.browser.delete_row(1);

        assert_eq!(report.trashed.len(), 2);
        assert_eq!(h.browser.list().get(0).unwrap().path(), h.path("b1.mp4"));
    }

    #[test]
    fn delete_stops_playback_before_trashing() {
        let mut h = plain();
        h.browser.select([2]);
        h.browser.delete_selected_files();
        assert_eq!(h.playback.live(), 0);
    }

    #[test]
    fn vanished_row_is_dropped_silently() {
        let mut h = harness(|dir, files| {
            files.missing.lock().unwrap().insert(dir.join("a2.jpg"));
        });
        h.browser.select([0]);
        let previews_before = h.previews.borrow().len();

        let outcome = h.browser.open_entry(1).unwrap();

        assert_eq!(outcome, OpenOutcome::Vanished(h.path("a2.jpg")));
        assert_eq!(h.browser.list().count(), 4);
        assert_eq!(h.previews.borrow().len(), previews_before);
        assert_eq!(h.browser.list().selected_indices(), vec![0]);
        assert!(h.files.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn vanished_row_leaving_one_selected_previews_the_survivor() {
        let mut h = harness(|dir, files| {
            files.missing.lock().unwrap().insert(dir.join("a2.jpg"));
        });
        h.browser.select([0, 1]);
        assert_eq!(h.last_preview().as_deref(), Some("empty"));

        h.browser.open_entry(1).unwrap();

        assert_eq!(h.browser.list().selected_indices(), vec![0]);
        assert_eq!(h.browser.preview().path(), Some(h.path("a1.jpg").as_path()));
        assert_eq!(h.last_preview().as_deref(), Some("unavailable"));
        assert_eq!(h.last_status(), StatusUpdate::new(h.label("a1.jpg"), 1));
    }

    #[test]
    fn vanished_selected_row_clears_the_preview() {
        let mut h = harness(|dir, files| {
            files.missing.lock().unwrap().insert(dir.join("b1.mp4"));
        });
        h.browser.select([2]);
        assert_eq!(h.playback.live(), 1);

        h.browser.open_entry(2).unwrap();

        assert_eq!(h.browser.list().selected_count(), 0);
        assert_eq!(h.last_preview().as_deref(), Some("empty"));
        assert_eq!(h.playback.live(), 0);
        assert_eq!(
            h.last_status(),
            StatusUpdate::new(h.dir.path().display().to_string(), 0)
        );
    }

    #[test]
    fn existing_row_is_opened() {
        let mut h = plain();
        let outcome = h.browser.open_entry(0).unwrap();
        assert_eq!(outcome, OpenOutcome::Opened(h.path("a1.jpg")));
        assert_eq!(h.browser.open_entry(99).unwrap(), OpenOutcome::NoEntry);
    }

    #[test]
    fn unavailable_preview_can_be_opened_externally() {
        let mut h = plain();
        assert!(!h.browser.open_externally().unwrap());

        h.browser.select([3]);
        assert_eq!(h.browser.preview().kind(), "unavailable");

        assert!(h.browser.open_externally().unwrap());
        assert_eq!(*h.files.opened.lock().unwrap(), vec![h.path("c1.bin")]);
    }

    #[test]
    fn queued_commands_apply_in_order() {
        let mut h = plain();
        let handle = h.browser.handle();

        handle.select([0, 1]);
        handle.select([2]);
        handle.delete_selected_files();

        let summary = h.browser.process_pending();

        assert_eq!(summary.commands, 3);
        assert_eq!(summary.deletes.len(), 1);
        assert_eq!(summary.deletes[0].trashed, vec![h.path("b1.mp4")]);
        assert_eq!(h.browser.list().count(), 4);
    }

    #[test]
    fn unpreviewable_rows_get_a_placeholder_thumbnail() {
        let mut h = plain();
        let image = h.browser.bind_thumbnail(SlotId(0), 3);
        assert!(matches!(image, SlotImage::Placeholder));
        assert_eq!(h.browser.pending_thumbnails(), 0);
    }

    #[test]
    fn binding_a_missing_row_clears_the_slot() {
        let mut h = plain();
        assert!(matches!(
            h.browser.bind_thumbnail(SlotId(0), 42),
            SlotImage::Empty
        ));
    }

    #[test]
    fn undecodable_image_thumbnail_marks_the_slot_failed() {
        let mut h = plain();
        h.browser.bind_thumbnail(SlotId(0), 0);

        let delivered = h.browser.settle_thumbnails(WAIT);

        assert_eq!(delivered, vec![SlotId(0)]);
        assert!(matches!(h.browser.slot_image(SlotId(0)), SlotImage::Failed));
    }

    #[test]
    fn rebound_slot_ignores_the_earlier_thumbnail() {
        let (release, gate) = crossbeam_channel::bounded::<()>(1);
        let (sender, receiver) = EventChannel::new();
        let mut h = harness_with(
            |_, _| {},
            |builder| {
                builder
                    .thumbnail_generator(Arc::new(GatedGenerator { gate }))
                    .thumbnail_workers(2)
                    .events(sender)
            },
        );

        h.browser.bind_thumbnail(SlotId(0), 0);
        h.browser.bind_thumbnail(SlotId(1), 0);
        h.browser.bind_thumbnail(SlotId(0), 1);
        assert_eq!(h.browser.pending_thumbnails(), 3);

        // a2.jpg lands first; a1.jpg only after slot 0 has moved on
        h.browser.settle_thumbnails(Duration::from_millis(100));
        release.send(()).unwrap();
        h.browser.settle_thumbnails(WAIT);

        match h.browser.slot_image(SlotId(0)) {
            SlotImage::Ready(thumb) => assert_eq!(thumb.width(), 3),
            other => panic!("expected a2.jpg's thumbnail, got {:?}", other),
        }
        match h.browser.slot_image(SlotId(1)) {
            SlotImage::Ready(thumb) => assert_eq!(thumb.width(), 2),
            other => panic!("expected a1.jpg's thumbnail, got {:?}", other),
        }

        let store = h.browser.thumbnails().store();
        assert!(store.get(&ThumbnailKey::from(h.path("a1.jpg").as_path())).is_some());
        assert!(store.get(&ThumbnailKey::from(h.path("a2.jpg").as_path())).is_some());

        let events = receiver.drain();
        let a1 = h.path("a1.jpg");
        let stale: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::Thumbnail(ThumbnailEvent::StaleDropped { .. })))
            .collect();
        assert_eq!(stale.len(), 1);
        assert!(matches!(
            stale[0],
            Event::Thumbnail(ThumbnailEvent::StaleDropped { path }) if *path == a1
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Thumbnail(ThumbnailEvent::Joined { path }) if *path == a1
        )));
    }
}
