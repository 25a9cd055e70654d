//! Integration tests for the browser coordinator.
//!
//! These tests drive the coordinator the way a shell would:
//! - Scan a directory and select rows
//! - Delete with partial failures
//! - Open rows whose files vanished
//! - Supersede a slow scan with a newer one

use assert_fs::prelude::*;
use assert_fs::TempDir;
use dupe_browser::core::coordinator::{OpenOutcome, SelectionCoordinator, StatusUpdate};
use dupe_browser::core::fileops::{FileOperations, SystemFileOperations};
use dupe_browser::core::model::{DuplicateGroup, FoundFile};
use dupe_browser::core::preview::Preview;
use dupe_browser::core::thumbnail::{SlotId, SlotImage};
use dupe_browser::error::{FileOpError, ScanError};
use dupe_browser::events::{DeleteEvent, Event, EventChannel, ListEvent};
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(10);

/// Write a small JPEG and return its bytes
fn write_jpeg(path: &Path, shade: u8) -> Vec<u8> {
    RgbImage::from_pixel(16, 12, Rgb([shade, shade / 2, 255 - shade]))
        .save(path)
        .unwrap();
    fs::read(path).unwrap()
}

/// Deletes for real, except for paths it was told are locked
struct RemovingFiles {
    locked: Vec<PathBuf>,
}

impl FileOperations for RemovingFiles {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn trash(&self, path: &Path) -> Result<(), FileOpError> {
        if self.locked.iter().any(|p| p == path) {
            return Err(FileOpError::Trash {
                path: path.to_path_buf(),
                reason: "file is locked".to_string(),
            });
        }
        fs::remove_file(path).map_err(|e| FileOpError::Trash {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn open_default(&self, _path: &Path) -> Result<(), FileOpError> {
        Ok(())
    }
}

#[test]
fn two_groups_scenario() {
    let temp = TempDir::new().unwrap();
    let bytes = write_jpeg(temp.child("a1.jpg").path(), 200);
    temp.child("a2.jpg").write_binary(&bytes).unwrap();
    temp.child("b1.mp4").write_binary(b"not really a video").unwrap();

    let root = temp.path().to_path_buf();
    let detector = move |_: &Path| -> Result<Vec<DuplicateGroup>, ScanError> {
        Ok(vec![
            DuplicateGroup::new(vec![
                FoundFile::classify(root.join("a1.jpg")),
                FoundFile::classify(root.join("a2.jpg")),
            ]),
            DuplicateGroup::new(vec![FoundFile::classify(root.join("b1.mp4"))]),
        ])
    };

    let previews = Rc::new(RefCell::new(Vec::new()));
    let statuses = Rc::new(RefCell::new(Vec::new()));
    let preview_log = previews.clone();
    let status_log = statuses.clone();

    let mut browser = SelectionCoordinator::builder()
        .detector(Arc::new(detector))
        .preview_view(move |p: &Preview| preview_log.borrow_mut().push(p.clone()))
        .status_view(move |u: &StatusUpdate| status_log.borrow_mut().push(u.clone()))
        .build()
        .unwrap();

    browser.open_directory(temp.path());
    browser.finish_scan(WAIT).unwrap();

    let flags: Vec<_> = browser
        .list()
        .entries()
        .iter()
        .map(|e| (e.display_name(), e.is_first_in_group(), e.is_last_in_group()))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("a1.jpg".to_string(), true, false),
            ("a2.jpg".to_string(), false, true),
            ("b1.mp4".to_string(), true, true),
        ]
    );

    browser.select([0]);
    match previews.borrow().last() {
        Some(Preview::Image { path, image }) => {
            assert_eq!(path, &temp.path().join("a1.jpg"));
            assert_eq!((image.width(), image.height()), (16, 12));
        }
        other => panic!("expected an image preview, got {:?}", other),
    }

    browser.select([0, 1]);
    assert!(matches!(previews.borrow().last(), Some(Preview::Empty)));
    assert_eq!(
        statuses.borrow().last(),
        Some(&StatusUpdate::new("2 selected", 2))
    );
}

#[test]
fn content_hash_scan_and_thumbnails() {
    let temp = TempDir::new().unwrap();
    temp.child("photos").create_dir_all().unwrap();
    let bytes = write_jpeg(temp.child("photos/a1.jpg").path(), 40);
    temp.child("photos/copy/a2.jpg").write_binary(&bytes).unwrap();
    temp.child("notes/c1.txt").write_str("same words").unwrap();
    temp.child("notes/c2.txt").write_str("same words").unwrap();
    temp.child("unique.txt").write_str("only one of me").unwrap();

    let mut browser = SelectionCoordinator::builder()
        .thumbnail_workers(2)
        .build()
        .unwrap();
    browser.open_directory(temp.path());
    browser.finish_scan(WAIT).unwrap();

    let list = browser.list();
    assert_eq!(list.count(), 4);
    assert!(list
        .entries()
        .iter()
        .all(|e| e.path() != temp.path().join("unique.txt")));

    let first_image = list
        .entries()
        .iter()
        .position(|e| e.display_name() == "a1.jpg")
        .unwrap();
    let first_text = list
        .entries()
        .iter()
        .position(|e| e.display_name() == "c1.txt")
        .unwrap();

    browser.bind_thumbnail(SlotId(0), first_image);
    browser.bind_thumbnail(SlotId(1), first_text);
    browser.settle_thumbnails(WAIT);

    match browser.slot_image(SlotId(0)) {
        SlotImage::Ready(thumb) => assert_eq!((thumb.width(), thumb.height()), (16, 12)),
        other => panic!("expected a thumbnail, got {:?}", other),
    }
    assert!(matches!(browser.slot_image(SlotId(1)), SlotImage::Placeholder));
    assert_eq!(browser.thumbnails().store().len(), 1);
}

#[test]
fn partial_delete_failure_keeps_going() {
    let temp = TempDir::new().unwrap();
    for name in ["x.txt", "y.txt", "z.txt"] {
        temp.child(name).write_str("duplicate").unwrap();
    }

    let (sender, receiver) = EventChannel::new();
    let mut browser = SelectionCoordinator::builder()
        .file_operations(Arc::new(RemovingFiles {
            locked: vec![temp.path().join("x.txt")],
        }))
        .events(sender)
        .build()
        .unwrap();
    browser.open_directory(temp.path());
    browser.finish_scan(WAIT).unwrap();
    assert_eq!(browser.list().count(), 3);

    browser.select([0, 1, 2]);
    let report = browser.delete_selected_files();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, temp.path().join("x.txt"));
    assert_eq!(report.trashed.len(), 2);
    temp.child("x.txt").assert(predicate::path::exists());
    temp.child("y.txt").assert(predicate::path::missing());
    temp.child("z.txt").assert(predicate::path::missing());

    assert_eq!(browser.list().count(), 0);
    assert_eq!(browser.list().selected_count(), 0);

    let events = receiver.drain();
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Delete(DeleteEvent::Completed {
            trashed: 2,
            failed: 1
        })
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::List(ListEvent::Removed {
            removed: 3,
            remaining: 0
        })
    )));
}

#[test]
fn externally_deleted_file_is_dropped_on_open() {
    let temp = TempDir::new().unwrap();
    temp.child("one.bin").write_binary(&[7u8; 64]).unwrap();
    temp.child("two.bin").write_binary(&[7u8; 64]).unwrap();

    let mut browser = SelectionCoordinator::builder()
        .file_operations(Arc::new(SystemFileOperations))
        .build()
        .unwrap();
    browser.open_directory(temp.path());
    browser.finish_scan(WAIT).unwrap();
    browser.select([0]);
    let shown = browser.preview().kind();

    let doomed = browser.list().get(1).unwrap().path().to_path_buf();
    fs::remove_file(&doomed).unwrap();

    assert_eq!(browser.open_entry(1).unwrap(), OpenOutcome::Vanished(doomed));
    assert_eq!(browser.list().count(), 1);
    assert_eq!(browser.list().selected_indices(), vec![0]);
    assert_eq!(browser.preview().kind(), shown);
}

#[test]
fn newer_scan_wins_over_a_slow_one() {
    let slow = TempDir::new().unwrap();
    let fast = TempDir::new().unwrap();
    let (release, gate) = crossbeam_channel::bounded::<()>(1);

    let slow_root = slow.path().to_path_buf();
    let detector = move |dir: &Path| -> Result<Vec<DuplicateGroup>, ScanError> {
        if dir == slow_root.as_path() {
            let _ = gate.recv_timeout(WAIT);
        }
        Ok(vec![DuplicateGroup::new(vec![
            FoundFile::classify(dir.join("one.png")),
            FoundFile::classify(dir.join("two.png")),
        ])])
    };

    let mut browser = SelectionCoordinator::builder()
        .detector(Arc::new(detector))
        .build()
        .unwrap();
    let handle = browser.handle();

    handle.open_directory(slow.path());
    handle.open_directory(fast.path());

    let deadline = Instant::now() + WAIT;
    let mut landed = None;
    while landed.is_none() && Instant::now() < deadline {
        landed = browser.process_pending().scan;
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(landed, Some(2));
    assert!(!browser.is_scanning());

    // Let the superseded scan finish; it must not replace the list
    release.send(()).unwrap();
    std::thread::sleep(Duration::from_millis(200));
    let summary = browser.process_pending();

    assert!(summary.scan.is_none());
    assert_eq!(browser.list().directory(), Some(fast.path()));
    assert!(browser
        .list()
        .entries()
        .iter()
        .all(|e| e.path().starts_with(fast.path())));
}
