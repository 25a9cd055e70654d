//! Get-or-create thumbnail cache with shared in-flight generation.

use super::{
    InMemoryThumbnailStore, PendingThumbnail, Thumbnail, ThumbnailFetch, ThumbnailGenerator,
    ThumbnailKey, ThumbnailResult, ThumbnailStore,
};
use crate::core::model::ContentType;
use crate::error::{BrowserError, ThumbnailError};
use crate::events::{null_sender, Event, EventSender, ThumbnailEvent};
use crossbeam_channel::{bounded, Sender};
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

struct Shared {
    store: Arc<dyn ThumbnailStore>,
    generator: Arc<dyn ThumbnailGenerator>,
    /// Keys being generated and everyone waiting on them
    in_flight: Mutex<HashMap<ThumbnailKey, Vec<Sender<ThumbnailResult>>>>,
    events: EventSender,
}

#[derive(Clone)]
enum Executor {
    Global,
    Dedicated(Arc<rayon::ThreadPool>),
}

impl Executor {
    fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        match self {
            Executor::Global => rayon::spawn(job),
            Executor::Dedicated(pool) => pool.spawn(job),
        }
    }
}

/// Memoizing thumbnail service.
///
/// Cheap to clone; clones share the store, the generator and the
/// in-flight table.
#[derive(Clone)]
pub struct ThumbnailCache {
    shared: Arc<Shared>,
    executor: Executor,
}

impl ThumbnailCache {
    /// Cache over the given store, generating on rayon's global pool
    pub fn new(generator: Arc<dyn ThumbnailGenerator>, store: Arc<dyn ThumbnailStore>) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                generator,
                in_flight: Mutex::new(HashMap::new()),
                events: null_sender(),
            }),
            executor: Executor::Global,
        }
    }

    /// Cache with an unbounded in-memory store
    pub fn in_memory(generator: Arc<dyn ThumbnailGenerator>) -> Self {
        Self::new(generator, Arc::new(InMemoryThumbnailStore::new()))
    }

    /// Generate on a dedicated pool of `workers` threads
    pub fn with_workers(mut self, workers: usize) -> Result<Self, BrowserError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("thumbnail-{}", i))
            .build()
            .map_err(|e| BrowserError::Config(format!("thumbnail pool: {}", e)))?;
        self.executor = Executor::Dedicated(Arc::new(pool));
        Ok(self)
    }

    /// Report cache activity through `events`
    ///
    /// Must be called before the cache is cloned or used.
    pub fn with_events(mut self, events: EventSender) -> Self {
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.events = events,
            None => warn!("with_events ignored on a shared thumbnail cache"),
        }
        self
    }

    /// The backing store, for inspection or external purging
    pub fn store(&self) -> &Arc<dyn ThumbnailStore> {
        &self.shared.store
    }

    /// Number of keys currently being generated
    pub fn in_flight(&self) -> usize {
        self.shared
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Return the stored thumbnail, or start (or join) its generation.
    pub fn get_or_create(&self, key: ThumbnailKey, content_type: ContentType) -> ThumbnailFetch {
        if !content_type.has_thumbnail() {
            return ThumbnailFetch::Unsupported;
        }

        let shared = &self.shared;
        if let Some(thumbnail) = shared.store.get(&key) {
            shared.events.send(Event::Thumbnail(ThumbnailEvent::CacheHit {
                path: key.path().to_path_buf(),
            }));
            return ThumbnailFetch::Ready(thumbnail);
        }

        let (sender, receiver) = bounded(1);
        {
            let mut in_flight = shared.in_flight.lock().unwrap_or_else(|e| e.into_inner());

            // Completion stores and unregisters under this lock, so a
            // generation that finished since the check above is visible now.
            if let Some(thumbnail) = shared.store.get(&key) {
                return ThumbnailFetch::Ready(thumbnail);
            }

            match in_flight.entry(key.clone()) {
                MapEntry::Occupied(mut waiting) => {
                    waiting.get_mut().push(sender);
                    debug!("Joining generation of {}", key.path().display());
                    shared.events.send(Event::Thumbnail(ThumbnailEvent::Joined {
                        path: key.path().to_path_buf(),
                    }));
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(vec![sender]);
                    shared.events.send(Event::Thumbnail(ThumbnailEvent::Requested {
                        path: key.path().to_path_buf(),
                    }));
                    let worker_shared = Arc::clone(shared);
                    let worker_key = key.clone();
                    self.executor
                        .spawn(move || Self::generate(worker_shared, worker_key, content_type));
                }
            }
        }

        ThumbnailFetch::Pending(PendingThumbnail::new(key, receiver))
    }

    fn generate(shared: Arc<Shared>, key: ThumbnailKey, content_type: ContentType) {
        let path = key.path().to_path_buf();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            shared.generator.generate(&path, content_type)
        }))
        .unwrap_or_else(|_| {
            Err(ThumbnailError::Abandoned {
                path: path.clone(),
            })
        });

        let result: ThumbnailResult =
            outcome.map(|image| Arc::new(Thumbnail::new(key.clone(), image)));

        let waiters = {
            let mut in_flight = shared.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if let Ok(thumbnail) = &result {
                shared.store.insert(Arc::clone(thumbnail));
            }
            in_flight.remove(&key).unwrap_or_default()
        };

        match &result {
            Ok(_) => shared
                .events
                .send(Event::Thumbnail(ThumbnailEvent::Generated { path: path.clone() })),
            Err(e) => {
                warn!("Thumbnail generation failed: {}", e);
                shared.events.send(Event::Thumbnail(ThumbnailEvent::Failed {
                    path: path.clone(),
                    message: e.to_string(),
                }));
            }
        }

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}
