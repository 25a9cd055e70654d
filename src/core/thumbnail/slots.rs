//! Foreground table of thumbnail display slots.
//!
//! A slot is whatever the shell reuses to draw a row's thumbnail. Every
//! bind gets a fresh version number; a delivery carries the binding it
//! was requested for and is applied only if that binding is still the
//! slot's current one. Versions come from one counter, so they are never
//! reused even if a slot is rebound to the same key.

use super::{Thumbnail, ThumbnailKey, ThumbnailResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier of a display slot (a reusable row view)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// Proof of one particular bind of a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBinding {
    slot: SlotId,
    key: ThumbnailKey,
    version: u64,
}

impl SlotBinding {
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn key(&self) -> &ThumbnailKey {
        &self.key
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// What a slot currently shows
#[derive(Debug, Clone, Default)]
pub enum SlotImage {
    /// Not bound to anything
    #[default]
    Empty,
    /// Bound, waiting for a delivery
    Loading,
    /// Thumbnail delivered
    Ready(Arc<Thumbnail>),
    /// "No preview" sign for unpreviewable content
    Placeholder,
    /// Generation failed for the bound key
    Failed,
}

#[derive(Debug, Default)]
struct SlotState {
    binding: Option<(ThumbnailKey, u64)>,
    image: SlotImage,
}

/// Slot table owned by the foreground
#[derive(Debug, Default)]
pub struct ThumbnailSlots {
    slots: HashMap<SlotId, SlotState>,
    next_version: u64,
}

impl ThumbnailSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    /// Bind a slot to a key, invalidating any delivery for its old binding
    pub fn bind(&mut self, slot: SlotId, key: ThumbnailKey) -> SlotBinding {
        let version = self.next_version();
        self.slots.insert(
            slot,
            SlotState {
                binding: Some((key.clone(), version)),
                image: SlotImage::Loading,
            },
        );
        SlotBinding { slot, key, version }
    }

    /// Bind a slot to the "no preview" placeholder
    pub fn bind_placeholder(&mut self, slot: SlotId) {
        let _ = self.next_version();
        self.slots.insert(
            slot,
            SlotState {
                binding: None,
                image: SlotImage::Placeholder,
            },
        );
    }

    /// Forget a slot (its row scrolled away or was removed)
    pub fn unbind(&mut self, slot: SlotId) {
        self.slots.remove(&slot);
    }

    /// Forget every slot
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Whether `binding` is still the slot's current binding
    pub fn is_current(&self, binding: &SlotBinding) -> bool {
        self.slots
            .get(&binding.slot)
            .and_then(|state| state.binding.as_ref())
            .map(|(key, version)| *version == binding.version && *key == binding.key)
            .unwrap_or(false)
    }

    /// Apply a delivery. Returns `false` (and changes nothing) if stale.
    pub fn deliver(&mut self, binding: &SlotBinding, result: ThumbnailResult) -> bool {
        if !self.is_current(binding) {
            return false;
        }
        if let Some(state) = self.slots.get_mut(&binding.slot) {
            state.image = match result {
                Ok(thumbnail) => SlotImage::Ready(thumbnail),
                Err(_) => SlotImage::Failed,
            };
        }
        true
    }

    /// What the slot shows right now
    pub fn image(&self, slot: SlotId) -> &SlotImage {
        static EMPTY: SlotImage = SlotImage::Empty;
        self.slots.get(&slot).map(|s| &s.image).unwrap_or(&EMPTY)
    }

    /// Key the slot is bound to, if any
    pub fn bound_key(&self, slot: SlotId) -> Option<&ThumbnailKey> {
        self.slots
            .get(&slot)
            .and_then(|s| s.binding.as_ref())
            .map(|(key, _)| key)
    }
}
