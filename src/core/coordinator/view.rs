//! Display regions as seen by the coordinator.

use crate::core::preview::Preview;
use serde::{Deserialize, Serialize};

/// What the status region shows after a selection change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub label: String,
    pub count: usize,
    /// The delete action is available only with something selected
    pub delete_enabled: bool,
}

impl StatusUpdate {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
            delete_enabled: count > 0,
        }
    }
}

/// The preview region
pub trait PreviewView {
    fn show(&mut self, preview: &Preview);
}

/// The status region (title and delete action)
pub trait StatusView {
    fn update_selected(&mut self, update: &StatusUpdate);
}

impl<F> PreviewView for F
where
    F: FnMut(&Preview),
{
    fn show(&mut self, preview: &Preview) {
        self(preview)
    }
}

impl<F> StatusView for F
where
    F: FnMut(&StatusUpdate),
{
    fn update_selected(&mut self, update: &StatusUpdate) {
        self(update)
    }
}

/// A region nobody renders
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedView;

impl PreviewView for DetachedView {
    fn show(&mut self, _preview: &Preview) {}
}

impl StatusView for DetachedView {
    fn update_selected(&mut self, _update: &StatusUpdate) {}
}
