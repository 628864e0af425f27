//! The structured-logging façade's core abstraction.
//!
//! A [`Core`] decides whether it participates in an entry, renders it and delivers it somewhere.
//! Cores compose through [`Tee`]; [`layer::CoreLayer`] drives any core from `tracing` events.

pub mod io_core;
pub mod layer;
pub mod tee;
pub mod write_syncer;

pub use io_core::IoCore;
pub use layer::CoreLayer;
pub use tee::Tee;
pub use write_syncer::{Discard, LockedWriter, WriteSyncer};

use crate::domain::{CoreError, Entry, Field, Level};

pub trait Core: Send + Sync {
    fn enabled(&self, level: Level) -> bool;

    /// Returns a derived core with `fields` added to its context. The receiver is not modified.
    fn with(&self, fields: &[Field]) -> Box<dyn Core>;

    /// Adds this core to `checked` if it wants to write `entry`.
    fn check<'a>(&'a self, entry: &Entry, checked: CheckedEntry<'a>) -> CheckedEntry<'a>;

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<(), CoreError>;

    /// Flushes buffered output, blocking until it is delivered.
    fn sync(&self) -> Result<(), CoreError>;
}

/// An entry together with the cores that agreed to write it.
#[derive(Default)]
pub struct CheckedEntry<'a> {
    entry: Option<Entry>,
    cores: Vec<&'a dyn Core>,
}

impl<'a> CheckedEntry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_core(mut self, entry: &Entry, core: &'a dyn Core) -> Self {
        if self.entry.is_none() {
            self.entry = Some(entry.clone());
        }
        self.cores.push(core);
        self
    }

    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Writes the entry to every attached core. All cores are attempted even if some fail.
    pub fn write(self, fields: &[Field]) -> Result<(), CoreError> {
        let Some(entry) = self.entry else {
            return Ok(());
        };

        let errors: Vec<CoreError> = self
            .cores
            .into_iter()
            .filter_map(|core| core.write(&entry, fields).err())
            .collect();

        CoreError::combine(errors)
    }
}
