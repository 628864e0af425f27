use super::{CheckedEntry, Core};
use crate::domain::{CoreError, Entry, Field, Level};

/// Fans every operation out to a list of cores.
pub struct Tee {
    cores: Vec<Box<dyn Core>>,
}

impl Tee {
    pub fn new(cores: Vec<Box<dyn Core>>) -> Self {
        Self { cores }
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

impl Core for Tee {
    fn enabled(&self, level: Level) -> bool {
        self.cores.iter().any(|core| core.enabled(level))
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Core> {
        Box::new(Tee {
            cores: self.cores.iter().map(|core| core.with(fields)).collect(),
        })
    }

    fn check<'a>(&'a self, entry: &Entry, checked: CheckedEntry<'a>) -> CheckedEntry<'a> {
        self.cores
            .iter()
            .fold(checked, |checked, core| core.check(entry, checked))
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<(), CoreError> {
        let errors = self
            .cores
            .iter()
            .filter_map(|core| core.write(entry, fields).err())
            .collect();
        CoreError::combine(errors)
    }

    fn sync(&self) -> Result<(), CoreError> {
        let errors = self.cores.iter().filter_map(|core| core.sync().err()).collect();
        CoreError::combine(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::test_support::RecordingCore;
    use std::sync::Arc;

    #[test]
    fn test_check_collects_each_enabled_core() {
        let warn = RecordingCore::new(Level::Warn);
        let debug = RecordingCore::new(Level::Debug);
        let warn_written = Arc::clone(&warn.written);
        let debug_written = Arc::clone(&debug.written);
        let tee = Tee::new(vec![Box::new(warn), Box::new(debug)]);

        let entry = Entry::new(Level::Info, "hello");
        let checked = tee.check(&entry, CheckedEntry::new());
        assert_eq!(checked.core_count(), 1);
        checked.write(&[]).unwrap();

        assert!(warn_written.lock().is_empty());
        assert_eq!(debug_written.lock().len(), 1);
    }

    #[test]
    fn test_enabled_if_any_core_is() {
        let tee = Tee::new(vec![
            Box::new(RecordingCore::new(Level::Error)),
            Box::new(RecordingCore::new(Level::Warn)),
        ]);
        assert!(tee.enabled(Level::Warn));
        assert!(!tee.enabled(Level::Info));
    }

    #[test]
    fn test_with_derives_every_core() {
        let core = RecordingCore::new(Level::Debug);
        let written = Arc::clone(&core.written);
        let tee = Tee::new(vec![Box::new(core)]);

        let derived = tee.with(&[Field::string("job", "reindex")]);
        derived.write(&Entry::new(Level::Warn, "slow"), &[]).unwrap();
        tee.write(&Entry::new(Level::Warn, "plain"), &[]).unwrap();

        let written = written.lock();
        assert_eq!(written[0].1, vec![Field::string("job", "reindex")]);
        assert!(written[1].1.is_empty());
    }

    #[test]
    fn test_write_reports_all_failures() {
        let mut first = RecordingCore::new(Level::Debug);
        first.fail_writes = true;
        let mut second = RecordingCore::new(Level::Debug);
        second.fail_writes = true;
        let tee = Tee::new(vec![Box::new(first), Box::new(second)]);

        let err = tee.write(&Entry::new(Level::Error, "x"), &[]).unwrap_err();
        assert!(matches!(err, CoreError::Multiple(ref errors) if errors.len() == 2));
        assert!(tee.sync().is_ok());
    }
}
