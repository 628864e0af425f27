use super::{CheckedEntry, Core, WriteSyncer};
use crate::domain::{CoreError, Entry, Field, Level};
use crate::encoder::Encoder;
use std::sync::Arc;

/// Writes encoded entries at or above `min_level` to a [`WriteSyncer`].
///
/// This is the console variant composed next to [`RollbarCore`](crate::RollbarCore) through a
/// [`Tee`](super::Tee).
pub struct IoCore {
    min_level: Level,
    encoder: Box<dyn Encoder>,
    output: Arc<dyn WriteSyncer>,
}

impl IoCore {
    pub fn new(min_level: Level, encoder: Box<dyn Encoder>, output: Arc<dyn WriteSyncer>) -> Self {
        Self {
            min_level,
            encoder,
            output,
        }
    }
}

impl Core for IoCore {
    fn enabled(&self, level: Level) -> bool {
        self.min_level.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Core> {
        let mut encoder = self.encoder.clone_encoder();
        for field in fields {
            field.add_to(encoder.as_mut());
        }
        Box::new(IoCore {
            min_level: self.min_level,
            encoder,
            output: Arc::clone(&self.output),
        })
    }

    fn check<'a>(&'a self, entry: &Entry, checked: CheckedEntry<'a>) -> CheckedEntry<'a> {
        if self.enabled(entry.level) {
            checked.add_core(entry, self)
        } else {
            checked
        }
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<(), CoreError> {
        let buf = self.encoder.encode_entry(entry, fields)?;
        self.output.write_all(&buf)?;
        // Entries above error may precede a process exit.
        if entry.level > Level::Error {
            self.sync()?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<(), CoreError> {
        Ok(self.output.sync()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{ConsoleEncoder, EncoderConfig, TimeFormat};
    use parking_lot::Mutex;
    use std::io;

    #[derive(Default)]
    struct Captured {
        bytes: Mutex<Vec<u8>>,
        syncs: Mutex<usize>,
    }

    impl WriteSyncer for Captured {
        fn write_all(&self, buf: &[u8]) -> io::Result<()> {
            self.bytes.lock().extend_from_slice(buf);
            Ok(())
        }

        fn sync(&self) -> io::Result<()> {
            *self.syncs.lock() += 1;
            Ok(())
        }
    }

    fn core(output: Arc<Captured>) -> IoCore {
        let encoder = ConsoleEncoder::new(EncoderConfig {
            time_format: TimeFormat::Omit,
            ..Default::default()
        });
        IoCore::new(Level::Info, Box::new(encoder), output)
    }

    #[test]
    fn test_filters_below_min_level() {
        let output = Arc::new(Captured::default());
        let core = core(Arc::clone(&output));

        assert!(!core.enabled(Level::Debug));
        assert!(core.enabled(Level::Info));
        let checked = core.check(&Entry::new(Level::Debug, "noise"), CheckedEntry::new());
        assert!(checked.is_empty());
    }

    #[test]
    fn test_with_accumulates_without_touching_parent() {
        let output = Arc::new(Captured::default());
        let parent = core(Arc::clone(&output));
        let child = parent.with(&[Field::string("tenant", "acme")]);

        child.write(&Entry::new(Level::Info, "child"), &[]).unwrap();
        parent.write(&Entry::new(Level::Info, "parent"), &[]).unwrap();

        let text = String::from_utf8(output.bytes.lock().clone()).unwrap();
        assert_eq!(text, "info\tchild\t{\"tenant\":\"acme\"}\ninfo\tparent\n");
    }

    #[test]
    fn test_syncs_after_severe_entries() {
        let output = Arc::new(Captured::default());
        let core = core(Arc::clone(&output));

        core.write(&Entry::new(Level::Error, "bad"), &[]).unwrap();
        assert_eq!(*output.syncs.lock(), 0);

        core.write(&Entry::new(Level::Fatal, "worse"), &[]).unwrap();
        assert_eq!(*output.syncs.lock(), 1);
    }
}
