use std::{
    cell::RefCell,
    fs::File,
    io::{self, LineWriter, Write},
    path::Path,
    rc::Rc,
};

use eyre::Context;

/// Opens (or creates) `path` in append mode, flushing on every newline.
pub fn file(path: impl AsRef<Path>) -> eyre::Result<LineWriter<File>> {
    let path = path.as_ref();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed opening or creating log file {}", path.display()))?;

    Ok(LineWriter::new(file))
}

pub fn stdout() -> Box<dyn Write> {
    Box::new(io::stdout())
}

pub fn stderr() -> Box<dyn Write> {
    Box::new(io::stderr())
}

#[derive(Default)]
struct Captured {
    bytes: Vec<u8>,
    writes: usize,
    flushes: usize,
}

/// In-memory destination whose clones all observe the same buffer.
///
/// Hand one clone to a root logger and keep another to inspect what was
/// written, how many write calls were made and how often it was flushed.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Rc<RefCell<Captured>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.borrow().bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().bytes.is_empty()
    }

    /// Number of `write` calls received, including empty ones.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }

    pub fn flushes(&self) -> usize {
        self.inner.borrow().flushes
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().bytes.clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.borrow_mut();
        inner.writes += 1;
        inner.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.borrow_mut().flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn shared_buffer_clones_share_state() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();

        writeln!(writer, "one").unwrap();
        writer.flush().unwrap();

        assert_eq!(buffer.lines(), ["one"]);
        assert!(buffer.writes() >= 1);
        assert_eq!(buffer.flushes(), 1);

        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn file_appends_to_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "existing\n").unwrap();

        {
            let mut writer = file(&path).unwrap();
            writeln!(writer, "appended").unwrap();
        }

        let mut contents = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "existing\nappended\n");
    }

    #[test]
    fn file_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");

        let err = file(&path).unwrap_err();
        assert!(err.to_string().contains("app.log"), "{}", err);
    }
}
