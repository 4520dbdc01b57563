use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Lines longer than this abort the load instead of growing the buffer.
pub const DEFAULT_MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read line {line}")]
    Read {
        line: u64,
        #[source]
        source: io::Error,
    },
    #[error("line {line} exceeds the maximum line length of {limit} bytes")]
    LineTooLong { line: u64, limit: usize },
}

/// Forward-only reader over the lines of a tab-separated export.
///
/// Yields `None` at end of input; every failure is surfaced as `Some(Err(_))`
/// and ends the sequence.
pub struct LineSource<R> {
    reader: R,
    max_line_bytes: usize,
    line_number: u64,
    buf: Vec<u8>,
    failed: bool,
}

impl LineSource<BufReader<File>> {
    pub fn open(path: &Path, max_line_bytes: usize) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::with_capacity(64 * 1024, file), max_line_bytes))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            line_number: 0,
            buf: Vec::new(),
            failed: false,
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        self.buf.clear();
        self.line_number += 1;

        // One extra byte for the terminator, one more to detect overflow.
        let limit = self.max_line_bytes as u64 + 2;
        let read = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| SourceError::Read {
                line: self.line_number,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        } else if read as u64 == limit {
            return Err(SourceError::LineTooLong {
                line: self.line_number,
                limit: self.max_line_bytes,
            });
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        if self.buf.len() > self.max_line_bytes {
            return Err(SourceError::LineTooLong {
                line: self.line_number,
                limit: self.max_line_bytes,
            });
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn lines(input: &str, max: usize) -> Vec<Result<String, SourceError>> {
        LineSource::new(Cursor::new(input.as_bytes().to_vec()), max).collect()
    }

    #[test]
    fn strips_unix_and_windows_terminators() {
        let out: Vec<String> = lines("a\tb\r\nc\n\nlast", 64)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(out, vec!["a\tb", "c", "", "last"]);
    }

    #[test]
    fn trailing_newline_does_not_yield_an_empty_line() {
        assert_eq!(lines("a\nb\n", 64).len(), 2);
        assert!(lines("", 64).is_empty());
    }

    #[test]
    fn line_at_the_limit_is_accepted() {
        let out = lines("abcd\r\nef\n", 4);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), "abcd");
    }

    #[test]
    fn overlong_line_is_fatal_and_ends_the_sequence() {
        let out = lines("ok\nabcdefgh\nnever\n", 4);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), "ok");
        match &out[1] {
            Err(SourceError::LineTooLong { line, limit }) => {
                assert_eq!(*line, 2);
                assert_eq!(*limit, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn overlong_final_line_without_terminator_is_rejected() {
        let out = lines("abcdef", 4);
        assert!(matches!(out[0], Err(SourceError::LineTooLong { .. })));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = LineSource::open(&dir.path().join("missing.tsv"), 64);
        assert!(matches!(result, Err(SourceError::Open { .. })));
    }
}
