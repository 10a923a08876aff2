use std::io::{self, BufRead, BufReader, Read, Write};

use tracing::trace;

use super::SmtpReply;

/// Line-oriented wrapper over the session transport.
pub(crate) struct SmtpStream<S: Read + Write> {
    reader: BufReader<S>,
    line: Vec<u8>,
}

impl<S: Read + Write> SmtpStream<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self {
            reader: BufReader::new(stream),
            line: Vec::with_capacity(512),
        }
    }

    pub(crate) fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(bytes)?;
        stream.flush()
    }

    /// Read up to the next final reply line. Lines shorter than four
    /// characters or without a space in the fourth position (multi-line
    /// continuations) are skipped. `Ok(None)` means the peer closed the
    /// connection before a final line arrived.
    pub(crate) fn read_reply(&mut self) -> io::Result<Option<SmtpReply>> {
        loop {
            self.line.clear();
            let read = self.reader.read_until(b'\n', &mut self.line)?;
            if read == 0 || self.line.last() != Some(&b'\n') {
                return Ok(None);
            }

            let text = String::from_utf8_lossy(&self.line);
            trace!(response = %text.trim_end(), "smtp");
            if self.line.len() >= 4 && self.line[3] == b' ' {
                return Ok(Some(SmtpReply::from_line(&text)));
            }
        }
    }
}
