//! Message bodies sent during the DATA phase.
//!
//! Both builders return the bytes that precede the terminating `.` line,
//! ready for [`Envelope`](crate::probe::Envelope).

const FILLER: &str = "012345678901234567890012345674392584328574392857\
                      0123123123138912378913789\r\n";

/// A synthetic test message of roughly `size_kib` KiB: a few headers, then
/// filler lines until the size is reached, then an empty line.
pub fn generate(sender: &str, recipient: &str, size_kib: usize) -> Vec<u8> {
    let mut data = String::with_capacity(size_kib * 1024 + 256);
    data.push_str("Subject: SMTP Ping\r\n");
    data.push_str(&format!("From: <{sender}>\r\n"));
    data.push_str(&format!("To: <{recipient}>\r\n"));
    data.push_str("\r\n");
    while data.len() / 1024 < size_kib {
        data.push_str(FILLER);
    }
    data.push_str("\r\n");
    data.into_bytes()
}

/// Prepare a user-supplied message: bare LF becomes CRLF, lines starting
/// with `.` are dot-stuffed and the result always ends with CRLF.
pub fn from_bytes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / 64 + 2);
    let mut line_start = true;
    let mut previous = None;
    for &byte in raw {
        if line_start && byte == b'.' {
            out.push(b'.');
        }
        if byte == b'\n' && previous != Some(b'\r') {
            out.push(b'\r');
        }
        out.push(byte);
        line_start = byte == b'\n';
        previous = Some(byte);
    }
    if !out.is_empty() && !out.ends_with(b"\r\n") {
        out.extend_from_slice(b"\r\n");
    }
    out
}
