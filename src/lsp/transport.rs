//! Content-Length framing for JSON-RPC over stdio

use crate::error::{CnfError, Result};
use std::io::{BufRead, Write};

const CONTENT_LENGTH: &str = "content-length:";

/// Read one framed message body.
///
/// Returns `Ok(None)` when the stream ends before a new header starts.
/// A header block without `Content-Length` is an error; its unframed body
/// is treated as header noise by the next call, which picks up again at the
/// next `Content-Length` header.
pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut header_line = String::new();
        if reader.read_line(&mut header_line)? == 0 {
            if saw_header {
                return Err(CnfError::Protocol(
                    "stream ended inside message headers".to_string(),
                ));
            }
            return Ok(None);
        }

        let header_line = header_line.trim_end_matches(['\r', '\n']);
        if header_line.is_empty() {
            if !saw_header {
                // stray blank line between messages
                continue;
            }
            break;
        }
        saw_header = true;

        // the header may be glued to leftovers of an unframed body
        if let Some(pos) = header_line.to_ascii_lowercase().find(CONTENT_LENGTH) {
            let len = header_line[pos + CONTENT_LENGTH.len()..].trim();
            let len = len
                .parse()
                .map_err(|_| CnfError::Protocol(format!("invalid Content-Length: {}", len)))?;
            content_length = Some(len);
        }
    }

    let content_length = content_length
        .ok_or_else(|| CnfError::Protocol("missing Content-Length header".to_string()))?;

    let mut buf = vec![0u8; content_length];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| CnfError::Protocol(format!("message body is not UTF-8: {}", e)))
}

/// Write one framed message body and flush.
pub fn write_message<W: Write>(writer: &mut W, body: &str) -> Result<()> {
    write!(writer, "Content-Length: {}\r\n\r\n{}", body.len(), body)?;
    writer.flush()?;
    Ok(())
}
