//! Server-Sent Events framing for streamed completions.

/// One complete event pulled out of the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A `data:` payload (joined if it spanned several `data:` lines)
    Data(String),
    /// The `data: [DONE]` terminator
    Done,
}

/// Incremental SSE decoder.
///
/// Network reads split events (and multi-byte characters) at arbitrary
/// points, so raw bytes are buffered until a blank line closes an event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed the next network read and return every event it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<SseEvent, std::str::Utf8Error>> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some((end, delimiter_len)) = find_event_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end + delimiter_len).collect();
            match std::str::from_utf8(&raw[..end]) {
                Ok(text) => {
                    if let Some(event) = parse_event(text) {
                        events.push(Ok(event));
                    }
                }
                Err(e) => events.push(Err(e)),
            }
        }
        events
    }
}

/// Position of the first blank-line delimiter, tolerating CRLF framing.
fn find_event_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| (p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_event(text: &str) -> Option<SseEvent> {
    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.trim_end_matches('\r').strip_prefix("data:"))
        .map(|payload| payload.strip_prefix(' ').unwrap_or(payload))
        .collect();

    if data.is_empty() {
        // comments (": keep-alive") and event/id-only frames
        return None;
    }

    let payload = data.join("\n");
    if payload.trim() == "[DONE]" {
        Some(SseEvent::Done)
    } else {
        Some(SseEvent::Data(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(decoder: &mut SseDecoder, input: &[u8]) -> Vec<SseEvent> {
        decoder
            .feed(input)
            .into_iter()
            .map(|e| e.unwrap())
            .collect()
    }

    #[test]
    fn test_multiple_events_in_one_read() {
        let mut decoder = SseDecoder::default();
        let got = events(&mut decoder, b"data: {\"a\":1}\n\ndata: {\"a\":2}\n\ndata: [DONE]\n\n");
        assert_eq!(
            got,
            vec![
                SseEvent::Data("{\"a\":1}".into()),
                SseEvent::Data("{\"a\":2}".into()),
                SseEvent::Done,
            ]
        );
    }

    #[test]
    fn test_event_split_across_reads() {
        let mut decoder = SseDecoder::default();
        assert!(events(&mut decoder, b"data: {\"content\":").is_empty());
        let got = events(&mut decoder, b"\"hi\"}\n\n");
        assert_eq!(got, vec![SseEvent::Data("{\"content\":\"hi\"}".into())]);
    }

    #[test]
    fn test_multibyte_character_split_across_reads() {
        let text = "data: 冲突\n\n".as_bytes();
        let mut decoder = SseDecoder::default();
        // split inside the first three-byte character
        assert!(events(&mut decoder, &text[..7]).is_empty());
        let got = events(&mut decoder, &text[7..]);
        assert_eq!(got, vec![SseEvent::Data("冲突".into())]);
    }

    #[test]
    fn test_crlf_framing_and_comments() {
        let mut decoder = SseDecoder::default();
        let got = events(&mut decoder, b": keep-alive\r\n\r\ndata: x\r\n\r\n");
        assert_eq!(got, vec![SseEvent::Data("x".into())]);
    }
}
