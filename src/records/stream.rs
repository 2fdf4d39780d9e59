use std::io::{self, BufRead};

/// One top-level JSON value cut out of the input, not yet decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDocument {
    pub index: usize,
    pub offset: u64,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum StreamError {
    /// Input ended inside a document or string. Carries the partial frame.
    Truncated(RawDocument),
    Io(io::Error),
}

/// Splits a byte stream of back-to-back JSON values into frames.
///
/// Frames are found by bracket balance, so a frame that later fails to decode
/// never moves the read position: the next call always starts right after it.
pub struct DocumentStream<R> {
    reader: R,
    offset: u64,
    index: usize,
    done: bool,
}

impl<R: BufRead> DocumentStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            index: 0,
            done: false,
        }
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let b = self.peek_byte()?;
        if b.is_some() {
            self.reader.consume(1);
            self.offset += 1;
        }
        Ok(b)
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(b) = self.peek_byte()? {
            if !is_json_whitespace(b) {
                break;
            }
            self.reader.consume(1);
            self.offset += 1;
        }
        Ok(())
    }

    // Reads the rest of a string whose opening quote is already in `buf`.
    fn read_string_tail(&mut self, buf: &mut Vec<u8>) -> io::Result<bool> {
        let mut escaped = false;
        while let Some(b) = self.next_byte()? {
            buf.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_container(&mut self, buf: &mut Vec<u8>) -> io::Result<bool> {
        let mut depth = 1usize;
        while let Some(b) = self.next_byte()? {
            buf.push(b);
            match b {
                b'"' => {
                    if !self.read_string_tail(buf)? {
                        return Ok(false);
                    }
                }
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(true);
                    }
                }
                _ => {}
            }
        }
        Ok(false)
    }

    fn read_scalar(&mut self, buf: &mut Vec<u8>) -> io::Result<()> {
        while let Some(b) = self.peek_byte()? {
            if is_json_whitespace(b) || matches!(b, b'{' | b'[' | b'"' | b'}' | b']') {
                break;
            }
            self.reader.consume(1);
            self.offset += 1;
            buf.push(b);
        }
        Ok(())
    }

    fn read_document(&mut self) -> Result<Option<RawDocument>, StreamError> {
        self.skip_whitespace().map_err(StreamError::Io)?;
        let offset = self.offset;
        let index = self.index;
        let first = match self.next_byte().map_err(StreamError::Io)? {
            Some(b) => b,
            None => return Ok(None),
        };

        let mut bytes = vec![first];
        let complete = match first {
            b'{' | b'[' => self.read_container(&mut bytes).map_err(StreamError::Io)?,
            b'"' => self.read_string_tail(&mut bytes).map_err(StreamError::Io)?,
            // A stray closer is a frame of its own.
            b'}' | b']' => true,
            _ => {
                self.read_scalar(&mut bytes).map_err(StreamError::Io)?;
                true
            }
        };
        self.index += 1;
        let doc = RawDocument {
            index,
            offset,
            bytes,
        };
        if !complete {
            return Err(StreamError::Truncated(doc));
        }
        Ok(Some(doc))
    }
}

impl<R: BufRead> Iterator for DocumentStream<R> {
    type Item = Result<RawDocument, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_document() {
            Ok(Some(doc)) => Some(Ok(doc)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
