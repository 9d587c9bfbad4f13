use bytes::{Buf, BytesMut};
use encoding_rs::{CoderResult, Encoding};
use std::io;
use tokio_util::codec::Decoder;
use tracing::warn;

/// Frames raw bytes in some legacy charset (e.g. windows-1252 spreadsheet
/// exports) into UTF-8 chunks. A BOM, if present, picks the encoding instead.
pub struct Utf8Transcoder {
    decoder: encoding_rs::Decoder,
    replaced: bool,
    finished: bool,
}

impl Utf8Transcoder {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
            replaced: false,
            finished: false,
        }
    }

    fn transcode(&mut self, src: &mut BytesMut, last: bool) -> Option<BytesMut> {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len() * 3 + 4);
        let mut out = vec![0u8; capacity];
        let (result, read, written, had_errors) = self.decoder.decode_to_utf8(src, &mut out, last);
        debug_assert!(matches!(result, CoderResult::InputEmpty));
        if had_errors && !self.replaced {
            warn!(
                encoding = self.decoder.encoding().name(),
                "malformed bytes in catalog source replaced with U+FFFD"
            );
            self.replaced = true;
        }
        src.advance(read);
        if written == 0 {
            return None;
        }
        out.truncate(written);
        Some(BytesMut::from(&out[..]))
    }
}

impl Decoder for Utf8Transcoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        // Partial multi-byte sequences are buffered inside the decoder, so the
        // whole source buffer is always consumed.
        Ok(self.transcode(src, false))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.finished {
            return Ok(None);
        }
        let out = self.transcode(buf, true);
        self.finished = true;
        buf.clear();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_1252_accents_become_utf8() {
        let mut transcoder = Utf8Transcoder::new(encoding_rs::WINDOWS_1252);
        // "Categoría" with 0xED for í
        let mut src = BytesMut::from(&b"Categor\xeda"[..]);
        let out = transcoder.decode_eof(&mut src).unwrap().unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap(), "Categoría");
    }
}
