//! Text decoding for delimited input.

use encoding_rs::DecoderResult;
use encoding_rs::UTF_8;

/// Decodes UTF-8 bytes, dropping a leading BOM and every malformed byte sequence.
///
/// Returns the text and the number of discarded sequences.
pub(crate) fn decode_utf8_discarding(bytes: &[u8]) -> (String, usize) {
    let mut decoder = UTF_8.new_decoder_with_bom_removal();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len());
    let mut text = String::with_capacity(capacity);
    let mut offset = 0usize;
    let mut discarded = 0usize;
    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(&bytes[offset..], &mut text, true);
        offset += read;
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::Malformed(_, _) => discarded += 1,
            DecoderResult::OutputFull => {
                let remaining = bytes.len() - offset;
                let additional = decoder
                    .max_utf8_buffer_length_without_replacement(remaining)
                    .unwrap_or(remaining);
                text.reserve(additional.max(4));
            }
        }
    }
    (text, discarded)
}
