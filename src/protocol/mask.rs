//! Payload masking (RFC 6455 Section 5.3).
//!
//! Client-originated frames XOR every payload byte with a 4-byte key. The
//! operation is its own inverse, so the same routine serves both the send
//! path (client masking) and the receive path (server unmasking).

/// XOR `data` in place with `key`, starting at key offset 0.
#[inline]
pub fn apply_mask(data: &mut [u8], key: [u8; 4]) {
    apply_mask_offset(data, key, 0);
}

/// XOR `data` in place with `key`, where `data[i]` pairs with
/// `key[(offset + i) % 4]`.
///
/// The running offset lets a payload be masked in chunks: masking chunk
/// `n` with `offset` equal to the number of bytes already processed yields
/// the same result as masking the whole payload at once.
#[inline]
pub fn apply_mask_offset(data: &mut [u8], key: [u8; 4], offset: usize) {
    // Byte-align the head so the word loop sees offset 0.
    let head = (4 - (offset % 4)) % 4;
    let head = head.min(data.len());
    for (i, byte) in data[..head].iter_mut().enumerate() {
        *byte ^= key[(offset + i) % 4];
    }
    apply_mask_words(&mut data[head..], key);
}

/// XOR whole 4-byte words at a time, falling back to bytes for the tail.
///
/// `data` must start at key offset 0.
#[inline]
fn apply_mask_words(data: &mut [u8], key: [u8; 4]) {
    let key_word = u32::from_ne_bytes(key);
    let (chunks, tail) = data.split_at_mut(data.len() - data.len() % 4);

    for chunk in chunks.chunks_exact_mut(4) {
        let word = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        chunk.copy_from_slice(&(word ^ key_word).to_ne_bytes());
    }

    for (i, byte) in tail.iter_mut().enumerate() {
        *byte ^= key[i % 4];
    }
}
