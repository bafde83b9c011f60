use sha2::{Digest, Sha256};

const HASH_LEN: usize = 8;

/// Short content digest used for change detection, not integrity.
pub fn content_hash(content: &str) -> String {
    content_hash_many([content])
}

/// Digest of several contents hashed as one stream, in order.
pub fn content_hash_many<'a>(contents: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for content in contents {
        hasher.update(content.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..HASH_LEN].to_string()
}
