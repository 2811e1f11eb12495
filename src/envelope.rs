//! Binary envelope format
//!
//! ```text
//! text layout: [16 salt][12 nonce][ciphertext ‖ 16-byte tag]
//! file layout: [16 salt][12 nonce][1 name len N][N name bytes][ciphertext ‖ 16-byte tag]
//! ```
//!
//! Every field is a fixed-size byte run or a single length byte, so there is
//! no endianness to agree on. The layout is not self-describing: the reader
//! must know which variant it holds.

use crate::crypto::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{PasscryptError, Result};

/// Salt plus nonce
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

/// A filename length must fit in the single prefix byte
pub const MAX_FILENAME_LEN: usize = u8::MAX as usize;

/// Fail with `InvalidInput` unless `name` fits the one-byte length prefix
pub fn check_filename_len(name: &str) -> Result<()> {
    if name.len() > MAX_FILENAME_LEN {
        return Err(PasscryptError::InvalidInput(format!(
            "filename is {} bytes, at most {} allowed",
            name.len(),
            MAX_FILENAME_LEN
        )));
    }
    Ok(())
}

/// Which envelope variant a buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// No filename section
    Text,
    /// Length-prefixed filename between header and ciphertext
    File,
}

impl Layout {
    /// Smallest buffer that can hold this layout (empty plaintext, empty name)
    pub const fn min_len(self) -> usize {
        match self {
            Layout::Text => HEADER_LEN + TAG_LEN,
            Layout::File => HEADER_LEN + 1 + TAG_LEN,
        }
    }
}

/// A parsed or to-be-written envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// `Some` only for the file layout
    pub filename: Option<String>,
    /// Ciphertext with the tag appended
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn layout(&self) -> Layout {
        if self.filename.is_some() {
            Layout::File
        } else {
            Layout::Text
        }
    }

    /// Serialize to bytes.
    ///
    /// Fails with `InvalidInput` when the filename does not fit the one-byte
    /// length prefix.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if let Some(name) = self.filename.as_deref() {
            check_filename_len(name)?;
        }
        let name = self.filename.as_deref().map(str::as_bytes);

        let name_section = name.map_or(0, |n| 1 + n.len());
        let mut out = Vec::with_capacity(HEADER_LEN + name_section + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        if let Some(name) = name {
            out.push(name.len() as u8);
            out.extend_from_slice(name);
        }
        out.extend_from_slice(&self.ciphertext);

        Ok(out)
    }

    /// Parse `data` as the given layout.
    ///
    /// Only structure is checked here; authenticity is established later by
    /// the cipher tag.
    pub fn decode(data: &[u8], layout: Layout) -> Result<Self> {
        if data.len() < layout.min_len() {
            return Err(PasscryptError::MalformedEnvelope(format!(
                "{} bytes is shorter than the {}-byte minimum",
                data.len(),
                layout.min_len()
            )));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[..SALT_LEN]);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[SALT_LEN..HEADER_LEN]);

        let mut offset = HEADER_LEN;
        let filename = match layout {
            Layout::Text => None,
            Layout::File => {
                let name_len = data[offset] as usize;
                offset += 1;

                let name_end = offset + name_len;
                if name_end + TAG_LEN > data.len() {
                    return Err(PasscryptError::MalformedEnvelope(format!(
                        "filename length {} runs past the end of the envelope",
                        name_len
                    )));
                }

                let name = std::str::from_utf8(&data[offset..name_end]).map_err(|_| {
                    PasscryptError::MalformedEnvelope("filename is not valid UTF-8".into())
                })?;
                offset = name_end;
                Some(name.to_owned())
            }
        };

        Ok(Self {
            salt,
            nonce,
            filename,
            ciphertext: data[offset..].to_vec(),
        })
    }
}
