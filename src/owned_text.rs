//! OwnedText: heap-backed, value-semantic UTF-8 text.
//!
//! Hashing and equality agree with `str`, so tables keyed by `OwnedText`
//! can be queried with `&str`.

use crate::error::TextError;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem;
use core::ops::Deref;
use core::str::FromStr;

/// Owned text buffer. Empty text does not allocate.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct OwnedText {
    buf: Box<str>,
}

impl OwnedText {
    /// Copy `text` into a new buffer.
    pub fn new(text: &str) -> Self {
        Self { buf: text.into() }
    }

    /// Take ownership of `bytes` if they are valid UTF-8.
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self, TextError> {
        match String::from_utf8(bytes) {
            Ok(s) => Ok(Self::from(s)),
            Err(e) => Err(TextError::InvalidUtf8 {
                valid_up_to: e.utf8_error().valid_up_to(),
            }),
        }
    }

    /// Copy `bytes`, replacing invalid sequences with U+FFFD.
    pub fn from_utf8_lossy(bytes: &[u8]) -> Self {
        Self::from(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Move the buffer out, leaving `self` empty.
    pub fn take(&mut self) -> OwnedText {
        mem::take(self)
    }

    pub fn into_string(self) -> String {
        self.buf.into_string()
    }
}

impl Hash for OwnedText {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl Deref for OwnedText {
    type Target = str;
    fn deref(&self) -> &str {
        &self.buf
    }
}

impl Borrow<str> for OwnedText {
    fn borrow(&self) -> &str {
        &self.buf
    }
}

impl AsRef<str> for OwnedText {
    fn as_ref(&self) -> &str {
        &self.buf
    }
}

impl AsRef<[u8]> for OwnedText {
    fn as_ref(&self) -> &[u8] {
        self.buf.as_bytes()
    }
}

impl From<&str> for OwnedText {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for OwnedText {
    fn from(s: String) -> Self {
        Self {
            buf: s.into_boxed_str(),
        }
    }
}

impl From<OwnedText> for String {
    fn from(t: OwnedText) -> Self {
        t.into_string()
    }
}

impl FromStr for OwnedText {
    type Err = core::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl PartialEq<str> for OwnedText {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for OwnedText {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<OwnedText> for str {
    fn eq(&self, other: &OwnedText) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<OwnedText> for &str {
    fn eq(&self, other: &OwnedText) -> bool {
        *self == other.as_str()
    }
}

impl fmt::Display for OwnedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

impl fmt::Debug for OwnedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.buf, f)
    }
}
