// NUL-terminated owned text that C callers can borrow in place.
use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;

use crate::core::error::{Error, ErrorKind};

/// UTF-8 text stored with a trailing NUL byte.
///
/// Invariant: the backing string ends with exactly one `'\0'` and contains no
/// other NUL, so the first `len() - 1` bytes are the text and the whole buffer
/// is a valid C string.
#[derive(Clone, Eq, PartialEq)]
pub struct CText(String);

impl CText {
    pub fn new(text: impl Into<String>) -> Result<Self, Error> {
        let mut text = text.into();
        if text.contains('\0') {
            return Err(Error::new(ErrorKind::Usage).with_message("text contains NUL"));
        }
        text.try_reserve_exact(1)?;
        text.push('\0');
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }

    pub fn as_c_str(&self) -> &CStr {
        match CStr::from_bytes_with_nul(self.0.as_bytes()) {
            Ok(text) => text,
            Err(_) => c"",
        }
    }

    /// Points at heap storage, so it stays valid across moves of `self` and
    /// is invalidated only when this value is dropped.
    pub fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr().cast::<c_char>()
    }

    pub fn len(&self) -> usize {
        self.0.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}
