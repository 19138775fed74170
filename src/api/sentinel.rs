//! Purpose: Translate tagged results to and from the `"nil"` wire sentinel.
//! Exports: `SENTINEL`, `SENTINEL_C`, `Lookup::to_wire`, `Lookup::from_wire`.
//! Role: The only place the sentinel literal is defined.
//! Invariants: `Missing` is the only lookup that maps to the sentinel on the way out.
//! Notes: A stored value equal to the sentinel reads back as `Missing` after a wire round trip.
use std::ffi::CStr;

use super::store::Lookup;

pub const SENTINEL: &str = "nil";
pub const SENTINEL_C: &CStr = c"nil";

impl Lookup {
    pub fn to_wire(&self) -> &str {
        self.as_str().unwrap_or(SENTINEL)
    }

    pub fn from_wire(text: &str) -> Self {
        if text == SENTINEL {
            Lookup::Missing
        } else {
            Lookup::from_text(Some(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SENTINEL, SENTINEL_C};
    use crate::api::Lookup;

    #[test]
    fn sentinel_literals_agree() {
        assert_eq!(SENTINEL_C.to_str().expect("utf8"), SENTINEL);
    }

    #[test]
    fn wire_translation() {
        assert_eq!(Lookup::Missing.to_wire(), "nil");
        assert_eq!(Lookup::Empty.to_wire(), "");
        assert_eq!(Lookup::Value("x y".to_string()).to_wire(), "x y");

        assert_eq!(Lookup::from_wire("nil"), Lookup::Missing);
        assert_eq!(Lookup::from_wire(""), Lookup::Empty);
        assert_eq!(Lookup::from_wire("1"), Lookup::Value("1".to_string()));
    }
}
