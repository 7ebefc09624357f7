use std::collections::HashMap;

/// Interned NUL-terminated strings of the data segment.
///
/// Each distinct string is stored once; its address is `base` plus its
/// offset in the segment.
#[derive(Debug, Clone)]
pub struct StringTable {
    base: u32,
    data: Vec<u8>,
    addresses: HashMap<String, u32>,
}

impl StringTable {
    pub fn new(base: u32) -> Self {
        Self {
            base,
            data: Vec::new(),
            addresses: HashMap::new(),
        }
    }

    /// Address of `s`, appending it (with a trailing NUL) on first use.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&addr) = self.addresses.get(s) {
            return addr;
        }
        let addr = self.base.wrapping_add(self.data.len() as u32);
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        self.addresses.insert(s.to_owned(), addr);
        log::debug!("intern {:?} at 0x{:08x}", s, addr);
        addr
    }

    pub fn address_of(&self, s: &str) -> Option<u32> {
        self.addresses.get(s).copied()
    }

    /// The segment bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_layout() {
        let mut strings = StringTable::new(0x8000_1000);
        assert_eq!(strings.intern("PASS: VirtIO Found\n"), 0x8000_1000);
        assert_eq!(strings.intern("FAIL: Magic Mismatch\n"), 0x8000_1014);
        assert_eq!(strings.data().len(), 20 + 22);
        assert_eq!(strings.data()[19], 0);
        assert_eq!(*strings.data().last().unwrap(), 0);
    }

    #[test]
    fn test_intern_deduplicates() {
        let mut strings = StringTable::new(0x100);
        let first = strings.intern("hello");
        let again = strings.intern("hello");
        assert_eq!(first, again);
        assert_eq!(strings.data(), b"hello\0");
        assert_eq!(strings.address_of("hello"), Some(0x100));
        assert_eq!(strings.address_of("other"), None);
    }

    #[test]
    fn test_empty_string() {
        let mut strings = StringTable::new(0);
        assert_eq!(strings.intern(""), 0);
        assert_eq!(strings.intern("x"), 1);
        assert_eq!(strings.data(), b"\0x\0");
    }
}
