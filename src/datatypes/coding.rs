// ABOUTME: Socket-to-Air msg_coding values describing how the frame content is encoded
// ABOUTME: Big5 is the legacy multibyte default used for control operations

use num_enum::TryFromPrimitive;
use std::fmt;

/// Character encoding of an outbound frame's content block.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Coding {
    /// Big5, the legacy multibyte encoding
    #[default]
    Big5 = 1,
    /// Raw binary content
    Binary = 2,
    /// UCS-2 unicode
    Ucs2 = 3,
    /// UTF-8 unicode
    Utf8 = 4,
}

impl Coding {
    pub fn charset_name(&self) -> &'static str {
        match self {
            Coding::Big5 => "Big5",
            Coding::Binary => "binary",
            Coding::Ucs2 => "UCS-2",
            Coding::Utf8 => "UTF-8",
        }
    }
}

impl fmt::Display for Coding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.charset_name())
    }
}
