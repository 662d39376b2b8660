use crate::error::{Result, WinbakError};
use encoding_rs::Encoding;
use std::borrow::Cow;

pub mod cp437;

/// Text codec for entry names stored without the UTF-8 flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NameCodec {
    Cp437,
    Labeled(&'static Encoding),
}

// Code-page spellings users reach for that are not WHATWG labels.
const ALIASES: &[(&str, &str)] = &[
    ("cp932", "windows-31j"),
    ("ms-kanji", "windows-31j"),
    ("cp936", "gbk"),
    ("cp949", "euc-kr"),
    ("uhc", "euc-kr"),
    ("cp950", "big5"),
    ("utf8", "utf-8"),
];

impl NameCodec {
    pub fn from_label(label: &str) -> Result<Self> {
        let norm = label.trim().to_ascii_lowercase().replace('_', "-");
        if matches!(norm.as_str(), "cp437" | "ibm437" | "437" | "ibm-437") {
            return Ok(NameCodec::Cp437);
        }
        let resolved = ALIASES
            .iter()
            .find(|(alias, _)| *alias == norm)
            .map(|(_, target)| *target)
            .unwrap_or(norm.as_str());
        Encoding::for_label(resolved.as_bytes())
            .map(NameCodec::Labeled)
            .ok_or_else(|| WinbakError::Configuration(format!("unknown encoding: {label}")))
    }

    pub fn name(&self) -> &'static str {
        match self {
            NameCodec::Cp437 => "IBM437",
            NameCodec::Labeled(enc) => enc.name(),
        }
    }

    /// Strict decode: malformed input yields `None` instead of replacement chars.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            NameCodec::Cp437 => Some(Cow::Owned(cp437::decode(bytes))),
            NameCodec::Labeled(enc) => enc.decode_without_bom_handling_and_without_replacement(bytes),
        }
    }
}
