use crate::codec::NameCodec;
use crate::error::{Result, WinbakError};

/// Recovers entry names from raw stored bytes.
///
/// Works on the raw name, never a separator-normalized one: in multi-byte code
/// pages such as Shift_JIS the trailing byte of a character can be 0x5C.
#[derive(Clone, Debug, Default)]
pub struct NameDecoder {
    fallback: Option<NameCodec>,
}

impl NameDecoder {
    pub fn new(fallback: Option<NameCodec>) -> Self {
        Self { fallback }
    }

    pub fn from_label(label: Option<&str>) -> Result<Self> {
        let fallback = label.map(NameCodec::from_label).transpose()?;
        Ok(Self { fallback })
    }

    /// UTF-8 flag wins, then the configured codec, then the format's IBM437 default.
    pub fn decode(&self, raw: &[u8], utf8_flag: bool) -> Result<String> {
        if utf8_flag {
            return std::str::from_utf8(raw)
                .map(str::to_owned)
                .map_err(|_| decode_error("UTF-8", raw));
        }
        let codec = self.fallback.unwrap_or(NameCodec::Cp437);
        codec
            .decode(raw)
            .map(|s| s.into_owned())
            .ok_or_else(|| decode_error(codec.name(), raw))
    }
}

fn decode_error(codec: &'static str, raw: &[u8]) -> WinbakError {
    WinbakError::Decode {
        codec,
        raw: raw.iter().map(|b| format!("{b:02x}")).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 表 is 0x95 0x5C in Shift_JIS; the trailing byte reads as a backslash.
    const SJIS_NAME: &[u8] = &[0x95, 0x5C, b'/', b'a', b'.', b't', b'x', b't'];

    #[test]
    fn utf8_flag_ignores_fallback() {
        let raw = "résumé/ファイル.txt".as_bytes();
        let plain = NameDecoder::default();
        let sjis = NameDecoder::from_label(Some("cp932")).unwrap();
        let cyr = NameDecoder::from_label(Some("cp1251")).unwrap();
        let expected = "résumé/ファイル.txt";
        assert_eq!(plain.decode(raw, true).unwrap(), expected);
        assert_eq!(sjis.decode(raw, true).unwrap(), expected);
        assert_eq!(cyr.decode(raw, true).unwrap(), expected);
    }

    #[test]
    fn fallback_codec_used_without_flag() {
        let d = NameDecoder::from_label(Some("cp932")).unwrap();
        assert_eq!(d.decode(SJIS_NAME, false).unwrap(), "表/a.txt");
    }

    #[test]
    fn default_is_cp437() {
        let d = NameDecoder::default();
        assert_eq!(d.decode(&[b'a', 0x81, b'b'], false).unwrap(), "aüb");
    }

    #[test]
    fn invalid_bytes_are_decode_errors() {
        let d = NameDecoder::default();
        let err = d.decode(&[0xff, 0xfe], true).unwrap_err();
        assert!(matches!(err, WinbakError::Decode { codec: "UTF-8", .. }));

        let sjis = NameDecoder::from_label(Some("cp932")).unwrap();
        assert!(matches!(
            sjis.decode(&[b'x', 0x82], false),
            Err(WinbakError::Decode { .. })
        ));
    }
}
