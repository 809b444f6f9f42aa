use encoding_rs::{Encoding, BIG5, UTF_8};

#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    /// Malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Decodes a report file body.
///
/// A byte-order mark wins; otherwise the bytes are taken as UTF-8, and when
/// they are not valid UTF-8 they are read as Big5, the usual legacy encoding
/// for Traditional Chinese notes.
pub fn decode_report_bytes(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (cow, lossy) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            text: cow.into_owned(),
            encoding,
            lossy,
        };
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: s.to_string(),
            encoding: UTF_8,
            lossy: false,
        };
    }

    let (cow, lossy) = BIG5.decode_without_bom_handling(bytes);
    DecodedText {
        text: cow.into_owned(),
        encoding: BIG5,
        lossy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8_passes_through() {
        let d = decode_report_bytes("## 定價預測\n目標價格：150".as_bytes());
        assert_eq!(d.encoding, UTF_8);
        assert!(!d.lossy);
        assert!(d.text.starts_with("## 定價預測"));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("# 2330 台積電".as_bytes());
        let d = decode_report_bytes(&bytes);
        assert_eq!(d.encoding, UTF_8);
        assert_eq!(d.text, "# 2330 台積電");
    }

    #[test]
    fn falls_back_to_big5() {
        let (encoded, _, _) = BIG5.encode("風險評估");
        assert!(std::str::from_utf8(&encoded).is_err());

        let d = decode_report_bytes(&encoded);
        assert_eq!(d.encoding, BIG5);
        assert_eq!(d.text, "風險評估");
        assert!(!d.lossy);
    }
}
