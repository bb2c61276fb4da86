use std::borrow::Cow;

use sightline::service::UploadedFile;

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    let (mime, params) = content_type.split_once(';')?;
    if !mime.trim().eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .split(';')
        .map(|s| s.trim())
        .find_map(|s| s.strip_prefix("boundary="))
        .map(|b| b.trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// One part of a multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    /// Present (possibly empty) for file inputs.
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Parsed multipart/form-data body.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    /// Parts without a `Content-Disposition` name are ignored.
    pub fn parse(body: &[u8], boundary: &str) -> MultipartForm {
        let delimiter = format!("--{}", boundary);
        let mut parts = Vec::new();

        for piece in split_on(body, delimiter.as_bytes()) {
            let piece = piece.strip_prefix(b"\r\n").unwrap_or(piece);
            let sep = b"\r\n\r\n";
            let Some(sep_pos) = find_subsequence(piece, sep) else {
                continue;
            };
            let headers = String::from_utf8_lossy(&piece[..sep_pos]);
            let Some(disposition) = headers
                .lines()
                .find_map(|l| l.split_once(':').filter(|(k, _)| k.trim().eq_ignore_ascii_case("content-disposition")))
                .map(|(_, v)| v)
            else {
                continue;
            };
            let Some(name) = disposition_param(disposition, "name") else {
                continue;
            };
            let raw = &piece[sep_pos + sep.len()..];
            parts.push(Part {
                name,
                filename: disposition_param(disposition, "filename"),
                data: raw.strip_suffix(b"\r\n").unwrap_or(raw).to_vec(),
            });
        }
        MultipartForm { parts }
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// First file part named `field`.
    pub fn file(&self, field: &str) -> Option<UploadedFile> {
        self.parts
            .iter()
            .find(|p| p.name == field && p.filename.is_some())
            .map(|p| UploadedFile::new(p.filename.clone().unwrap_or_default(), p.data.clone()))
    }

    /// First non-file part named `field`. Invalid UTF-8 is replaced with
    /// U+FFFD rather than treated as a missing field.
    pub fn text(&self, field: &str) -> Option<Cow<'_, str>> {
        self.parts
            .iter()
            .find(|p| p.name == field && p.filename.is_none())
            .map(|p| String::from_utf8_lossy(&p.data))
    }
}

/// Reads `key="value"` (or an unquoted value) from a Content-Disposition
/// header value; keys match exactly, so `name` never matches `filename`.
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition.split(';').map(str::trim).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        k.trim()
            .eq_ignore_ascii_case(key)
            .then(|| v.trim().trim_matches('"').to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(boundary: &str) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        b.extend_from_slice(b"Content-Disposition: form-data; name=\"mode\"\r\n\r\ncurrency\r\n");
        b.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        b.extend_from_slice(b"Content-Disposition: form-data; name=\"file\"; filename=\"note.jpg\"\r\n");
        b.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        b.extend_from_slice(&[0xff, 0xd8, 0x0d, 0x0a, 0x00, 0xff]);
        b.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        b
    }

    #[test]
    fn boundary_only_for_multipart() {
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=\"----abc\"").as_deref(),
            Some("----abc")
        );
        assert_eq!(extract_boundary("application/json"), None);
        assert_eq!(extract_boundary("text/plain; boundary=x"), None);
    }

    #[test]
    fn parses_text_and_binary_file_parts() {
        let form = MultipartForm::parse(&body("XyZ"), "XyZ");
        assert_eq!(form.parts().len(), 2);
        assert_eq!(form.text("mode").as_deref(), Some("currency"));

        let file = form.file("file").unwrap();
        assert_eq!(file.filename, "note.jpg");
        assert_eq!(file.bytes, vec![0xff, 0xd8, 0x0d, 0x0a, 0x00, 0xff]);

        // A file field is not a text field and vice versa.
        assert_eq!(form.text("file"), None);
        assert_eq!(form.text("missing"), None);
        assert!(form.file("mode").is_none());
    }

    #[test]
    fn non_utf8_text_part_is_present_but_lossy() {
        let mut b = b"--B\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\n".to_vec();
        b.extend_from_slice(&[0xff, 0xfe]);
        b.extend_from_slice(b"\r\n--B--\r\n");
        let form = MultipartForm::parse(&b, "B");
        assert_eq!(form.text("mode").as_deref(), Some("\u{fffd}\u{fffd}"));
    }

    #[test]
    fn empty_filename_is_still_a_file_part() {
        let b = b"--B\r\nContent-Disposition: form-data; name=\"file\"; filename=\"\"\r\n\r\n\r\n--B--\r\n";
        let file = MultipartForm::parse(b, "B").file("file").unwrap();
        assert_eq!(file.filename, "");
        assert!(file.bytes.is_empty());
    }
}
