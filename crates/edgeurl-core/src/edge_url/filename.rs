//! Delivery filename derivation.

use crate::media::MediaType;

/// Derives the filename segment of an edge URL.
///
/// - Starts from `name` when given (an empty name is kept), else `src`
/// - Removes every `%` so the segment cannot collide with percent-encoding
/// - Replaces everything from the last `.` with the media extension, or
///   appends the extension when there is no `.`
pub fn derive_edge_filename(src: &str, name: Option<&str>, media_type: MediaType) -> String {
    let base: String = name.unwrap_or(src).chars().filter(|&c| c != '%').collect();
    let stem = match base.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => base.as_str(),
    };

    let extension = media_type.extension();
    let mut out = String::with_capacity(stem.len() + extension.len());
    out.push_str(stem);
    out.push_str(extension);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_extension() {
        assert_eq!(
            derive_edge_filename("k", Some("My Pic.png"), MediaType::Image),
            "My Pic.jpeg"
        );
    }

    #[test]
    fn replaces_only_last_extension() {
        assert_eq!(
            derive_edge_filename("k", Some("clip.final.mov"), MediaType::Video),
            "clip.final.mp4"
        );
    }

    #[test]
    fn appends_when_no_dot() {
        assert_eq!(derive_edge_filename("abc123", None, MediaType::Image), "abc123.jpeg");
        assert_eq!(derive_edge_filename("abc123", None, MediaType::Audio), "abc123.mp3");
    }

    #[test]
    fn strips_percent() {
        assert_eq!(
            derive_edge_filename("k", Some("50% off.png"), MediaType::Image),
            "50 off.jpeg"
        );
        assert_eq!(derive_edge_filename("a%20b", None, MediaType::Image), "a20b.jpeg");
    }

    #[test]
    fn empty_name_is_not_replaced_by_src() {
        assert_eq!(derive_edge_filename("abc", Some(""), MediaType::Image), ".jpeg");
    }

    #[test]
    fn leading_dot_only() {
        assert_eq!(derive_edge_filename("k", Some(".hidden"), MediaType::Image), ".jpeg");
    }
}
