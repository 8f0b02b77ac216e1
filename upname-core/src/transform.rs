use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Map accented Vietnamese Latin letters to their unaccented base letters,
/// preserving case. `đ`/`Đ` have no canonical decomposition, so they are
/// replaced directly; everything else is NFD-decomposed and stripped of
/// combining marks.
pub fn strip_diacritics(s: &str) -> String {
    s.replace('đ', "d")
        .replace('Đ', "D")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Transform a single file or directory name.
///
/// Fixed order: hyphens to underscores, optionally spaces to underscores,
/// diacritic stripping, then uppercase over the whole name (extension
/// included). Total over any input; one pass reaches a fixed point.
pub fn transform_name(name: &str, replace_spaces: bool) -> String {
    let mut s = name.replace('-', "_");
    if replace_spaces {
        s = s.replace(' ', "_");
    }
    strip_diacritics(&s).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphens_become_underscores() {
        assert_eq!(transform_name("my-file.txt", false), "MY_FILE.TXT");
        assert_eq!(transform_name("a-b-c", false), "A_B_C");
    }

    #[test]
    fn test_spaces_only_replaced_when_enabled() {
        assert_eq!(transform_name("hello world", false), "HELLO WORLD");
        assert_eq!(transform_name("hello world", true), "HELLO_WORLD");
    }

    #[test]
    fn test_uppercases_extension_too() {
        assert_eq!(transform_name("report.pdf", false), "REPORT.PDF");
        assert_eq!(transform_name("archive.tar.gz", false), "ARCHIVE.TAR.GZ");
    }

    #[test]
    fn test_strips_vietnamese_diacritics() {
        assert_eq!(strip_diacritics("đ"), "d");
        assert_eq!(strip_diacritics("Đ"), "D");
        assert_eq!(strip_diacritics("ế"), "e");
        assert_eq!(strip_diacritics("Ế"), "E");
        assert_eq!(strip_diacritics("Đường"), "Duong");
    }

    #[test]
    fn test_full_vietnamese_example() {
        assert_eq!(transform_name("Đường Phố-Cũ", true), "DUONG_PHO_CU");
    }

    #[test]
    fn test_empty_maps_to_empty() {
        assert_eq!(transform_name("", true), "");
        assert_eq!(transform_name("", false), "");
    }

    #[test]
    fn test_transform_is_idempotent() {
        for name in [
            "Đường Phố-Cũ",
            "my-file.txt",
            "MY_FILE.TXT",
            "Báo cáo-2024.pdf",
            "hello world",
            "đĐ-mixed case.TAR.GZ",
        ] {
            for replace_spaces in [false, true] {
                let once = transform_name(name, replace_spaces);
                let twice = transform_name(&once, replace_spaces);
                assert_eq!(once, twice, "not a fixed point for {:?}", name);
            }
        }
    }
}
