/// Decode an object key as delivered in a storage notification.
///
/// Notification payloads encode keys form-style: `+` stands for a space and
/// everything else is percent-encoded. Bytes that do not form valid UTF-8
/// after decoding are replaced with U+FFFD.
pub fn decode_object_key(raw_key: &str) -> String {
    let spaced = raw_key.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Backup keys mirror the source layout one-to-one.
pub fn backup_key_for(source_key: &str) -> String {
    source_key.to_string()
}

/// Build the `CopySource` value for a server-side copy:
/// `bucket/encoded-key[?versionId=...]`, keeping `/` separators literal.
pub fn copy_source_path(bucket: &str, key: &str, version_id: Option<&str>) -> String {
    let encoded_key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    match version_id.filter(|version| !version.is_empty()) {
        Some(version) => format!(
            "{bucket}/{encoded_key}?versionId={}",
            urlencoding::encode(version)
        ),
        None => format!("{bucket}/{encoded_key}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_decodes_to_space_and_percent_sequences_decode() {
        assert_eq!(decode_object_key("a+b%2Fc"), "a b/c");
        assert_eq!(decode_object_key("reports%2F2024.csv"), "reports/2024.csv");
    }

    #[test]
    fn encoded_plus_survives_as_literal_plus() {
        assert_eq!(decode_object_key("c%2B%2B+notes.md"), "c++ notes.md");
    }

    #[test]
    fn multibyte_sequences_decode_to_unicode() {
        assert_eq!(decode_object_key("caf%C3%A9%2Fmen%C3%BC.txt"), "café/menü.txt");
    }

    #[test]
    fn invalid_utf8_is_replaced_instead_of_failing() {
        assert_eq!(decode_object_key("bad%FFkey"), "bad\u{FFFD}key");
    }

    #[test]
    fn plain_keys_pass_through() {
        assert_eq!(decode_object_key("logs/2024/01/app.log"), "logs/2024/01/app.log");
    }

    #[test]
    fn backup_key_mirrors_source_key() {
        assert_eq!(backup_key_for("a b/c.txt"), "a b/c.txt");
    }

    #[test]
    fn copy_source_keeps_slashes_and_encodes_segments() {
        assert_eq!(
            copy_source_path("uploads", "reports/q1 summary.csv", None),
            "uploads/reports/q1%20summary.csv"
        );
    }

    #[test]
    fn copy_source_appends_version_when_present() {
        assert_eq!(
            copy_source_path("uploads", "a+b.txt", Some("3HL4kqtJ")),
            "uploads/a%2Bb.txt?versionId=3HL4kqtJ"
        );
    }

    #[test]
    fn empty_version_id_is_left_off_the_copy_source() {
        assert_eq!(copy_source_path("b", "k", Some("")), "b/k");
    }
}
