//! Filenames the duplicate-artifact guard always lets through.

/// Maven regenerates these on every deploy, so uploads to them must
/// overwrite even while the unique-artifacts policy is active.
const MUTABLE_SUFFIXES: [&str; 3] = [
    "maven-metadata.xml",
    "maven-metadata.xml.sha1",
    "maven-metadata.xml.md5",
];

/// Whether `key` names repository metadata that is always overwritable.
pub fn is_mutable_metadata(key: &str) -> bool {
    MUTABLE_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}
