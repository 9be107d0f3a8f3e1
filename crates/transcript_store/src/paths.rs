use std::path::{Path, PathBuf};

pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Maps a user-supplied destination onto the file that will be written.
///
/// The last extension is replaced by `.txt`; a destination without one gets
/// `.txt` appended. Directories in the destination are kept as given.
#[must_use]
pub fn transcript_path(destination: &str) -> PathBuf {
    Path::new(destination).with_extension(TRANSCRIPT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_gets_txt_extension() {
        assert_eq!(transcript_path("myfile"), PathBuf::from("myfile.txt"));
    }

    #[test]
    fn existing_extension_is_replaced() {
        assert_eq!(transcript_path("myfile.md"), PathBuf::from("myfile.txt"));
        assert_eq!(transcript_path("notes.txt"), PathBuf::from("notes.txt"));
        assert_eq!(
            transcript_path("archive.tar.gz"),
            PathBuf::from("archive.tar.txt")
        );
    }

    #[test]
    fn directories_are_preserved() {
        assert_eq!(transcript_path("/tmp/out"), PathBuf::from("/tmp/out.txt"));
        assert_eq!(
            transcript_path("dialogues/justice.md"),
            PathBuf::from("dialogues/justice.txt")
        );
    }
}
