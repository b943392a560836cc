use crate::error::Result;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Assemble rendered `(path, text)` pairs into a single zip blob.
/// Directory entries are implied by the file paths.
pub fn bundle(files: &[(String, String)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (path, text) in files {
        writer.start_file(path.as_str(), options)?;
        writer.write_all(text.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn bundle_roundtrips_entries() {
        let files = vec![
            ("README.md".to_string(), "# hello".to_string()),
            (
                "commands/epics/epic-1.md".to_string(),
                "epic one".to_string(),
            ),
        ];
        let blob = bundle(&files).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(blob)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut body = String::new();
        archive
            .by_name("commands/epics/epic-1.md")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "epic one");
    }

    #[test]
    fn empty_file_set_is_a_valid_archive() {
        let blob = bundle(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(blob)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
