use std::path::Path;

use benthic_scan::MediaKind;
use benthic_scan::media::{classify, list_media};

#[test]
fn test_classify_extensions() {
    for name in ["a.jpg", "a.PNG", "a.jpeg", "a.bmp", "a.Tif"] {
        assert_eq!(classify(Path::new(name)), Some(MediaKind::Image), "{}", name);
    }
    for name in ["a.mp4", "a.AVI", "a.mov", "a.mkv"] {
        assert_eq!(classify(Path::new(name)), Some(MediaKind::Video), "{}", name);
    }
    for name in ["a.tiff", "a.gif", "a.txt", "noext", ".jpg"] {
        assert_eq!(classify(Path::new(name)), None, "{}", name);
    }
}

#[test]
fn test_list_media_filters_and_is_flat() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    for name in ["reef.JPG", "clip.mkv", "readme.md", "frame.bmp", "raw.cr2"] {
        std::fs::write(dir.path().join(name), b"")?;
    }
    std::fs::create_dir(dir.path().join("nested"))?;
    std::fs::write(dir.path().join("nested/deep.jpg"), b"")?;
    std::fs::create_dir(dir.path().join("folder.mp4"))?;

    let mut files = list_media(dir.path())?;
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let listed: Vec<(String, MediaKind)> = files.iter().map(|f| (f.file_name(), f.kind)).collect();
    assert_eq!(
        listed,
        vec![
            ("clip.mkv".to_string(), MediaKind::Video),
            ("frame.bmp".to_string(), MediaKind::Image),
            ("reef.JPG".to_string(), MediaKind::Image),
        ]
    );
    Ok(())
}

#[test]
fn test_list_media_empty_folder() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    assert!(list_media(dir.path())?.is_empty());
    Ok(())
}
