use std::{
    ffi::OsStr,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::IoError;

/// Name of the manifest written under the image folder.
pub const MANIFEST_FILE_NAME: &str = "image_paths_file.txt";

/// An ordered list of image paths selected from a folder.
///
/// The paths are absolute and ordered by file name. The selection is persisted in a manifest
/// file next to the images, which is left on disk after the run.
#[derive(Debug, Clone)]
pub struct ImageSet {
    paths: Vec<PathBuf>,
    manifest_path: PathBuf,
}

impl ImageSet {
    /// Build the image set for the 1-based inclusive range `[first, last]`.
    ///
    /// # Arguments
    ///
    /// * `root` - The folder containing the images. It is searched recursively.
    /// * `extension` - The extension of the images, without the dot. Case sensitive.
    /// * `first` - The first image to consider, starting at 1.
    /// * `last` - The last image to consider. Clamped to the number of images found.
    ///
    /// # Returns
    ///
    /// The selected image paths, read back from the manifest written under `root`.
    pub fn build(
        root: impl AsRef<Path>,
        extension: &str,
        first: usize,
        last: usize,
    ) -> Result<Self, IoError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(IoError::FileDoesNotExist(root.to_path_buf()));
        }
        let root = std::fs::canonicalize(root)?;

        let found = find_images(&root, extension)?;
        if found.is_empty() {
            return Err(IoError::NoImagesFound(root, extension.to_string()));
        }
        log::debug!("Found {} files with extension {}", found.len(), extension);

        let selected = select_range(&found, first, last)?;

        let manifest_path = root.join(MANIFEST_FILE_NAME);
        write_manifest(&manifest_path, selected)?;

        let paths = read_manifest(&manifest_path)?;
        log::info!(
            "Selected {} images, manifest written to {}",
            paths.len(),
            manifest_path.display()
        );

        Ok(Self {
            paths,
            manifest_path,
        })
    }

    /// Get the selected image paths in order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Get the path of the manifest file.
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Get the number of selected images.
    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the image set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Recursively collect the regular files under `root` whose extension is exactly `extension`.
///
/// The result is sorted by file name, not by full path.
pub fn find_images(root: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>, IoError> {
    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new(extension))
        {
            paths.push(entry.into_path());
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths)
}

/// Select the 1-based inclusive range `[first, last]` of `paths`.
///
/// `last` is clamped to the number of paths.
pub fn select_range(paths: &[PathBuf], first: usize, last: usize) -> Result<&[PathBuf], IoError> {
    let count = paths.len();
    let last_clamped = last.min(count);

    if first == 0 || first > last_clamped {
        return Err(IoError::InvalidRange { first, last, count });
    }

    Ok(&paths[first - 1..last_clamped])
}

/// Write the file names of `paths` to the manifest, one per line.
pub fn write_manifest(manifest_path: impl AsRef<Path>, paths: &[PathBuf]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(manifest_path)?);
    for path in paths {
        let file_name = path
            .file_name()
            .ok_or_else(|| IoError::FileDoesNotExist(path.clone()))?;
        writeln!(writer, "{}", file_name.to_string_lossy())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the manifest back, joining every line with the manifest's own folder.
pub fn read_manifest(manifest_path: impl AsRef<Path>) -> Result<Vec<PathBuf>, IoError> {
    let manifest_path = manifest_path.as_ref();
    let unreadable = |e| IoError::ManifestUnreadable(manifest_path.to_path_buf(), e);

    let file = File::open(manifest_path).map_err(unreadable)?;
    let folder = manifest_path.parent().unwrap_or_else(|| Path::new(""));

    BufReader::new(file)
        .lines()
        .map(|line| line.map(|name| folder.join(name)).map_err(unreadable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> std::io::Result<PathBuf> {
        let path = dir.join(name);
        File::create(&path)?;
        Ok(path)
    }

    #[test]
    fn test_select_range_clamps_last() {
        let paths = (0..5)
            .map(|i| PathBuf::from(format!("img_{i}.jpg")))
            .collect::<Vec<_>>();

        let selected = select_range(&paths, 2, 100).unwrap();
        assert_eq!(selected.len(), 5 - 2 + 1);
        assert_eq!(selected[0], PathBuf::from("img_1.jpg"));
        assert_eq!(selected[3], PathBuf::from("img_4.jpg"));
    }

    #[test]
    fn test_select_range_exact() {
        let paths = (0..5)
            .map(|i| PathBuf::from(format!("img_{i}.jpg")))
            .collect::<Vec<_>>();

        let selected = select_range(&paths, 1, 3).unwrap();
        assert_eq!(selected, &paths[0..3]);

        let single = select_range(&paths, 5, 5).unwrap();
        assert_eq!(single, &paths[4..5]);
    }

    #[test]
    fn test_select_range_invalid() {
        let paths = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
        assert!(matches!(
            select_range(&paths, 0, 2),
            Err(IoError::InvalidRange { first: 0, .. })
        ));
        assert!(matches!(
            select_range(&paths, 3, 10),
            Err(IoError::InvalidRange { count: 2, .. })
        ));
        assert!(select_range(&paths, 2, 1).is_err());
    }

    #[test]
    fn test_find_images_filters_and_sorts() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let nested = tmp_dir.path().join("nested");
        std::fs::create_dir(&nested)?;

        touch(tmp_dir.path(), "c.jpg")?;
        touch(tmp_dir.path(), "a.jpg")?;
        touch(tmp_dir.path(), "b.JPG")?;
        touch(tmp_dir.path(), "d.png")?;
        touch(tmp_dir.path(), "e.jpg.bak")?;
        touch(&nested, "b.jpg")?;

        let found = find_images(tmp_dir.path(), "jpg")?;
        let names = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();

        // sorted by file name, so the nested file sits between a and c
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(found[1], nested.join("b.jpg"));
        Ok(())
    }

    #[test]
    fn test_manifest_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = vec![
            touch(tmp_dir.path(), "0001.png")?,
            touch(tmp_dir.path(), "0002.png")?,
        ];
        let manifest = tmp_dir.path().join(MANIFEST_FILE_NAME);

        write_manifest(&manifest, &paths)?;
        assert_eq!(std::fs::read_to_string(&manifest)?, "0001.png\n0002.png\n");

        let read_back = read_manifest(&manifest)?;
        assert_eq!(read_back, paths);
        Ok(())
    }

    #[test]
    fn test_read_manifest_missing() {
        let res = read_manifest("/definitely/missing/image_paths_file.txt");
        assert!(matches!(res, Err(IoError::ManifestUnreadable(..))));
    }

    #[test]
    fn test_build_image_set() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        for name in ["03.png", "01.png", "02.png", "04.png", "notes.txt"] {
            touch(tmp_dir.path(), name)?;
        }

        let image_set = ImageSet::build(tmp_dir.path(), "png", 2, 10)?;
        assert_eq!(image_set.len(), 3);
        assert!(image_set.paths().iter().all(|p| p.is_absolute()));

        let names = image_set
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["02.png", "03.png", "04.png"]);

        // the manifest is left behind
        assert!(image_set.manifest_path().exists());
        assert_eq!(
            std::fs::read_to_string(image_set.manifest_path())?,
            "02.png\n03.png\n04.png\n"
        );
        Ok(())
    }

    #[test]
    fn test_build_image_set_no_images() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        touch(tmp_dir.path(), "01.png")?;

        let res = ImageSet::build(tmp_dir.path(), "jpg", 1, 1);
        assert!(matches!(res, Err(IoError::NoImagesFound(..))));
        Ok(())
    }
}
