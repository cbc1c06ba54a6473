use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use super::{CameraModelId, ColmapCamera, ColmapImage, ColmapPoint3d};

/// Error types for the COLMAP module.
#[derive(Debug, thiserror::Error)]
pub enum ColmapError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),
}

/// Read the lines of a COLMAP text file, skipping the leading comment block.
fn read_data_lines(path: impl AsRef<Path>) -> Result<Vec<String>, ColmapError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let lines = reader
        .lines()
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .skip_while(|line| line.starts_with('#'))
        .collect();

    Ok(lines)
}

/// Read the cameras.txt file and return a vector of ColmapCamera structs.
///
/// # Arguments
///
/// * `path` - The path to the cameras.txt file.
///
/// # Returns
///
/// A vector of ColmapCamera structs.
pub fn read_cameras_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapCamera>, ColmapError> {
    read_data_lines(path)?
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_camera_line(line))
        .collect()
}

/// Read the points3D.txt file and return a vector of ColmapPoint3d structs.
///
/// # Arguments
///
/// * `path` - The path to the points3D.txt file.
///
/// # Returns
///
/// A vector of ColmapPoint3d structs.
pub fn read_points3d_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapPoint3d>, ColmapError> {
    read_data_lines(path)?
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_point3d_line(line))
        .collect()
}

/// Read the images.txt file and return a vector of ColmapImage structs.
///
/// Every image takes two lines; the second one lists the 2D observations and may be empty.
///
/// # Arguments
///
/// * `path` - The path to the images.txt file.
///
/// # Returns
///
/// A vector of ColmapImage structs.
pub fn read_images_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapImage>, ColmapError> {
    let lines = read_data_lines(path)?;

    // drop trailing blank lines so that an odd line count is a real error
    let num_lines = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |last| last + 1);
    // the observations line of the last image may have been a dropped blank line
    let num_lines = num_lines + num_lines % 2;

    (0..num_lines)
        .step_by(2)
        .map(|i| {
            let line1 = &lines[i];
            let line2 = lines.get(i + 1).map_or("", String::as_str);
            parse_image_line(line1, line2)
        })
        .collect()
}

/// Utility functions for parsing COLMAP text files
fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, ColmapError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| ColmapError::ParseError(format!("{}: {}", s, e)))
}

fn parse_array<T, const N: usize>(parts: &[&str], what: &str) -> Result<[T; N], ColmapError>
where
    T: std::str::FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    parts
        .iter()
        .map(|s| parse_part(s))
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| ColmapError::ParseError(format!("Invalid number of {what}")))
}

/// Parse a camera line and return a ColmapCamera struct.
/// NOTE: The number of parameters depends on the camera model.
///       CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[0], PARAMS[1], ...
fn parse_camera_line(line: &str) -> Result<ColmapCamera, ColmapError> {
    // split the line into parts by whitespace
    let parts = line.split_whitespace().collect::<Vec<_>>();

    if parts.len() < 5 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts.len()
        )));
    }

    Ok(ColmapCamera {
        camera_id: parse_part(parts[0])?,
        model_id: parse_camera_model_id(parts[1])?,
        width: parse_part(parts[2])?,
        height: parse_part(parts[3])?,
        params: parts[4..]
            .iter()
            .map(|s| parse_part(s))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn parse_camera_model_id(model_id: &str) -> Result<CameraModelId, ColmapError> {
    match model_id {
        "SIMPLE_PINHOLE" => Ok(CameraModelId::CameraModelSimplePinhole),
        "PINHOLE" => Ok(CameraModelId::CameraModelPinhole),
        "SIMPLE_RADIAL" => Ok(CameraModelId::CameraModelSimplifiedRadial),
        "RADIAL" => Ok(CameraModelId::CameraModelRadial),
        "OPENCV" => Ok(CameraModelId::CameraModelOpenCV),
        "OPENCV_FISHEYE" => Ok(CameraModelId::CameraModelOpenCVFisheye),
        "FULL_OPENCV" => Ok(CameraModelId::CameraModelFullOpenCV),
        "FOV" => Ok(CameraModelId::CameraModelFOV),
        "SIMPLE_RADIAL_FISHEYE" => Ok(CameraModelId::CameraModelSimpleRadialFisheye),
        "RADIAL_FISHEYE" => Ok(CameraModelId::CameraModelRadialFisheye),
        "THIN_PRISM_FISHEYE" => Ok(CameraModelId::CameraModelThinPrismFisheye),
        _ => Err(ColmapError::ParseError(format!(
            "Invalid camera model id: {}",
            model_id
        ))),
    }
}

/// Parse a point3d line and return a ColmapPoint3d struct.
///       POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[0], TRACK[1], ...
fn parse_point3d_line(line: &str) -> Result<ColmapPoint3d, ColmapError> {
    // split the line into parts by whitespace
    let parts = line.split_whitespace().collect::<Vec<_>>();

    // check if the number of parts is correct
    if parts.len() < 8 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts.len()
        )));
    }

    Ok(ColmapPoint3d {
        point3d_id: parse_part(parts[0])?,
        xyz: parse_array(&parts[1..4], "xyz coordinates")?,
        rgb: parse_array(&parts[4..7], "rgb coordinates")?,
        error: parse_part(parts[7])?,
        track: parts[8..]
            .chunks_exact(2)
            .map(|chunk| -> Result<(u32, u32), ColmapError> {
                Ok((parse_part(chunk[0])?, parse_part(chunk[1])?))
            })
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// Parse an image line and return a ColmapImage struct.
/// #   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME
/// #   POINTS2D[] as (X, Y, POINT3D_ID)
fn parse_image_line(line1: &str, line2: &str) -> Result<ColmapImage, ColmapError> {
    // split the line into parts by whitespace
    let parts1 = line1.split_whitespace().collect::<Vec<_>>();
    let parts2 = line2.split_whitespace().collect::<Vec<_>>();

    if parts1.len() < 10 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts1.len()
        )));
    }

    Ok(ColmapImage {
        image_id: parse_part(parts1[0])?,
        rotation: parse_array(&parts1[1..5], "rotation coordinates")?,
        translation: parse_array(&parts1[5..8], "translation coordinates")?,
        camera_id: parse_part(parts1[8])?,
        // image names may contain spaces
        name: parts1[9..].join(" "),
        points2d: parts2
            .chunks_exact(3)
            .map(|chunk| -> Result<(f64, f64, i64), ColmapError> {
                Ok((
                    parse_part(chunk[0])?,
                    parse_part(chunk[1])?,
                    parse_part(chunk[2])?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CAMERAS_TXT: &str = "# Camera list with one line of data per camera:
#   CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[]
# Number of cameras: 1
1 PINHOLE 640 480 500.5 501.5 320 240
";

    const IMAGES_TXT: &str = "# Image list with two lines of data per image:
#   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME
#   POINTS2D[] as (X, Y, POINT3D_ID)
# Number of images: 2, mean observations per image: 1
1 1 0 0 0 0.5 0 0 1 0001.png
10.5 20.5 7
2 0.7071067811865476 0 0 0.7071067811865476 0 0 1 1 frames/0002.png

";

    const POINTS3D_TXT: &str = "# 3D point list with one line of data per point:
#   POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[] as (IMAGE_ID, POINT2D_IDX)
# Number of points: 2, mean track length: 1
7 0.1 0.2 3.5 255 128 0 0.25 1 0
8 -1 2 4 1 2 3 0.5
";

    fn write_tmp(dir: &Path, name: &str, content: &str) -> std::io::Result<std::path::PathBuf> {
        let path = dir.join(name);
        File::create(&path)?.write_all(content.as_bytes())?;
        Ok(path)
    }

    #[test]
    fn test_read_cameras_txt() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = write_tmp(tmp_dir.path(), "cameras.txt", CAMERAS_TXT)?;

        let cameras = read_cameras_txt(path)?;
        assert_eq!(cameras.len(), 1);
        assert_eq!(cameras[0].camera_id, 1);
        assert_eq!(cameras[0].model_id, CameraModelId::CameraModelPinhole);
        assert_eq!(cameras[0].width, 640);
        assert_eq!(cameras[0].height, 480);
        assert_eq!(cameras[0].params, vec![500.5, 501.5, 320.0, 240.0]);
        Ok(())
    }

    #[test]
    fn test_read_images_txt() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = write_tmp(tmp_dir.path(), "images.txt", IMAGES_TXT)?;

        let images = read_images_txt(path)?;
        assert_eq!(images.len(), 2);

        assert_eq!(images[0].image_id, 1);
        assert_eq!(images[0].name, "0001.png");
        assert_eq!(images[0].rotation, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(images[0].translation, [0.5, 0.0, 0.0]);
        assert_eq!(images[0].points2d, vec![(10.5, 20.5, 7)]);

        assert_eq!(images[1].name, "frames/0002.png");
        assert_eq!(images[1].translation, [0.0, 0.0, 1.0]);
        assert!(images[1].points2d.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_images_txt_without_trailing_observations() -> Result<(), Box<dyn std::error::Error>>
    {
        let tmp_dir = tempfile::tempdir()?;
        let path = write_tmp(
            tmp_dir.path(),
            "images.txt",
            "# header\n1 1 0 0 0 0 0 0 1 a.png\n",
        )?;

        let images = read_images_txt(path)?;
        assert_eq!(images.len(), 1);
        assert!(images[0].points2d.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_points3d_txt() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = write_tmp(tmp_dir.path(), "points3D.txt", POINTS3D_TXT)?;

        let points = read_points3d_txt(path)?;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].point3d_id, 7);
        assert_eq!(points[0].xyz, [0.1, 0.2, 3.5]);
        assert_eq!(points[0].rgb, [255, 128, 0]);
        assert_eq!(points[0].track, vec![(1, 0)]);
        assert_eq!(points[1].xyz, [-1.0, 2.0, 4.0]);
        assert!(points[1].track.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_camera_line("1 PINHOLE 640").is_err());
        assert!(parse_camera_line("1 UNKNOWN_MODEL 640 480 1 2 3").is_err());
        assert!(parse_point3d_line("1 a b c 1 2 3 0.1").is_err());
        assert!(parse_image_line("1 1 0 0 0", "").is_err());
    }
}
