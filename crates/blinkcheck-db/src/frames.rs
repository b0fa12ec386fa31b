//! Frame-sequence loading.
//!
//! Video decoding happens upstream; each video reaches this pipeline as a
//! directory of per-frame image files. Files are ordered by name (frame
//! numbers are zero-padded by the extraction step) and decoded to 8-bit
//! grayscale.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "pgm", "bmp"];

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("failed to read frame directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no frame images found in {0}")]
    Empty(PathBuf),

    #[error("failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Load a video's frames as grayscale buffers, in filename order.
pub fn load_frame_sequence(dir: &Path) -> Result<Vec<Array2<u8>>, FrameError> {
    let read = std::fs::read_dir(dir).map_err(|source| FrameError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = read
        .filter_map(|item| item.ok().map(|i| i.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(FrameError::Empty(dir.to_path_buf()));
    }

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        let gray = image::open(&path)
            .map_err(|source| FrameError::Decode {
                path: path.clone(),
                source,
            })?
            .into_luma8();
        let (width, height) = gray.dimensions();
        let buffer = Array2::from_shape_vec((height as usize, width as usize), gray.into_raw())
            .expect("luma8 buffer length matches its dimensions");
        frames.push(buffer);
    }

    tracing::debug!(dir = %dir.display(), frames = frames.len(), "frame sequence loaded");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "blinkcheck-frames-test-{tag}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_gray_png(path: &Path, width: u32, height: u32, value: u8) {
        let img = image::GrayImage::from_pixel(width, height, image::Luma([value]));
        img.save(path).unwrap();
    }

    #[test]
    fn loads_frames_in_name_order() {
        let dir = scratch_dir("order");
        write_gray_png(&dir.join("000001.png"), 4, 3, 20);
        write_gray_png(&dir.join("000000.png"), 4, 3, 10);
        write_gray_png(&dir.join("000002.png"), 4, 3, 30);

        let frames = load_frame_sequence(&dir).unwrap();
        assert_eq!(frames.len(), 3);
        // Row-major (height, width) layout.
        assert_eq!(frames[0].dim(), (3, 4));
        assert_eq!(frames[0][[0, 0]], 10);
        assert_eq!(frames[1][[0, 0]], 20);
        assert_eq!(frames[2][[0, 0]], 30);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn ignores_non_image_files() {
        let dir = scratch_dir("mixed");
        write_gray_png(&dir.join("000000.png"), 2, 2, 5);
        fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let frames = load_frame_sequence(&dir).unwrap();
        assert_eq!(frames.len(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = scratch_dir("empty");
        assert!(matches!(
            load_frame_sequence(&dir).unwrap_err(),
            FrameError::Empty(_)
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("blinkcheck-frames-test-absent");
        assert!(matches!(
            load_frame_sequence(&dir).unwrap_err(),
            FrameError::ReadDir { .. }
        ));
    }
}
