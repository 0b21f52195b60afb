use std::fs::{self, File};
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use log::info;

use crate::error::{Result, SegmentationError};

pub const JPEG_WRITE_QUALITY: u8 = 90;

/// What to do with the recoloured image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Classify only, write nothing.
    #[default]
    Skip,
    /// Write `<stem>.segmented.<ext>` next to the input.
    NewFile,
    /// Replace the input file.
    Overwrite,
    /// Rename the input to `<stem>.original.<ext>`, then write in its place.
    OverwriteWithBackup,
}

impl WriteMode {
    /// Numeric codes as accepted on the command line.
    pub fn from_code(code: u8) -> Option<WriteMode> {
        match code {
            0 => Some(WriteMode::Skip),
            1 => Some(WriteMode::NewFile),
            2 => Some(WriteMode::Overwrite),
            3 => Some(WriteMode::OverwriteWithBackup),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Result<OutputFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(SegmentationError::UnsupportedFormat(ext.to_string())),
        }
    }
}

/// Where and how the output image will be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPlan {
    pub path: PathBuf,
    pub format: OutputFormat,
    /// Set when the input must be renamed before it is overwritten.
    pub backup: Option<PathBuf>,
}

/// Split a file name at its first `.`: `scene.tile.png` -> (`scene`, `tile.png`).
fn split_name(path: &Path) -> Option<(&str, &str)> {
    path.file_name()?.to_str()?.split_once('.')
}

fn sibling(input: &Path, name: String) -> PathBuf {
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Work out the output path for `mode`. The format is validated here, so an
/// unsupported extension is reported before anything is decoded or renamed.
pub fn plan_output(input: &Path, mode: WriteMode) -> Result<Option<OutputPlan>> {
    if mode == WriteMode::Skip {
        return Ok(None);
    }

    let (stem, ext) = split_name(input)
        .ok_or_else(|| SegmentationError::UnsupportedFormat(input.display().to_string()))?;
    let format = OutputFormat::from_extension(ext)?;

    let (path, backup) = if mode == WriteMode::NewFile {
        (sibling(input, format!("{stem}.segmented.{ext}")), None)
    } else if mode == WriteMode::OverwriteWithBackup {
        let backup = sibling(input, format!("{stem}.original.{ext}"));
        (input.to_path_buf(), Some(backup))
    } else {
        (input.to_path_buf(), None)
    };
    Ok(Some(OutputPlan {
        path,
        format,
        backup,
    }))
}

/// Encode an RGB buffer to `path`.
pub fn write_rgb(path: &Path, format: OutputFormat, width: u32, height: u32, buf: &[u8]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Png => {
            PngEncoder::new(writer).write_image(buf, width, height, ExtendedColorType::Rgb8)?
        }
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(writer, JPEG_WRITE_QUALITY)
            .write_image(buf, width, height, ExtendedColorType::Rgb8)?,
    }
    Ok(())
}

/// Carry out `plan`: move the original aside if asked to, then write the image.
pub fn write_planned(plan: &OutputPlan, img: &RgbImage) -> Result<()> {
    if let Some(backup) = &plan.backup {
        let original = &plan.path;
        fs::rename(original, backup)?;
        info!("backed up {} to {}", original.display(), backup.display());
    }
    let (w, h) = img.dimensions();
    write_rgb(&plan.path, plan.format, w, h, img.as_raw())?;
    info!("wrote segmented image {}", plan.path.display());
    Ok(())
}

/// PNG-encode an image in memory.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buf);
        img.write_to(&mut cursor, ImageFormat::Png)?;
    }
    Ok(buf)
}
