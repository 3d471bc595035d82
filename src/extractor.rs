//! Asset extraction pipeline
//!
//! Walks a game data directory, dispatches each file on its extension and
//! converts it: IM7 stills become PNGs, HI7 animations become looping GIFs
//! plus a catalog entry, ARS/PTS maps become catalog entries in run-encoded
//! form. A failed file is reported and skipped; the batch carries on and the
//! catalog is persisted once, after every decode has finished.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, RgbaImage,
};

use crate::{
    catalog::{AnimationEntry, AssetCatalog, TileMapEntry},
    formats::{animation, image as im7, tilemap},
    graphics::RasterImage,
};

const CATALOG_FILE: &str = "catalog.json";

pub struct ExtractionSummary {
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct AssetExtractor {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl AssetExtractor {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        AssetExtractor {
            input_dir,
            output_dir,
        }
    }

    pub fn run(&self) -> io::Result<ExtractionSummary> {
        let mut files = Vec::new();
        collect_files(&self.input_dir, &mut files)?;
        files.sort();
        println!("Found {} file(s) under {}", files.len(), self.input_dir.display());

        let catalog_path = self.output_dir.join(CATALOG_FILE);
        let mut catalog = AssetCatalog::load_or_default(&catalog_path)?;

        let mut summary = ExtractionSummary {
            converted: 0,
            failed: 0,
            skipped: 0,
        };

        for path in &files {
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_uppercase())
                .unwrap_or_default();

            let result = match extension.as_str() {
                "IM7" => self.process_image(path),
                "HI7" => self.process_animation(path, &mut catalog),
                "ARS" | "PTS" => self.process_map(path, &extension, &mut catalog),
                _ => {
                    summary.skipped += 1;
                    continue;
                }
            };

            match result {
                Ok(()) => summary.converted += 1,
                Err(e) => {
                    eprintln!("Failed to convert {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        // Persist only after the whole batch so a mid-run failure never
        // leaves a partially rewritten catalog behind.
        catalog.save(&catalog_path)?;
        println!("Catalog written to {} ({} entries)", catalog_path.display(), catalog.len());

        Ok(summary)
    }

    fn process_image(&self, path: &Path) -> io::Result<()> {
        let data = fs::read(path)?;
        let raster = im7::decode(&data)?;

        let output_path = self.output_path(path, "png")?;
        save_png(&raster, &output_path)?;
        println!(
            "{} -> {} ({}x{})",
            path.display(),
            output_path.display(),
            raster.width,
            raster.height
        );
        Ok(())
    }

    fn process_animation(&self, path: &Path, catalog: &mut AssetCatalog) -> io::Result<()> {
        let data = fs::read(path)?;
        let anim = animation::decode(&data)?;

        let output_path = self.output_path(path, "gif")?;
        save_gif(&anim, &output_path)?;

        let key = self.catalog_key(&output_path);
        catalog.insert(key, &AnimationEntry::from(&anim))?;

        println!(
            "{} -> {} ({} frame(s), {}x{}, loop {})",
            path.display(),
            output_path.display(),
            anim.frame_count,
            anim.width,
            anim.height,
            if anim.loops_forever() {
                "forever".to_string()
            } else {
                anim.loop_count.to_string()
            }
        );
        Ok(())
    }

    fn process_map(
        &self,
        path: &Path,
        extension: &str,
        catalog: &mut AssetCatalog,
    ) -> io::Result<()> {
        let data = fs::read(path)?;
        let map = tilemap::decode(&data)?;

        // Maps produce no raster file; the key mirrors where one would go,
        // with path maps suffixed so a screen's area and path grids coexist.
        let output_path = self.output_path(path, "")?;
        let mut key = self.catalog_key(&output_path);
        if extension == "PTS" {
            key.push_str("_PATH");
        }

        catalog.insert(key, &TileMapEntry::from_map(&map)?)?;
        println!("{} -> catalog ({}x{})", path.display(), map.width, map.height);
        Ok(())
    }

    /// Derive the output path for a source file, mirroring the input tree
    /// under the output directory, and make sure its parent exists.
    fn output_path(&self, path: &Path, extension: &str) -> io::Result<PathBuf> {
        let relative = path.strip_prefix(&self.input_dir).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is outside the input directory", path.display()),
            )
        })?;

        let mut output_path = self.output_dir.join(relative);
        output_path.set_extension(extension);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(output_path)
    }

    /// Catalog key: the output path relative to the output directory, with
    /// forward slashes regardless of platform.
    fn catalog_key(&self, output_path: &Path) -> String {
        let relative = output_path.strip_prefix(&self.output_dir).unwrap_or(output_path);
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        parts.join("/")
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn save_png(raster: &RasterImage, path: &Path) -> io::Result<()> {
    let rgba = RgbaImage::from_raw(raster.width as u32, raster.height as u32, raster.to_rgba())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "raster buffer size mismatch"))?;

    let temp_path = path.with_extension("temp.png");
    rgba.save(&temp_path)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;
    options.interlace = None;

    match oxipng::optimize(
        &oxipng::InFile::Path(temp_path.clone()),
        &oxipng::OutFile::Path(Some(path.to_path_buf())),
        &options,
    ) {
        Ok(_) => {
            let _ = fs::remove_file(temp_path);
            Ok(())
        }
        Err(e) => {
            fs::rename(temp_path, path)?;
            eprintln!(
                "Warning: oxipng optimisation failed for {}: {}. File saved unoptimised.",
                path.display(),
                e
            );
            Ok(())
        }
    }
}

fn save_gif(anim: &animation::Animation, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut encoder = GifEncoder::new(file);

    let repeat = if anim.loops_forever() {
        Repeat::Infinite
    } else {
        Repeat::Finite(anim.loop_count)
    };
    encoder
        .set_repeat(repeat)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    for frame in &anim.frames {
        let rgba = RgbaImage::from_raw(
            frame.raster.width as u32,
            frame.raster.height as u32,
            frame.raster.to_rgba(),
        )
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "frame buffer size mismatch"))?;

        let delay = Delay::from_numer_denom_ms(frame.speed as u32, 1);
        encoder
            .encode_frame(Frame::from_parts(rgba, 0, 0, delay))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    }

    Ok(())
}
