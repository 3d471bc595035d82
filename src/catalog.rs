//! Asset catalog
//!
//! Structured metadata sidecar for the converted assets, written once per
//! batch as a single pretty-printed JSON object keyed by output-relative
//! path. An existing catalog is loaded and merged over, so repeated partial
//! runs accumulate instead of clobbering each other.

use std::{collections::BTreeMap, fs::File, io, path::Path};

use serde::Serialize;

use crate::formats::{animation::Animation, tilemap, tilemap::TileMap};

#[derive(Serialize, Debug, Clone)]
pub struct AnimationEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u32,
    pub frame_count: u16,
    pub loop_count: u16,
    pub width: u16,
    pub height: u16,
    pub offset_x: u16,
    pub offset_y: u16,
    /// Per-frame delay hints, in frame order.
    pub speeds: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_offsets: Option<Vec<(u16, u16)>>,
}

impl From<&Animation> for AnimationEntry {
    fn from(anim: &Animation) -> Self {
        AnimationEntry {
            kind: anim.kind.clone(),
            id: anim.id,
            frame_count: anim.frame_count,
            loop_count: anim.loop_count,
            width: anim.width,
            height: anim.height,
            offset_x: anim.offset_x,
            offset_y: anim.offset_y,
            speeds: anim.frames.iter().map(|frame| frame.speed).collect(),
            frame_offsets: anim.frame_offsets.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct TileMapEntry {
    pub width: u16,
    pub height: u16,
    /// Run-encoded cells (`v + 1000 * count` tokens).
    pub data: Vec<u32>,
}

impl TileMapEntry {
    pub fn from_map(map: &TileMap) -> Result<Self, io::Error> {
        let data = map.to_runs()?;
        debug_assert_eq!(tilemap::expand_runs(&data), map.cells);
        Ok(TileMapEntry {
            width: map.width,
            height: map.height,
            data,
        })
    }
}

/// The on-disk catalog: one JSON object, entries keyed by relative path.
pub struct AssetCatalog {
    entries: BTreeMap<String, serde_json::Value>,
}

impl AssetCatalog {
    /// Load an existing catalog, or start empty when the file is missing.
    /// An unreadable catalog is an error rather than a silent reset.
    pub fn load_or_default(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            return Ok(AssetCatalog {
                entries: BTreeMap::new(),
            });
        }

        let file = File::open(path)?;
        let entries = serde_json::from_reader(file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(AssetCatalog { entries })
    }

    pub fn insert<T: Serialize>(&mut self, key: String, entry: &T) -> io::Result<()> {
        let value = serde_json::to_value(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> TileMap {
        TileMap {
            width: 2,
            height: 2,
            cells: vec![1, 1, 0, 3],
        }
    }

    #[test]
    fn tile_map_entries_store_run_tokens() {
        let entry = TileMapEntry::from_map(&sample_map()).unwrap();
        assert_eq!(entry.data, vec![2001, 0, 3]);
    }

    #[test]
    fn inserted_entries_serialize_under_their_key() {
        let mut catalog = AssetCatalog {
            entries: BTreeMap::new(),
        };
        let entry = TileMapEntry::from_map(&sample_map()).unwrap();
        catalog.insert("SCREEN/BKG".to_string(), &entry).unwrap();
        assert_eq!(catalog.len(), 1);

        let value = &catalog.entries["SCREEN/BKG"];
        assert_eq!(value["width"], 2);
        assert_eq!(value["data"], serde_json::json!([2001, 0, 3]));
    }

    #[test]
    fn absent_frame_offsets_are_omitted_from_json() {
        let entry = AnimationEntry {
            kind: "WALK".into(),
            id: 1,
            frame_count: 1,
            loop_count: 0,
            width: 4,
            height: 4,
            offset_x: 0,
            offset_y: 0,
            speeds: vec![100],
            frame_offsets: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("frame_offsets").is_none());
        assert_eq!(value["type"], "WALK");
    }
}
