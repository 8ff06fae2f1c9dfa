use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::info;
use serde_json::{Map, Value};

/// Slugs already pushed to one platform, mapped to the id the platform gave
/// back. Backed by a single JSON object on disk.
#[derive(Debug)]
pub(crate) struct Ledger {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl Ledger {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.to_owned(),
            entries: read_entries(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    pub fn get(&self, slug: &str) -> Option<&Value> {
        self.entries.get(slug)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Re-reads the file, adds `slug` and writes the whole map back.
    pub fn record(&mut self, slug: &str, id: Value) -> anyhow::Result<()> {
        let mut entries = read_entries(&self.path)?;
        entries.insert(slug.to_string(), id);
        write_entries(&self.path, &entries)?;
        self.entries = entries;
        Ok(())
    }
}

fn read_entries(path: &Path) -> anyhow::Result<Map<String, Value>> {
    if path.exists() {
        let fd = File::open(path).with_context(|| format!("while opening ledger {path:?}"))?;
        let reader = BufReader::new(fd);
        serde_json::from_reader(reader).with_context(|| format!("while reading ledger {path:?}"))
    } else {
        info!("Ledger file({path:?}) does not exist. starting empty...");
        Ok(Map::new())
    }
}

// written beside the target and renamed over it
fn write_entries(path: &Path, entries: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs_extra::dir::create_all(dir, false)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let fd = File::create(&tmp)?;
    let mut writer = BufWriter::new(fd);
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    std::fs::rename(&tmp, path).with_context(|| format!("while replacing ledger {path:?}"))?;
    Ok(())
}
