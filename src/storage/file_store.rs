use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::{BucketStore, Granularity, KeyValue};

/// Bitcode-on-disk store: one file per granularity plus one for user
/// settings, all under the platform data dir
/// (`~/.local/share/faretab/{day,month,year,user}.bin`).
///
/// Only keys with a value are stored; a missing key reads back as None.
/// Sections are loaded eagerly at open so reads need no mutation and can
/// run concurrently.
pub struct FileStore {
    dir: Option<PathBuf>,
    day: Section,
    month: Section,
    year: Section,
    user: Section,
}

#[derive(Default)]
struct Section {
    map: HashMap<String, String>,
    dirty: bool,
}

#[derive(Serialize, Deserialize, Default)]
struct SectionFile {
    entries: HashMap<String, String>,
}

fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "faretab").map(|d| d.data_dir().to_path_buf())
}

fn load_section(dir: &Option<PathBuf>, name: &str) -> Section {
    let Some(dir) = dir else {
        return Section::default();
    };
    let Ok(data) = fs::read(dir.join(format!("{name}.bin"))) else {
        return Section::default();
    };
    let file: SectionFile = bitcode::deserialize(&data).unwrap_or_default();
    Section {
        map: file.entries,
        dirty: false,
    }
}

impl FileStore {
    pub fn open() -> Self {
        Self::load(data_dir())
    }

    /// Open against an explicit directory instead of the platform data
    /// dir. Used by tests.
    pub fn at(dir: PathBuf) -> Self {
        Self::load(Some(dir))
    }

    fn load(dir: Option<PathBuf>) -> Self {
        Self {
            day: load_section(&dir, Granularity::Day.as_str()),
            month: load_section(&dir, Granularity::Month.as_str()),
            year: load_section(&dir, Granularity::Year.as_str()),
            user: load_section(&dir, "user"),
            dir,
        }
    }

    fn section(&self, granularity: Granularity) -> &Section {
        match granularity {
            Granularity::Day => &self.day,
            Granularity::Month => &self.month,
            Granularity::Year => &self.year,
        }
    }

    fn section_mut(&mut self, granularity: Granularity) -> &mut Section {
        match granularity {
            Granularity::Day => &mut self.day,
            Granularity::Month => &mut self.month,
            Granularity::Year => &mut self.year,
        }
    }
}

fn get_from(section: &Section, keys: &[String]) -> Vec<KeyValue> {
    keys.iter()
        .map(|key| KeyValue {
            key: key.clone(),
            value: section.map.get(key).cloned(),
        })
        .collect()
}

fn put_into(section: &mut Section, kvs: Vec<KeyValue>) {
    for kv in kvs {
        match kv.value {
            Some(value) => {
                section.map.insert(kv.key, value);
            }
            None => {
                section.map.remove(&kv.key);
            }
        }
    }
    section.dirty = true;
}

impl BucketStore for FileStore {
    fn get(&self, granularity: Granularity, keys: &[String]) -> Result<Vec<KeyValue>> {
        Ok(get_from(self.section(granularity), keys))
    }

    fn put(&mut self, granularity: Granularity, kvs: Vec<KeyValue>) -> Result<()> {
        put_into(self.section_mut(granularity), kvs);
        Ok(())
    }

    fn get_user(&self, keys: &[String]) -> Result<Vec<KeyValue>> {
        Ok(get_from(&self.user, keys))
    }

    fn put_user(&mut self, kvs: Vec<KeyValue>) -> Result<()> {
        put_into(&mut self.user, kvs);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let sections = [
            (Granularity::Day.as_str(), &self.day),
            (Granularity::Month.as_str(), &self.month),
            (Granularity::Year.as_str(), &self.year),
            ("user", &self.user),
        ];
        for (name, section) in sections {
            if !section.dirty {
                continue;
            }
            let file = SectionFile {
                entries: section.map.clone(),
            };
            let data =
                bitcode::serialize(&file).with_context(|| format!("serializing {name} section"))?;
            let path = dir.join(format!("{name}.bin"));
            fs::write(&path, data).with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(())
    }

    fn watch_path(&self) -> Option<PathBuf> {
        self.dir.clone()
    }
}
