use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};

/// Serializes `data` as pretty JSON, replacing whatever was at `path`.
/// The file is written next to the target and renamed so readers never see a half-written document.
pub fn save_to_file<T: Serialize>(path: &Path, data: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(data)?;
    let mut file = File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn load_from_json_file<T: DeserializeOwned>(path: &Path) -> std::io::Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let data = serde_json::from_reader(reader)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let data = HashMap::from([("Sol Ring".to_string(), 1)]);
        save_to_file(&path, &data).unwrap();
        let loaded: HashMap<String, i32> = load_from_json_file(&path).unwrap();

        assert_eq!(loaded, data);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: std::io::Result<Vec<String>> =
            load_from_json_file(&dir.path().join("missing.json"));

        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);
    }
}
