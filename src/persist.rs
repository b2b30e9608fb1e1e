//! Model persistence
//!
//! Models are written with `bincode`. The destination directory must already
//! exist and any previous file at the path is overwritten.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Serialize a trained model to `path`
pub fn save_model<M: Serialize, P: AsRef<Path>>(model: &M, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving model to {}", path.display());

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, model)?;
    writer.flush()?;
    Ok(())
}

/// Load a model written by [`save_model`]
pub fn load_model<M: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<M> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let model = bincode::deserialize_from(reader)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{DecisionTree, Regressor, TreeConfig};
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_tree() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![10.0, 10.0, 20.0, 20.0];
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(x.view(), y.view()).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.pkl");
        save_model(&tree, &path).unwrap();

        let loaded: DecisionTree = load_model(&path).unwrap();
        assert_eq!(loaded.nodes(), tree.nodes());
        assert_eq!(
            loaded.predict(x.view()).unwrap(),
            tree.predict(x.view()).unwrap()
        );
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        std::fs::write(&path, vec![0xABu8; 4096]).unwrap();

        save_model(&vec![1.5f64, 2.5], &path).unwrap();

        let loaded: Vec<f64> = load_model(&path).unwrap();
        assert_eq!(loaded, vec![1.5, 2.5]);
        assert!(std::fs::metadata(&path).unwrap().len() < 4096);
    }

    #[test]
    fn test_save_requires_existing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("model.pkl");

        let err = save_model(&1u32, &path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!path.parent().unwrap().exists());
    }
}
