use crate::domain::model::{IdentifierSet, Organism};
use crate::utils::error::Result;
use std::path::Path;

/// Organism name for an identifier file: its file stem.
pub fn organism_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read one organism's identifier file (one identifier per line).
pub async fn load_organism(path: impl AsRef<Path>) -> Result<Organism> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await?;
    let identifiers = IdentifierSet::from_lines(&content);
    let name = organism_name(path);

    tracing::debug!("Loaded {} identifiers for {}", identifiers.len(), name);
    Ok(Organism { name, identifiers })
}

pub async fn load_organisms(paths: &[String]) -> Result<Vec<Organism>> {
    let mut organisms: Vec<Organism> = Vec::with_capacity(paths.len());
    for path in paths {
        let organism = load_organism(path).await?;
        if organisms.iter().any(|o| o.name == organism.name) {
            tracing::warn!(
                "Organism name '{}' from {} is already loaded; results will share one row",
                organism.name,
                path
            );
        }
        if organism.identifiers.is_empty() {
            tracing::warn!("Identifier file {} is empty", path);
        }
        organisms.push(organism);
    }
    Ok(organisms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_organism_name_is_file_stem() {
        assert_eq!(organism_name(&PathBuf::from("genomes/ecoli_k12.txt")), "ecoli_k12");
        assert_eq!(organism_name(&PathBuf::from("bsub")), "bsub");
    }

    #[tokio::test]
    async fn test_load_organism_deduplicates_and_trims() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ecoli.txt");
        std::fs::write(&path, "K00001\n K00002 \n\nK00001\n").unwrap();

        let organism = load_organism(&path).await.unwrap();
        assert_eq!(organism.name, "ecoli");
        assert_eq!(organism.identifiers.len(), 2);
        assert!(organism.identifiers.contains("K00002"));
    }

    #[tokio::test]
    async fn test_load_organism_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(load_organism(dir.path().join("absent.txt")).await.is_err());
    }
}
