use crate::utils::{write_file_atomic, BOUQUET_FILE_PREFIX, CONSTANTS};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

const INDEX_HEADER: &str = "#NAME User - bouquets (TV)";

pub fn index_reference_line(filename: &str) -> String {
    format!("#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET \"{filename}\" ORDER BY bouquet")
}

fn referenced_file(line: &str) -> Option<&str> {
    CONSTANTS.re_bouquet_reference.captures(line)
        .and_then(|caps| caps.name("file"))
        .map(|m| m.as_str())
}

fn is_own_reference(file: &str) -> bool {
    file.to_lowercase().starts_with(BOUQUET_FILE_PREFIX)
}

/// The host's master bouquet list. Only reference lines pointing to our own
/// `userbouquet.vavoo.*` files are ever added, pruned or removed.
#[derive(Debug, Clone)]
pub struct BouquetIndex {
    path: PathBuf,
    bouquet_dir: PathBuf,
}

impl BouquetIndex {
    pub fn new(path: PathBuf, bouquet_dir: PathBuf) -> Self {
        Self { path, bouquet_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_lines(&self) -> std::io::Result<Option<Vec<String>>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content.lines().map(|l| l.trim_end_matches('\r').to_string()).collect())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write_lines(&self, lines: &[String]) -> std::io::Result<()> {
        let mut content = lines.join("\n");
        content.push('\n');
        write_file_atomic(&self.path, content.as_bytes())
    }

    /// Filenames referenced by the index, in index order.
    pub fn references(&self) -> std::io::Result<Vec<String>> {
        Ok(self.read_lines()?
            .unwrap_or_default()
            .iter()
            .filter_map(|line| referenced_file(line).map(ToString::to_string))
            .collect())
    }

    fn is_dangling(&self, line: &str) -> bool {
        referenced_file(line)
            .is_some_and(|file| is_own_reference(file) && !self.bouquet_dir.join(file).exists())
    }

    /// Appends a reference line for each file unless an identical line exists.
    /// Own references whose file is gone are pruned in the same rewrite.
    /// Returns the number of added lines.
    pub fn add_references(&self, filenames: &[String]) -> std::io::Result<usize> {
        let (mut lines, mut changed) = match self.read_lines()? {
            Some(lines) => (lines, false),
            None => (vec![INDEX_HEADER.to_string()], true),
        };

        let before = lines.len();
        lines.retain(|line| !self.is_dangling(line));
        let pruned = before - lines.len();

        let mut added = 0;
        for filename in filenames {
            let reference = index_reference_line(filename);
            if !lines.iter().any(|line| line.trim() == reference) {
                lines.push(reference);
                added += 1;
            }
        }

        changed |= added > 0 || pruned > 0;
        if changed {
            self.write_lines(&lines)?;
            debug!("Updated bouquet index {}: {added} added, {pruned} pruned", self.path.display());
        }
        Ok(added)
    }

    /// Drops every line containing one of the patterns (case-insensitive) and
    /// dangling own references. The index is rewritten at most once.
    /// Returns the number of removed lines.
    pub fn remove_references(&self, patterns: &[String]) -> std::io::Result<usize> {
        let Some(mut lines) = self.read_lines()? else {
            info!("Bouquet index {} does not exist, nothing to remove", self.path.display());
            return Ok(0);
        };
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_lowercase()).collect();

        let before = lines.len();
        lines.retain(|line| {
            let lc_line = line.to_lowercase();
            !patterns.iter().any(|p| lc_line.contains(p.as_str())) && !self.is_dangling(line)
        });
        let removed = before - lines.len();
        if removed > 0 {
            self.write_lines(&lines)?;
            debug!("Removed {removed} lines from bouquet index {}", self.path.display());
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use crate::repository::bouquet_index::{index_reference_line, BouquetIndex};

    fn create_index(dir: &std::path::Path) -> BouquetIndex {
        BouquetIndex::new(dir.join("bouquets.tv"), dir.to_path_buf())
    }

    #[test]
    fn test_add_references_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("userbouquet.vavoo.uk.tv"), "#NAME UK\n").unwrap();
        let index = create_index(dir.path());
        let files = vec!["userbouquet.vavoo.uk.tv".to_string()];

        assert_eq!(index.add_references(&files).unwrap(), 1);
        assert_eq!(index.add_references(&files).unwrap(), 0);

        let content = fs::read_to_string(index.path()).unwrap();
        assert!(content.starts_with("#NAME User - bouquets (TV)\n"));
        assert_eq!(content.matches(&index_reference_line("userbouquet.vavoo.uk.tv")).count(), 1);
    }

    #[test]
    fn test_foreign_lines_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let foreign = index_reference_line("userbouquet.favourites.tv");
        fs::write(dir.path().join("bouquets.tv"), format!("#NAME Bouquets (TV)\n{foreign}\n")).unwrap();
        fs::write(dir.path().join("userbouquet.vavoo.italy.tv"), "#NAME Italy\n").unwrap();
        let index = create_index(dir.path());

        index.add_references(&["userbouquet.vavoo.italy.tv".to_string()]).unwrap();
        assert_eq!(index.references().unwrap(), vec!["userbouquet.favourites.tv", "userbouquet.vavoo.italy.tv"]);

        index.remove_references(&["USERBOUQUET.VAVOO.ITALY.TV".to_string()]).unwrap();
        assert_eq!(index.references().unwrap(), vec!["userbouquet.favourites.tv"]);
    }

    #[test]
    fn test_dangling_references_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let stale = index_reference_line("userbouquet.vavoo.gone.tv");
        fs::write(dir.path().join("bouquets.tv"), format!("#NAME Bouquets (TV)\n{stale}\n")).unwrap();
        fs::write(dir.path().join("userbouquet.vavoo.uk.tv"), "#NAME UK\n").unwrap();
        let index = create_index(dir.path());

        index.add_references(&["userbouquet.vavoo.uk.tv".to_string()]).unwrap();
        assert_eq!(index.references().unwrap(), vec!["userbouquet.vavoo.uk.tv"]);
    }

    #[test]
    fn test_remove_from_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = create_index(dir.path());
        assert_eq!(index.remove_references(&["userbouquet.vavoo.".to_string()]).unwrap(), 0);
        assert!(!index.path().exists());
    }
}
