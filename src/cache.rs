use crate::error::PipelineError;
use crate::results::CompiledContents;
use crate::utils::sanitize_company_name;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk store of compiled contents, one JSON file per company.
///
/// Later stages read it back instead of scraping again. Saving the same
/// company twice overwrites the earlier file.
#[derive(Debug, Clone)]
pub struct ContentsCache {
    dir: PathBuf,
}

impl ContentsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fails when the name has no characters that survive sanitization
    pub fn path_for(&self, company_name: &str) -> Result<PathBuf, PipelineError> {
        let stem = sanitize_company_name(company_name);
        if stem.is_empty() {
            return Err(PipelineError::InvalidCompanyName(company_name.to_string()));
        }
        Ok(self.dir.join(format!("{}_contents.json", stem)))
    }

    pub fn save(
        &self,
        contents: &CompiledContents,
        company_name: &str,
    ) -> Result<PathBuf, PipelineError> {
        let path = self.path_for(company_name)?;
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(contents)?;
        fs::write(&path, json)?;

        ::log::info!("Saved compiled contents to {}", path.display());
        Ok(path)
    }

    /// `Ok(None)` when nothing has been cached for this company
    pub fn load(&self, company_name: &str) -> Result<Option<CompiledContents>, PipelineError> {
        let path = self.path_for(company_name)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let contents = serde_json::from_str(&json)?;

        ::log::info!("Loaded compiled contents from {}", path.display());
        Ok(Some(contents))
    }
}
