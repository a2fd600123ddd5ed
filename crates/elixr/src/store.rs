//! File-based recipe storage.
//!
//! Recipes are stored one per file in the user's data directory:
//!
//! ```text
//! ElixrRecipes/
//!   flavor_weights.json
//!   Apple Pie.json
//!   Custard.json
//! ```
//!
//! The flavor weight table shares the directory but is never listed as a
//! recipe.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::config::FLAVOR_WEIGHTS_FILE_NAME;
use crate::error::{Error, Result};
use crate::recipe::Recipe;

/// File extension of recipe files.
const RECIPE_EXTENSION: &str = "json";

/// Recipe store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct RecipeStore {
    /// Directory holding the recipe files.
    dir: PathBuf,
    /// File name of the flavor weight table, excluded from listings.
    flavor_weights_file: String,
}

/// A stored recipe's name and when it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeEntry {
    /// Recipe name (file name without extension).
    pub name: String,
    /// Last modification time, when the platform reports one.
    pub modified: Option<DateTime<Local>>,
}

impl RecipeStore {
    /// Open the store at `dir`, creating the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_flavor_file(dir, FLAVOR_WEIGHTS_FILE_NAME)
    }

    /// Open the store with a custom flavor weight file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_with_flavor_file(dir: impl AsRef<Path>, flavor_weights_file: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
            info!("Created recipe directory at {}", dir.display());
        }

        debug!("Opened recipe store at {}", dir.display());
        Ok(Self {
            dir,
            flavor_weights_file: flavor_weights_file.to_string(),
        })
    }

    /// Directory holding the recipes.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the flavor weight table inside the store directory.
    #[must_use]
    pub fn flavor_weights_path(&self) -> PathBuf {
        self.dir.join(&self.flavor_weights_file)
    }

    /// Save a recipe, replacing any recipe with the same name.
    ///
    /// Returns the normalized name the recipe was saved under.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the file cannot be written.
    pub fn save(&self, name: &str, recipe: &Recipe) -> Result<String> {
        let name = self.validate_name(name)?;
        let path = self.recipe_path(&name);

        let json = serde_json::to_string_pretty(recipe)?;
        std::fs::write(&path, json)?;

        info!("Saved recipe '{}' to {}", name, path.display());
        Ok(name)
    }

    /// Load a recipe by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecipeNotFound`] if no such recipe exists, or
    /// [`Error::RecipeRead`] if the file is not a valid recipe.
    pub fn load(&self, name: &str) -> Result<Recipe> {
        let name = self.validate_name(name)?;
        let path = self.recipe_path(&name);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::recipe_not_found(name));
            }
            Err(e) => return Err(e.into()),
        };

        let recipe = serde_json::from_str(&content)
            .map_err(|source| Error::RecipeRead { path, source })?;
        debug!("Loaded recipe '{}'", name);
        Ok(recipe)
    }

    /// Delete a recipe by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecipeNotFound`] if no such recipe exists.
    pub fn delete(&self, name: &str) -> Result<()> {
        let name = self.validate_name(name)?;
        let path = self.recipe_path(&name);

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted recipe '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::recipe_not_found(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a recipe exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.validate_name(name)
            .map(|name| self.recipe_path(&name).is_file())
            .unwrap_or(false)
    }

    /// Names of all stored recipes, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|e| e.name).collect())
    }

    /// All stored recipes with their modification times, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn entries(&self) -> Result<Vec<RecipeEntry>> {
        let mut entries = Vec::new();

        for dir_entry in std::fs::read_dir(&self.dir)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if !self.is_recipe_file(&path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let modified = dir_entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(|t: SystemTime| DateTime::<Local>::from(t));

            entries.push(RecipeEntry {
                name: name.to_string(),
                modified,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Found {} recipes", entries.len());
        Ok(entries)
    }

    /// Copy recipe files from `src` that are not yet in the store.
    ///
    /// Existing recipes are never overwritten. A missing source directory is
    /// not an error. Returns the number of recipes copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory exists but cannot be read, or
    /// a file cannot be copied.
    pub fn seed_from(&self, src: impl AsRef<Path>) -> Result<usize> {
        let src = src.as_ref();
        if !src.is_dir() {
            info!("No pre-saved recipes at {}, skipping", src.display());
            return Ok(0);
        }

        let mut copied = 0;
        for dir_entry in std::fs::read_dir(src)? {
            let path = dir_entry?.path();
            if !self.is_recipe_file(&path) {
                continue;
            }
            let Some(file_name) = path.file_name() else {
                continue;
            };

            let dest = self.dir.join(file_name);
            if dest.exists() {
                debug!("Keeping existing {}", dest.display());
                continue;
            }

            std::fs::copy(&path, &dest)?;
            debug!("Copied {} to {}", path.display(), dest.display());
            copied += 1;
        }

        info!("Copied {} pre-saved recipes from {}", copied, src.display());
        Ok(copied)
    }

    fn recipe_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{RECIPE_EXTENSION}"))
    }

    fn is_recipe_file(&self, path: &Path) -> bool {
        path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(RECIPE_EXTENSION)
            && path.file_name().and_then(|n| n.to_str()) != Some(self.flavor_weights_file.as_str())
    }

    /// Trim a recipe name and make sure it maps to a single file in the store.
    fn validate_name(&self, name: &str) -> Result<String> {
        let name = name.trim();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name.contains(['/', '\\']) {
            Some("must not contain a path separator")
        } else if name.starts_with('.') {
            Some("must not start with '.'")
        } else if self.recipe_path(name).file_name().and_then(|n| n.to_str())
            == Some(self.flavor_weights_file.as_str())
        {
            Some("is reserved for the flavor weight table")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidRecipeName {
                name: name.to_string(),
                reason,
            }),
            None => Ok(name.to_string()),
        }
    }
}
