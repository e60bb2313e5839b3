use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use glob::Pattern;
use tracing::{debug, error, info, warn};

use crate::category::category_of;
use crate::classify::{classify, Decision};
use crate::config::{AppConfig, ArchivePolicy, ErrorPolicy};
use crate::error::Error;
use crate::hasher::identify;
use crate::placer::{move_file, resolve_name};
use crate::progress::{ProgressReporter, SilentReporter};
use crate::registry::{FileRecord, Registry};
use crate::scanner::{self, walk, DiscoveredFile};

pub struct Organizer {
    config: AppConfig,
}

/// Terminal state of one discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Moved into its category folder. `dest == source` when it was already there.
    Placed { dest: PathBuf },
    /// Placed into its category folder under a `_N` name.
    Renamed { dest: PathBuf },
    /// Same size as an organized file but different content; moved to the archive.
    Archived { dest: PathBuf },
    /// Exact duplicate of the organized file `duplicate_of` and removed.
    Deleted { duplicate_of: String, size: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub category: String,
    pub action: Action,
}

#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub root: PathBuf,
    pub scan_duration: Duration,
    pub organize_duration: Duration,
    pub files_scanned: usize,
    pub files_seeded: usize,
    pub placed: usize,
    pub renamed: usize,
    pub archived: usize,
    pub deleted: usize,
    pub failed: usize,
    pub bytes_reclaimed: u64,
    pub outcomes: Vec<FileOutcome>,
}

impl OrganizeReport {
    fn record(&mut self, outcome: FileOutcome) {
        match &outcome.action {
            Action::Placed { .. } => self.placed += 1,
            Action::Renamed { .. } => self.renamed += 1,
            Action::Archived { .. } => self.archived += 1,
            Action::Deleted { size, .. } => {
                self.deleted += 1;
                self.bytes_reclaimed += size;
            }
            Action::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn outcome_for(&self, source: &Path) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.source == source)
    }
}

/// Organize `root` with the default configuration and no progress output.
pub fn organize(root: impl AsRef<Path>) -> Result<OrganizeReport, Error> {
    Organizer::new(AppConfig::default()).organize(root.as_ref(), &SilentReporter)
}

impl Organizer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Walk `root` once and sort every file into `root/<CATEGORY>/`:
    /// 1. Optionally seed the registry from existing category folders
    /// 2. Snapshot the tree (archive subtree and ignore patterns excluded)
    /// 3. Hash, classify and place each file in walk order
    pub fn organize(
        &self,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<OrganizeReport, Error> {
        self.config.validate()?;

        let root = fs::canonicalize(root).map_err(|_| Error::InvalidRoot(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(Error::InvalidRoot(root));
        }
        info!("Organizing files in: {}", root.display());

        let ignore_patterns = scanner::compile_patterns(&self.config.ignore_patterns);
        let mut registry = Registry::new();
        let mut report = OrganizeReport {
            root: root.clone(),
            ..OrganizeReport::default()
        };

        // Phase 1: Scan
        let scan_start = Instant::now();
        reporter.on_scan_start(&root.to_string_lossy());
        let seeded = if self.config.seed_existing {
            self.seed_registry(&root, &ignore_patterns, &mut registry)?
        } else {
            HashSet::new()
        };
        report.files_seeded = seeded.len();

        let archive_category = self.config.archive_dir.to_uppercase();
        let files: Vec<DiscoveredFile> =
            walk::collect_files(&root, &self.config.archive_dir, &ignore_patterns)?
                .into_iter()
                .filter(|file| !seeded.contains(&file.path))
                .filter(|file| {
                    let clashes = category_of(&file.name) == archive_category;
                    if clashes {
                        warn!(
                            "Skipping {}: its category would land in the archive folder",
                            file.path.display()
                        );
                    }
                    !clashes
                })
                .collect();
        report.scan_duration = scan_start.elapsed();
        report.files_scanned = files.len();
        reporter.on_scan_complete(files.len(), report.scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s: {} files, {} seeded from category folders",
            report.scan_duration.as_secs_f64(),
            files.len(),
            seeded.len(),
        );

        // Phase 2: Organize
        let organize_start = Instant::now();
        let mut adopted = HashSet::new();
        reporter.on_organize_start(files.len());
        for (index, file) in files.iter().enumerate() {
            let result = if adopted.contains(&file.path) {
                debug!("Already registered in place: {}", file.path.display());
                Ok(FileOutcome {
                    source: file.path.clone(),
                    category: category_of(&file.name),
                    action: Action::Placed {
                        dest: file.path.clone(),
                    },
                })
            } else {
                self.process_file(&root, &mut registry, &mut adopted, file)
            };
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(err) => match self.config.error_policy {
                    ErrorPolicy::FailFast => return Err(err),
                    ErrorPolicy::Continue => {
                        error!("Error organizing {}: {}", file.path.display(), err);
                        FileOutcome {
                            source: file.path.clone(),
                            category: category_of(&file.name),
                            action: Action::Failed {
                                error: err.to_string(),
                            },
                        }
                    }
                },
            };
            reporter.on_file_complete(&outcome, index + 1, files.len());
            report.record(outcome);
        }
        report.organize_duration = organize_start.elapsed();

        info!(
            "Done organizing: {} placed, {} renamed, {} archived, {} duplicates deleted, {} failed",
            report.placed, report.renamed, report.archived, report.deleted, report.failed,
        );
        reporter.on_organize_complete(&report);

        Ok(report)
    }

    fn process_file(
        &self,
        root: &Path,
        registry: &mut Registry,
        adopted: &mut HashSet<PathBuf>,
        file: &DiscoveredFile,
    ) -> Result<FileOutcome, Error> {
        let category = category_of(&file.name);
        let identity =
            identify(&file.path, self.config.block_size).map_err(|source| Error::Read {
                path: file.path.clone(),
                source,
            })?;

        let policy = self.config.rename_policy;
        let category_dir = root.join(&category);

        if !registry.contains(&category, &file.name) {
            if let Some(occupant) = self.adopt_occupant(&category_dir, file, registry, &category) {
                adopted.insert(occupant);
            }
        }

        let action = match classify(registry, &category, &file.name, &identity) {
            Decision::Fresh => {
                let name = resolve_name(&category_dir, &file.name, true, policy, &file.path, |n| {
                    registry.contains(&category, n)
                })?;
                let dest = category_dir.join(&name);
                move_file(&file.path, &dest)?;
                debug!("Placed {} -> {}", file.path.display(), dest.display());
                let renamed = name != file.name;
                registry.register(&category, FileRecord::new(name, identity));
                if renamed {
                    Action::Renamed { dest }
                } else {
                    Action::Placed { dest }
                }
            }
            Decision::Duplicate { original } => {
                fs::remove_file(&file.path).map_err(|source| Error::Delete {
                    path: file.path.clone(),
                    source,
                })?;
                info!("Deleted duplicate: {}", file.path.display());
                Action::Deleted {
                    duplicate_of: original.name,
                    size: identity.size,
                }
            }
            Decision::Rename { original } => {
                let name = resolve_name(&category_dir, &file.name, false, policy, &file.path, |n| {
                    registry.contains(&category, n)
                })?;
                let dest = category_dir.join(&name);
                move_file(&file.path, &dest)?;
                debug!(
                    "Renamed {} -> {} (size differs from {})",
                    file.path.display(),
                    dest.display(),
                    original.name
                );
                registry.register(
                    &category,
                    FileRecord::variant(name, file.name.as_str(), identity),
                );
                Action::Renamed { dest }
            }
            Decision::Archive { original } => {
                let register = self.config.archive_policy == ArchivePolicy::Registered;
                let archive_dir = root.join(&self.config.archive_dir).join(&category);
                let name = resolve_name(&archive_dir, &file.name, false, policy, &file.path, |n| {
                    register && registry.contains(&category, n)
                })?;
                let dest = archive_dir.join(&name);
                move_file(&file.path, &dest)?;
                debug!(
                    "Archived {} -> {} (same size as {}, different content)",
                    file.path.display(),
                    dest.display(),
                    original.name
                );
                let record = FileRecord::variant(name, file.name.as_str(), identity);
                if register {
                    registry.register(&category, record);
                } else {
                    registry.record_archived(&category, record);
                }
                Action::Archived { dest }
            }
        };

        Ok(FileOutcome {
            source: file.path.clone(),
            category,
            action,
        })
    }

    /// Register the file already sitting at `category_dir/<name>` when it is
    /// neither `file` nor known to the registry, so the incoming file is
    /// classified against it. Returns the occupant's path once registered.
    fn adopt_occupant(
        &self,
        category_dir: &Path,
        file: &DiscoveredFile,
        registry: &mut Registry,
        category: &str,
    ) -> Option<PathBuf> {
        let occupant = category_dir.join(&file.name);
        if occupant == file.path {
            return None;
        }
        let is_file = fs::symlink_metadata(&occupant)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return None;
        }

        match identify(&occupant, self.config.block_size) {
            Ok(identity) => {
                debug!("Registering existing {} in place", occupant.display());
                registry.register(category, FileRecord::new(file.name.as_str(), identity));
                Some(occupant)
            }
            Err(err) => {
                warn!("Could not read existing {}: {}", occupant.display(), err);
                None
            }
        }
    }

    /// Register files already sitting in `root/<CATEGORY>/` and return their paths.
    ///
    /// Only top-level uppercase directories are considered, and only the files
    /// directly inside them whose own category matches the directory name.
    fn seed_registry(
        &self,
        root: &Path,
        ignore_patterns: &[Pattern],
        registry: &mut Registry,
    ) -> Result<HashSet<PathBuf>, Error> {
        let mut seeded = HashSet::new();

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) => {
                error!("Could not list {}: {}", root.display(), err);
                return Ok(seeded);
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    error!("Error reading entry in {}: {}", root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let Some(dir_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if dir_name == self.config.archive_dir
                || dir_name != dir_name.to_uppercase()
                || walk::is_ignored(&entry.path(), root, ignore_patterns)
            {
                continue;
            }

            let dir = entry.path();
            if let Err(err) =
                self.seed_category(root, &dir, &dir_name, ignore_patterns, registry, &mut seeded)
            {
                error!("Could not seed from {}: {}", dir.display(), err);
            }
        }

        debug!(
            "Seeded {} records across {} categories",
            registry.len(),
            registry.category_count()
        );
        Ok(seeded)
    }

    fn seed_category(
        &self,
        root: &Path,
        dir: &Path,
        category: &str,
        ignore_patterns: &[Pattern],
        registry: &mut Registry,
        seeded: &mut HashSet<PathBuf>,
    ) -> io::Result<()> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            match entry {
                Ok(entry) if entry.file_type().map(|t| t.is_file()).unwrap_or(false) => {
                    files.push(entry)
                }
                Ok(_) => {}
                Err(err) => error!("Error reading entry in {}: {}", dir.display(), err),
            }
        }
        files.sort_by_key(|e| e.file_name());

        for file in files {
            let path = file.path();
            let Some(name) = file.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if category_of(&name) != category || walk::is_ignored(&path, root, ignore_patterns) {
                continue;
            }

            match identify(&path, self.config.block_size) {
                Ok(identity) => {
                    registry.register(category, FileRecord::new(name, identity));
                    seeded.insert(path);
                }
                Err(err) => warn!("Could not seed {}: {}", path.display(), err),
            }
        }
        Ok(())
    }
}
