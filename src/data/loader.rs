// ============================================================
// Layer 4 — MultiNLI Corpus Loader
// ============================================================
// Fetches the MultiNLI archive into the data directory (once),
// extracts it, and parses the train TSV into records.
//
// Caching contract:
//   - if the extracted TSV already exists, nothing is downloaded
//     and nothing is rewritten — repeated calls are idempotent
//   - if only the zip exists, it is extracted in place
//   - otherwise the archive is downloaded first
//
// The TSV format is owned by the external dataset. We read it
// header-first, so the label and text column names are plain
// configuration, not hard-coded offsets. Filtering the rows to
// one entailment category is the CALLER's responsibility — the
// loader returns every row, including its gold_label.
//
// Reference: Williams et al. (2018) MultiNLI

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::errors::PipelineError;
use crate::domain::example::Example;
use crate::domain::traits::ExampleSource;

/// Canonical distribution URL for the MultiNLI 1.0 archive
pub const MNLI_URL: &str = "https://cims.nyu.edu/~sbowman/multinli/multinli_1.0.zip";

const ARCHIVE_NAME: &str = "multinli_1.0.zip";
const TRAIN_FILE:   &str = "multinli_1.0/multinli_1.0_train.txt";

/// One raw row of the corpus, before any filtering.
/// `gold_label` is kept so the caller can filter to a single
/// entailment category (the corpus repeats each sentence once
/// per gold label, so this filter deduplicates — best effort).
#[derive(Debug, Clone)]
pub struct MnliRecord {
    /// Raw join id (pairID column)
    pub pair_id: String,

    /// Entailment category of the row (entailment / neutral / contradiction)
    pub gold_label: String,

    /// The genre label (value of the configured label column)
    pub genre: String,

    /// The sentence text (value of the configured text column)
    pub text: String,
}

impl MnliRecord {
    /// Drop the entailment category and keep the classification triple
    pub fn into_example(self) -> Example {
        Example::new(self.pair_id, self.text, self.genre)
    }
}

/// Loads the MultiNLI corpus from a data directory,
/// downloading and extracting the archive on first use.
pub struct MnliLoader {
    data_dir:     PathBuf,
    label_column: String,
    text_column:  String,
}

impl MnliLoader {
    pub fn new(
        data_dir:     impl Into<PathBuf>,
        label_column: impl Into<String>,
        text_column:  impl Into<String>,
    ) -> Self {
        Self {
            data_dir:     data_dir.into(),
            label_column: label_column.into(),
            text_column:  text_column.into(),
        }
    }

    /// Make sure the extracted train TSV exists, downloading and
    /// extracting the archive only if it is absent.
    /// Returns the path to the TSV.
    pub fn ensure_downloaded(&self) -> Result<PathBuf> {
        let train_path = self.data_dir.join(TRAIN_FILE);

        // Cached extraction → nothing to do. This branch is what makes
        // repeated calls idempotent: no network, no rewrites.
        if train_path.exists() {
            tracing::debug!("Corpus already extracted at '{}'", train_path.display());
            return Ok(train_path);
        }

        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Cannot create data dir '{}'", self.data_dir.display()))?;

        // ── Step 1: Download the archive if we don't have it ──────────────────
        let archive_path = self.data_dir.join(ARCHIVE_NAME);
        if archive_path.exists() {
            tracing::info!("Archive already present, skipping download");
        } else {
            download_archive(MNLI_URL, &archive_path)?;
        }

        // ── Step 2: Extract the zip into the data directory ───────────────────
        tracing::info!("Extracting '{}'", archive_path.display());
        let file = fs::File::open(&archive_path)
            .with_context(|| format!("Cannot open archive '{}'", archive_path.display()))?;
        let mut archive = zip::ZipArchive::new(file)
            .with_context(|| "Corpus archive is not a valid zip file")?;
        archive
            .extract(&self.data_dir)
            .with_context(|| format!("Cannot extract into '{}'", self.data_dir.display()))?;

        if !train_path.exists() {
            anyhow::bail!(
                "Archive extracted but '{}' was not found — unexpected archive layout",
                train_path.display()
            );
        }

        tracing::info!("Corpus ready at '{}'", train_path.display());
        Ok(train_path)
    }

    /// Parse the train TSV into records, keeping every row.
    ///
    /// Rows missing the configured label or text columns (or with an
    /// empty text cell) are skipped with a warning rather than
    /// aborting the run — the corpus contains a handful of such rows.
    pub fn load_records(&self) -> Result<Vec<MnliRecord>> {
        let path = self.ensure_downloaded()?;
        self.parse_tsv(&path)
    }

    fn parse_tsv(&self, path: &Path) -> Result<Vec<MnliRecord>> {
        // The corpus TSV is unquoted — sentences contain literal quote
        // characters, so quoting must be disabled or rows get merged.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Cannot open corpus TSV '{}'", path.display()))?;

        // ── Resolve column indexes from the header row ────────────────────────
        let headers = reader.headers()?.clone();
        let col = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("Corpus TSV has no '{}' column", name))
        };
        let label_idx = col(&self.label_column)?;
        let text_idx  = col(&self.text_column)?;
        let gold_idx  = col("gold_label")?;
        let id_idx    = col("pairID")?;

        // ── Read rows ─────────────────────────────────────────────────────────
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (row_no, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("Corrupt TSV row {}", row_no + 2))?;

            let field = |idx: usize| row.get(idx).unwrap_or("").trim();
            let text  = field(text_idx);
            let genre = field(label_idx);

            if text.is_empty() || genre.is_empty() {
                skipped += 1;
                continue;
            }

            records.push(MnliRecord {
                pair_id:    field(id_idx).to_string(),
                gold_label: field(gold_idx).to_string(),
                genre:      genre.to_string(),
                text:       text.to_string(),
            });
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} rows with empty label or text", skipped);
        }
        tracing::info!("Loaded {} corpus rows", records.len());
        Ok(records)
    }
}

/// Implement the ExampleSource trait so the application layer can
/// consume the corpus without knowing about the TSV format.
/// Note: returns ALL rows — filtering to one entailment category
/// happens in the use case.
impl ExampleSource for MnliLoader {
    fn load_all(&self) -> Result<Vec<Example>> {
        Ok(self
            .load_records()?
            .into_iter()
            .map(MnliRecord::into_example)
            .collect())
    }
}

/// Download the archive to `dest`, writing through a temp file so a
/// failed download never leaves a truncated archive behind.
fn download_archive(url: &str, dest: &Path) -> Result<()> {
    tracing::info!("Downloading corpus archive from {}", url);

    let fail = |reason: String| PipelineError::DownloadFailure {
        url: url.to_string(),
        reason,
    };

    let response = reqwest::blocking::get(url).map_err(|e| fail(e.to_string()))?;
    if !response.status().is_success() {
        return Err(fail(format!("HTTP {}", response.status())).into());
    }
    let bytes = response.bytes().map_err(|e| fail(e.to_string()))?;

    let tmp = dest.with_extension("part");
    let mut f = fs::File::create(&tmp)
        .with_context(|| format!("Cannot create '{}'", tmp.display()))?;
    f.write_all(&bytes)?;
    f.flush()?;
    fs::rename(&tmp, dest)?;

    tracing::info!("Downloaded {} bytes", bytes.len());
    Ok(())
}
