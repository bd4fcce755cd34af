use crate::chunking::{chunk_page, ChunkingConfig};
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::extractor::PdfExtractor;
use crate::models::{Chunk, ChunkRecord, DocumentError, IngestReport};
use crate::store::VectorStore;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// PDF files directly inside `folder` (no recursion), sorted lexicographically
/// so ingestion order is deterministic.
pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// Runs the full pipeline over every PDF in the configured docs directory:
/// extract pages, window each page, embed the windows as one batch, upsert
/// into the store. A failure in any stage is recorded against that document
/// and the remaining documents still run.
///
/// Chunk ids depend only on `(document, page, offset)`, so re-running over an
/// unchanged corpus overwrites the same records. Chunks left behind by a
/// document that shrank are not reconciled here; callers that need a clean
/// slate clear the document (or the collection) first.
pub fn ingest_directory<X, E, S>(
    config: &Config,
    extractor: &X,
    embedder: &E,
    store: &mut S,
) -> IngestReport
where
    X: PdfExtractor,
    E: Embedder,
    S: VectorStore,
{
    let chunking = ChunkingConfig::from(config);
    let mut report = IngestReport::default();

    for path in discover_pdf_files(&config.docs_dir) {
        match ingest_document(&path, &chunking, extractor, embedder, store) {
            Ok(written) => {
                report.documents_processed += 1;
                report.chunks_written += written;
            }
            Err(error) => report.errors.push(DocumentError {
                document: path,
                cause: error.to_string(),
            }),
        }
    }

    report
}

fn ingest_document<X, E, S>(
    path: &Path,
    chunking: &ChunkingConfig,
    extractor: &X,
    embedder: &E,
    store: &mut S,
) -> Result<usize, IngestError>
where
    X: PdfExtractor,
    E: Embedder,
    S: VectorStore,
{
    let document_id = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })?
        .to_string();

    let pages = extractor.extract_pages(path)?;

    let mut chunks: Vec<Chunk> = Vec::new();
    for page in pages {
        chunks.extend(chunk_page(&page.text, page.number, &document_id, chunking));
    }

    if chunks.is_empty() {
        return Ok(0);
    }

    let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
    let embeddings = embedder.embed_batch(&texts)?;

    let records: Vec<ChunkRecord> = chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| ChunkRecord { chunk, embedding })
        .collect();

    let written = records.len();
    store.upsert(records)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::{discover_pdf_files, ingest_directory};
    use crate::config::Config;
    use crate::embeddings::{Embedder, NgramHashEmbedder};
    use crate::error::IngestError;
    use crate::extractor::{PageText, PdfExtractor};
    use crate::store::VectorStore;
    use crate::stores::DiskVectorStore;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    /// Serves canned pages keyed by file name; unknown files fail like an
    /// unparsable PDF.
    struct FakeExtractor {
        pages: HashMap<String, Vec<PageText>>,
    }

    impl FakeExtractor {
        fn new(entries: &[(&str, &[&str])]) -> Self {
            let pages = entries
                .iter()
                .map(|(name, texts)| {
                    let pages = texts
                        .iter()
                        .enumerate()
                        .map(|(index, text)| PageText {
                            number: (index + 1) as u32,
                            text: text.to_string(),
                        })
                        .collect();
                    (name.to_string(), pages)
                })
                .collect();
            Self { pages }
        }
    }

    impl PdfExtractor for FakeExtractor {
        fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
            let name = path.file_name().and_then(|name| name.to_str()).unwrap();
            self.pages
                .get(name)
                .cloned()
                .ok_or_else(|| IngestError::PdfParse(format!("unreadable pdf: {name}")))
        }
    }

    fn test_config(docs_dir: &Path) -> Config {
        Config {
            docs_dir: docs_dir.to_path_buf(),
            chunk_size: 1000,
            chunk_overlap: 200,
            ..Config::default()
        }
    }

    fn touch_pdfs(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"%PDF-1.4\n%fake").unwrap();
        }
    }

    #[test]
    fn discovery_is_sorted_and_non_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        touch_pdfs(dir.path(), &["b.pdf", "a.PDF", "notes.txt"]);

        let nested = dir.path().join("nested");
        fs::create_dir(&nested)?;
        touch_pdfs(&nested, &["c.pdf"]);

        let names: Vec<_> = discover_pdf_files(dir.path())
            .into_iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
        Ok(())
    }

    #[test]
    fn empty_directory_yields_zero_report() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store_dir = tempdir()?;
        let config = test_config(dir.path());
        let embedder = NgramHashEmbedder::default();
        let mut store = DiskVectorStore::open(
            store_dir.path(),
            &config.collection,
            "char-ngram-128",
            128,
        )?;

        let extractor = FakeExtractor::new(&[]);
        let report = ingest_directory(&config, &extractor, &embedder, &mut store);

        assert_eq!(report.documents_processed, 0);
        assert_eq!(report.chunks_written, 0);
        assert!(report.errors.is_empty());
        Ok(())
    }

    #[test]
    fn one_bad_document_does_not_abort_the_batch() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store_dir = tempdir()?;
        touch_pdfs(dir.path(), &["broken.pdf", "good.pdf"]);

        let config = test_config(dir.path());
        let embedder = NgramHashEmbedder::default();
        let mut store = DiskVectorStore::open(
            store_dir.path(),
            &config.collection,
            "char-ngram-128",
            128,
        )?;

        let extractor = FakeExtractor::new(&[("good.pdf", &["audit requirements apply"])]);
        let report = ingest_directory(&config, &extractor, &embedder, &mut store);

        assert_eq!(report.documents_processed, 1);
        assert_eq!(report.chunks_written, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].document.file_name().unwrap(),
            "broken.pdf"
        );
        assert_eq!(store.document_chunk_count("good.pdf"), 1);
        Ok(())
    }

    #[test]
    fn reingestion_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store_dir = tempdir()?;
        touch_pdfs(dir.path(), &["policy.pdf"]);

        let config = test_config(dir.path());
        let embedder = NgramHashEmbedder::default();
        let mut store = DiskVectorStore::open(
            store_dir.path(),
            &config.collection,
            "char-ngram-128",
            128,
        )?;

        let long_page = "m".repeat(2050);
        let extractor = FakeExtractor::new(&[("policy.pdf", &[long_page.as_str()])]);

        let first = ingest_directory(&config, &extractor, &embedder, &mut store);
        assert_eq!(first.chunks_written, 3);
        assert_eq!(store.document_chunk_count("policy.pdf"), 3);

        let second = ingest_directory(&config, &extractor, &embedder, &mut store);
        assert_eq!(second.chunks_written, 3);
        assert_eq!(store.document_chunk_count("policy.pdf"), 3);
        assert_eq!(store.count(), 3);
        Ok(())
    }

    #[test]
    fn pages_are_windowed_at_expected_offsets() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store_dir = tempdir()?;
        touch_pdfs(dir.path(), &["spec-sheet.pdf"]);

        let config = test_config(dir.path());
        let embedder = NgramHashEmbedder::default();
        let mut store = DiskVectorStore::open(
            store_dir.path(),
            &config.collection,
            "char-ngram-128",
            128,
        )?;

        let page = "q".repeat(2050);
        let extractor = FakeExtractor::new(&[("spec-sheet.pdf", &[page.as_str()])]);
        ingest_directory(&config, &extractor, &embedder, &mut store);

        let query_vector = embedder.embed(&"q".repeat(1000))?;
        let mut starts: Vec<(usize, usize)> = store
            .query(&query_vector, 10)?
            .into_iter()
            .map(|hit| (hit.chunk.char_start, hit.chunk.char_end))
            .collect();
        starts.sort_unstable();

        assert_eq!(starts, vec![(0, 1000), (800, 1800), (1600, 2050)]);
        Ok(())
    }
}
