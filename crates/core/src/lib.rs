pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod query;
pub mod store;
pub mod stores;

pub use chunking::{chunk_page, make_chunk_id, ChunkingConfig};
pub use config::Config;
pub use embeddings::{build_embedder, Embedder, NgramHashEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{ConfigError, EmbedError, IngestError, QueryError, StoreError};
pub use extractor::{LopdfExtractor, PageText, PdfExtractor};
pub use ingest::{discover_pdf_files, ingest_directory};
pub use models::{Chunk, ChunkRecord, DocumentError, IngestReport, ScoredChunk, SearchResult};
pub use query::QueryEngine;
pub use store::VectorStore;
pub use stores::DiskVectorStore;
