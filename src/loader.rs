use crate::error::{Error, Result};
use crate::types::{BillFile, BillRecord};
use async_stream::stream;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use futures::{Stream, StreamExt};
use jwalk::WalkDir;
use serde::Deserialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// On-disk encoding of a bill file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillFormat {
    /// Plain UTF-8 JSON
    Json,
    /// Gzip-compressed JSON
    Gzip,
}

impl BillFormat {
    /// Detect the format from the leading bytes of a file
    pub fn sniff(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            return Ok(BillFormat::Gzip);
        }
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Ok(BillFormat::Json),
            Some(b) => Err(Error::UnknownFormat(format!(
                "expected JSON object or gzip data, found byte 0x{:02x}",
                b
            ))),
            None => Err(Error::UnknownFormat("empty file".to_string())),
        }
    }
}

/// Decode raw file bytes into JSON bytes, reporting the detected format
pub fn decode_bill_bytes(bytes: Vec<u8>) -> Result<(BillFormat, Vec<u8>)> {
    match BillFormat::sniff(&bytes)? {
        BillFormat::Json => Ok((BillFormat::Json, bytes)),
        BillFormat::Gzip => {
            let mut decoder = GzDecoder::new(bytes.as_slice());
            let mut json = Vec::new();
            decoder.read_to_end(&mut json)?;
            Ok((BillFormat::Gzip, json))
        }
    }
}

/// Read a bill file and return its decoded JSON bytes
pub fn read_bill_json(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    decode_bill_bytes(bytes).map(|(_, json)| json)
}

/// Read and parse a plain or gzip JSON bill file
pub fn read_bill_file(path: &Path) -> Result<BillRecord> {
    let json = read_bill_json(path)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Write a JSON value to `path` in the given format
pub fn write_bill_file(path: &Path, value: &serde_json::Value, format: BillFormat) -> Result<()> {
    let json = serde_json::to_vec(value)?;
    match format {
        BillFormat::Json => std::fs::write(path, json)?,
        BillFormat::Gzip => {
            let file = std::fs::File::create(path)?;
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(&json)?;
            encoder.finish()?;
        }
    }
    Ok(())
}

/// A decoded bill file: the typed record plus the JSON it was read from
#[derive(Debug, Clone)]
pub struct BillDocument {
    pub record: BillRecord,
    /// Decoded JSON as stored, including fields the record does not model
    pub source: Value,
}

impl BillDocument {
    pub fn from_value(source: Value) -> Result<Self> {
        let record = BillRecord::deserialize(&source)?;
        Ok(Self { record, source })
    }

    pub fn from_slice(json: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(json)?)
    }
}

/// The bill cache directory
#[derive(Debug, Clone)]
pub struct BillCorpus {
    bills_dir: PathBuf,
}

impl BillCorpus {
    pub fn new(bills_dir: impl Into<PathBuf>) -> Self {
        Self {
            bills_dir: bills_dir.into(),
        }
    }

    pub fn bills_dir(&self) -> &Path {
        &self.bills_dir
    }

    /// Find every regular file below the bills directory, ordered by path
    /// Uses jwalk for fast parallel filesystem traversal
    pub fn discover(&self) -> Result<Vec<BillFile>> {
        if !self.bills_dir.is_dir() {
            return Err(Error::Path(format!(
                "Bills directory does not exist: {}",
                self.bills_dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry_result in WalkDir::new(&self.bills_dir).into_iter() {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative_path = pathdiff::diff_paths(&path, &self.bills_dir)
                .unwrap_or_else(|| path.clone())
                .to_string_lossy()
                .to_string();

            files.push(BillFile {
                path,
                relative_path,
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    /// Decode every bill file in path order
    ///
    /// Each item pairs the file with its parse result so callers decide
    /// whether a bad file is skipped or fatal.
    pub fn load(&self) -> impl Stream<Item = Result<(BillFile, Result<BillDocument>)>> {
        let corpus = self.clone();
        Box::pin(stream! {
            // jwalk is fast but synchronous, so discovery runs in spawn_blocking
            let discovered = tokio::task::spawn_blocking(move || corpus.discover()).await;
            let files = match discovered {
                Ok(Ok(files)) => files,
                Ok(Err(e)) => {
                    yield Err(e);
                    return;
                }
                Err(e) => {
                    yield Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Task join error: {}", e)
                    )));
                    return;
                }
            };

            for file in files {
                let document: Result<BillDocument> = match tokio::fs::read(&file.path).await {
                    Ok(bytes) => decode_bill_bytes(bytes)
                        .and_then(|(_, json)| BillDocument::from_slice(&json)),
                    Err(e) => Err(Error::Io(e)),
                };
                yield Ok((file, document));
            }
        })
    }

    /// Load all decodable bill files, logging and skipping the rest
    pub async fn load_documents(&self) -> Result<Vec<BillDocument>> {
        let mut stream = self.load();
        let mut documents = Vec::new();

        while let Some(item) = stream.next().await {
            let (file, document) = item?;
            match document {
                Ok(document) => documents.push(document),
                Err(e) => {
                    tracing::error!("Error loading bill {}: {}", file.path.display(), e);
                }
            }
        }

        tracing::debug!(
            "Decoded {} bills from {}",
            documents.len(),
            self.bills_dir().display()
        );
        Ok(documents)
    }

    /// Load all decodable bills, logging and skipping the rest
    pub async fn load_all(&self) -> Result<Vec<BillRecord>> {
        Ok(self
            .load_documents()
            .await?
            .into_iter()
            .map(|document| document.record)
            .collect())
    }
}
