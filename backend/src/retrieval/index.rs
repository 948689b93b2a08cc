//! Persisted lexical (TF-IDF) index over resume chunks.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared::{Result, SharedError};

use crate::ingest::parsing::{chunk_resume, infer_resume_type, is_supported, normalize, read_text, DEFAULT_MAX_CHARS};

pub const INDEX_FILE: &str = "lexical_index.json";
pub const META_FILE: &str = "meta.jsonl";

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9+#.]+").unwrap());

/// Raw `[A-Za-z0-9+#.]+` runs of `text`.
pub fn raw_tokens(text: &str) -> impl Iterator<Item = &str> {
    TOKEN_REGEX.find_iter(text).map(|m| m.as_str())
}

/// Lower-cased index terms: trailing dots trimmed, at least two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    raw_tokens(text)
        .map(|t| t.trim_end_matches('.').to_lowercase())
        .filter(|t| t.chars().count() >= 2)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMeta {
    pub source_file: String,
    pub resume_type: String,
    pub text: String,
}

pub type SparseVector = Vec<(u32, f32)>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LexicalIndex {
    pub terms: Vec<String>,
    pub idf: Vec<f32>,
    pub vectors: Vec<SparseVector>,
    #[serde(skip)]
    lookup: HashMap<String, u32>,
}

fn l2_normalize(vector: &mut SparseVector) {
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in vector.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of two id-sorted sparse vectors.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

impl LexicalIndex {
    /// Fits idf weights on `texts` and stores one normalized vector per text.
    pub fn fit(texts: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

        let mut lookup: HashMap<String, u32> = HashMap::new();
        let mut terms = Vec::new();
        let mut df: Vec<u32> = Vec::new();
        for tokens in &tokenized {
            let mut seen = std::collections::HashSet::new();
            for token in tokens {
                let id = *lookup.entry(token.clone()).or_insert_with(|| {
                    terms.push(token.clone());
                    df.push(0);
                    (terms.len() - 1) as u32
                });
                if seen.insert(id) {
                    df[id as usize] += 1;
                }
            }
        }

        let n = texts.len() as f32;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
            .collect();

        let mut index = Self {
            terms,
            idf,
            vectors: Vec::new(),
            lookup,
        };
        index.vectors = tokenized.iter().map(|tokens| index.weigh(tokens)).collect();
        index
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for token in tokens {
            if let Some(&id) = self.lookup.get(token) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }
        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id as usize]))
            .collect();
        vector.sort_by_key(|(id, _)| *id);
        l2_normalize(&mut vector);
        vector
    }

    /// Vector for arbitrary text; unknown terms are ignored.
    pub fn embed(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top `k` documents by cosine similarity, best first (ties keep index order).
    pub fn search(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        let q = self.embed(query);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine(&q, v)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    fn rebuild_lookup(&mut self) {
        self.lookup = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
    }
}

/// Index plus the chunk metadata it was built from.
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: LexicalIndex,
    pub metas: Vec<ChunkMeta>,
}

pub fn index_exists(index_dir: &Path) -> bool {
    index_dir.join(INDEX_FILE).exists() && index_dir.join(META_FILE).exists()
}

/// Supported resume files under `resumes_dir`, sorted by file name.
pub fn list_resume_files(resumes_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(resumes_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .map(|n| is_supported(&n.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

/// Reads every supported resume, chunks it and writes the index files.
/// Returns the chunk count and the file names that were indexed.
pub fn build_and_save_index(resumes_dir: &Path, index_dir: &Path) -> Result<(usize, Vec<String>)> {
    let mut metas = Vec::new();
    let mut saved_files = Vec::new();

    for path in list_resume_files(resumes_dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        saved_files.push(name.clone());

        let text = normalize(&read_text(&path)?);
        let resume_type = infer_resume_type(&name);
        let chunks = chunk_resume(&text, DEFAULT_MAX_CHARS);
        debug!("{}: {} chunks ({})", name, chunks.len(), resume_type);

        metas.extend(chunks.into_iter().map(|text| ChunkMeta {
            source_file: name.clone(),
            resume_type: resume_type.to_string(),
            text,
        }));
    }

    if metas.is_empty() {
        return Err(SharedError::BadRequest(
            "No valid resume chunks found. Upload resumes first.".to_string(),
        ));
    }

    let texts: Vec<String> = metas.iter().map(|m| m.text.clone()).collect();
    let index = LexicalIndex::fit(&texts);

    fs::create_dir_all(index_dir)?;
    fs::write(index_dir.join(INDEX_FILE), serde_json::to_vec(&index)?)?;

    let mut writer = BufWriter::new(fs::File::create(index_dir.join(META_FILE))?);
    for meta in &metas {
        serde_json::to_writer(&mut writer, meta)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        "Indexed {} chunks from {} files into {}",
        metas.len(),
        saved_files.len(),
        index_dir.display()
    );
    Ok((metas.len(), saved_files))
}

fn corrupt_index(e: serde_json::Error) -> SharedError {
    SharedError::Internal(format!("Corrupt index: {}", e))
}

pub fn load_index(index_dir: &Path) -> Result<LoadedIndex> {
    if !index_exists(index_dir) {
        return Err(SharedError::BadRequest(
            "Index not found. Upload resumes and build the index first.".to_string(),
        ));
    }
    let raw = fs::read(index_dir.join(INDEX_FILE))?;
    let mut index: LexicalIndex = serde_json::from_slice(&raw).map_err(corrupt_index)?;
    index.rebuild_lookup();

    let reader = BufReader::new(fs::File::open(index_dir.join(META_FILE))?);
    let mut metas = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        metas.push(serde_json::from_str::<ChunkMeta>(&line).map_err(corrupt_index)?);
    }

    if metas.len() != index.len() {
        warn!(
            "Index has {} vectors but {} metadata rows",
            index.len(),
            metas.len()
        );
    }
    Ok(LoadedIndex { index, metas })
}
