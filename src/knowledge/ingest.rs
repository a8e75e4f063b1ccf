use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::schema::Relationship;
use crate::core::error::{AssistantError, Result};

pub const DISEASE_COLUMN: &str = "Disease";
pub const SYMPTOM_COLUMN_PREFIX: &str = "Symptom_";


#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Unique diseases in first-appearance order.
    pub diseases: Vec<String>,
    /// Unique symptoms, sorted.
    pub symptoms: Vec<String>,
    /// One entry per non-empty (disease, symptom) cell, duplicates kept.
    pub relationships: Vec<Relationship>,
}

#[derive(Default)]
struct DatasetBuilder {
    diseases: Vec<String>,
    seen_diseases: HashSet<String>,
    symptoms: BTreeSet<String>,
    relationships: Vec<Relationship>,
    skipped_rows: usize,
}

impl DatasetBuilder {
    fn push_row<I>(&mut self, disease: Option<&str>, symptoms: I)
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let Some(disease) = disease.filter(|d| !d.trim().is_empty()) else {
            self.skipped_rows += 1;
            return;
        };

        if self.seen_diseases.insert(disease.to_string()) {
            self.diseases.push(disease.to_string());
        }

        for symptom in symptoms.into_iter().flatten() {
            if symptom.trim().is_empty() {
                continue;
            }
            self.relationships.push(Relationship::has_symptom(disease, symptom.as_str()));
            self.symptoms.insert(symptom);
        }
    }

    fn finish(self) -> Dataset {
        if self.skipped_rows > 0 {
            debug!("Skipped {} rows without a disease value", self.skipped_rows);
        }
        Dataset {
            diseases: self.diseases,
            symptoms: self.symptoms.into_iter().collect(),
            relationships: self.relationships,
        }
    }
}


pub struct DataIngestor;

impl DataIngestor {
    /// Loads a delimited file, or a directory of partitioned Parquet files.
    pub fn ingest(source: impl AsRef<Path>) -> Result<Dataset> {
        let source = source.as_ref();
        if !source.exists() {
            return Err(AssistantError::NotFound(format!(
                "dataset not found at {}",
                source.display()
            )));
        }

        let dataset = if source.is_dir() {
            Self::ingest_parquet_dir(source)?
        } else {
            Self::ingest_csv(source)?
        };

        info!(
            "Ingested {}: diseases={}, symptoms={}, relationships={}",
            source.display(),
            dataset.diseases.len(),
            dataset.symptoms.len(),
            dataset.relationships.len()
        );

        Ok(dataset)
    }

    fn ingest_csv(path: &Path) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();

        let disease_col = headers
            .iter()
            .position(|h| h.trim() == DISEASE_COLUMN)
            .ok_or_else(|| missing_column(path))?;
        let symptom_cols: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.trim().starts_with(SYMPTOM_COLUMN_PREFIX))
            .map(|(i, _)| i)
            .collect();
        if symptom_cols.is_empty() {
            return Err(missing_symptom_columns(path));
        }

        let mut builder = DatasetBuilder::default();
        for record in reader.records() {
            let record = record?;
            builder.push_row(
                record.get(disease_col),
                symptom_cols.iter().map(|&i| record.get(i).map(str::to_string)),
            );
        }

        Ok(builder.finish())
    }

    fn ingest_parquet_dir(dir: &Path) -> Result<Dataset> {
        let mut files = Vec::new();
        collect_parquet_files(dir, &mut files)?;
        files.sort();

        if files.is_empty() {
            return Err(AssistantError::DataFormat(format!(
                "no parquet files under {}",
                dir.display()
            )));
        }

        let mut builder = DatasetBuilder::default();
        for file in &files {
            debug!("Reading partition {}", file.display());
            Self::read_parquet_file(file, &mut builder)?;
        }

        Ok(builder.finish())
    }

    fn read_parquet_file(path: &Path, builder: &mut DatasetBuilder) -> Result<()> {
        let reader = SerializedFileReader::new(File::open(path)?)?;
        let partition_disease = partition_value(path, DISEASE_COLUMN);

        let columns: Vec<String> = reader
            .metadata()
            .file_metadata()
            .schema()
            .get_fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        if partition_disease.is_none() && !columns.iter().any(|c| c == DISEASE_COLUMN) {
            return Err(missing_column(path));
        }
        if !columns.iter().any(|c| c.starts_with(SYMPTOM_COLUMN_PREFIX)) {
            return Err(missing_symptom_columns(path));
        }

        for row in reader.get_row_iter(None)? {
            let row = row?;
            let mut disease = partition_disease.clone();
            let mut symptoms = Vec::new();
            for (name, field) in row.get_column_iter() {
                if name == DISEASE_COLUMN {
                    if let Some(value) = field_text(field) {
                        disease = Some(value);
                    }
                } else if name.starts_with(SYMPTOM_COLUMN_PREFIX) {
                    symptoms.push(field_text(field));
                }
            }
            builder.push_row(disease.as_deref(), symptoms);
        }

        Ok(())
    }
}

fn missing_column(path: &Path) -> AssistantError {
    AssistantError::DataFormat(format!(
        "required column '{DISEASE_COLUMN}' missing in {}",
        path.display()
    ))
}

fn missing_symptom_columns(path: &Path) -> AssistantError {
    AssistantError::DataFormat(format!(
        "no '{SYMPTOM_COLUMN_PREFIX}*' columns in {}",
        path.display()
    ))
}

fn collect_parquet_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_parquet_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "parquet") {
            out.push(path);
        }
    }
    Ok(())
}

/// Value of a hive-style `column=value` directory above `path`, if any.
fn partition_value(path: &Path, column: &str) -> Option<String> {
    let prefix = format!("{column}=");
    path.ancestors()
        .filter_map(|p| p.file_name()?.to_str())
        .find_map(|segment| segment.strip_prefix(&prefix).map(str::to_string))
        .filter(|value| !value.is_empty() && value != "__HIVE_DEFAULT_PARTITION__")
}

fn field_text(field: &Field) -> Option<String> {
    match field {
        Field::Null => None,
        Field::Str(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
