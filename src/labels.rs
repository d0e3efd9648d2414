use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, ServeError};

/// Class index → human-readable label, as declared by a model's `id2label` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: BTreeMap<u32, String>,
}

impl LabelMap {
    /// Parse an `id2label` table whose keys are decimal class indices.
    pub fn from_id2label(id2label: &HashMap<String, String>) -> Result<Self> {
        let labels = id2label
            .iter()
            .map(|(id, label)| {
                let id = id.trim().parse::<u32>().map_err(|_| {
                    ServeError::ModelFormat(format!(
                        "id2label key '{id}' is not a class index"
                    ))
                })?;
                Ok((id, label.clone()))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self { labels })
    }

    /// Labels `LABEL_0..LABEL_{n-1}`, used when a config only declares `num_labels`.
    pub fn with_default_labels(num_labels: usize) -> Self {
        let labels = (0..num_labels as u32)
            .map(|i| (i, format!("LABEL_{i}")))
            .collect();
        Self { labels }
    }

    pub fn label(&self, id: u32) -> Result<&str> {
        self.labels
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| ServeError::UnknownLabel {
                id,
                available: self.available(),
            })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.labels.iter().map(|(id, label)| (*id, label.as_str()))
    }

    /// The table in the string-keyed shape model configs use.
    pub fn to_id2label(&self) -> HashMap<String, String> {
        self.labels
            .iter()
            .map(|(id, label)| (id.to_string(), label.clone()))
            .collect()
    }

    fn available(&self) -> String {
        self.labels
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}
