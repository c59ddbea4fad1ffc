// Result renderer
//
// Turns a result envelope into a presentation-neutral structure. Rendering
// looks only at the envelope's shape tag, never at which backend produced it,
// and never fails: an envelope whose payload does not match its shape is
// rendered as its message alone.

use serde_json::Value;
use std::fmt;

use crate::models::{BackendKind, GeneratedQuery, QueryConstruct, ResultEnvelope, ResultShape};

pub const NULL_PLACEHOLDER: &str = "NULL";
pub const NO_DOCUMENTS: &str = "No documents found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Failure,
    Info,
}

/// One line for the status region
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: StatusTone::Success }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: StatusTone::Failure }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: StatusTone::Info }
    }

    pub fn is_failure(&self) -> bool {
        self.tone == StatusTone::Failure
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.tone {
            StatusTone::Success => "[ok]",
            StatusTone::Failure => "[error]",
            StatusTone::Info => "[info]",
        };
        write!(f, "{} {}", tag, self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedBody {
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Documents(Vec<RenderedDocument>),
    /// Shown when a documents result is empty
    Notice(String),
    MessageOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub status: StatusMessage,
    pub body: RenderedBody,
}

pub struct ResultRenderer;

impl ResultRenderer {
    pub fn render(envelope: &ResultEnvelope) -> RenderedResult {
        let status = if envelope.success {
            StatusMessage::success(envelope.message.clone())
        } else {
            StatusMessage::failure(envelope.message.clone())
        };

        // Failed envelopes never show data, whatever they carry
        if !envelope.success {
            return RenderedResult { status, body: RenderedBody::MessageOnly };
        }

        let body = match envelope.shape {
            ResultShape::Tabular => {
                match Self::render_table(envelope.columns.as_deref(), envelope.rows.as_deref()) {
                    Some(table) => table,
                    None => {
                        return RenderedResult {
                            status: StatusMessage::success(format!(
                                "{} (the result table is incomplete)",
                                envelope.message
                            )),
                            body: RenderedBody::MessageOnly,
                        };
                    }
                }
            }
            ResultShape::Documents => match envelope.documents.as_deref() {
                Some([]) => RenderedBody::Notice(NO_DOCUMENTS.to_string()),
                Some(documents) => RenderedBody::Documents(Self::render_documents(documents)),
                None => RenderedBody::MessageOnly,
            },
            ResultShape::None => RenderedBody::MessageOnly,
        };

        RenderedResult { status, body }
    }

    /// Requires both parts and every row aligned to the header
    fn render_table(columns: Option<&[String]>, rows: Option<&[Vec<Value>]>) -> Option<RenderedBody> {
        let (columns, rows) = (columns?, rows?);
        if rows.iter().any(|row| row.len() != columns.len()) {
            return None;
        }

        Some(RenderedBody::Table {
            header: columns.to_vec(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(Self::render_cell).collect())
                .collect(),
        })
    }

    fn render_documents(documents: &[Value]) -> Vec<RenderedDocument> {
        documents
            .iter()
            .enumerate()
            .map(|(index, document)| RenderedDocument {
                title: format!("Document {}", index + 1),
                body: serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string()),
            })
            .collect()
    }

    /// Null becomes the placeholder; an empty string stays empty
    pub fn render_cell(value: &Value) -> String {
        match value {
            Value::Null => NULL_PLACEHOLDER.to_string(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RenderedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status)?;
        match &self.body {
            RenderedBody::Table { header, rows } => write_table(f, header, rows),
            RenderedBody::Documents(documents) => {
                for document in documents {
                    writeln!(f, "--- {} ---", document.title)?;
                    writeln!(f, "{}", document.body)?;
                }
                Ok(())
            }
            RenderedBody::Notice(notice) => writeln!(f, "{}", notice),
            RenderedBody::MessageOnly => Ok(()),
        }
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(f, header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(f, "|-{}-|", rule.join("-|-"))?;
    for row in rows {
        write_row(f, row, &widths)?;
    }
    Ok(())
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(f, "| {} |", padded.join(" | "))
}

/// One generated or translated query, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCard {
    pub title: String,
    pub natural_language: String,
    pub label: String,
    /// Text that can be copied into the query input unchanged
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQueries {
    pub heading: String,
    pub cards: Vec<QueryCard>,
}

pub struct QueryCardRenderer;

impl QueryCardRenderer {
    pub fn render_samples(
        backend: BackendKind,
        construct: QueryConstruct,
        queries: &[GeneratedQuery],
    ) -> RenderedQueries {
        RenderedQueries {
            heading: format!("Sample Queries using {}", construct),
            cards: queries
                .iter()
                .enumerate()
                .map(|(index, query)| QueryCard {
                    title: format!("Example {}: {}", index + 1, query.description),
                    natural_language: query.natural_language.clone(),
                    label: format!("{} Query:", backend.as_str().to_uppercase()),
                    body: query.dialect_body(backend).unwrap_or_default(),
                })
                .collect(),
        }
    }

    pub fn render_translation(backend: BackendKind, query: &GeneratedQuery) -> QueryCard {
        QueryCard {
            title: query.description.clone(),
            natural_language: query.natural_language.clone(),
            label: format!("Generated {} Query:", backend.as_str().to_uppercase()),
            body: query.dialect_body(backend).unwrap_or_default(),
        }
    }
}

impl fmt::Display for QueryCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  Natural Language: {}", self.natural_language)?;
        writeln!(f, "  {}", self.label)?;
        for line in self.body.lines() {
            writeln!(f, "    {}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for RenderedQueries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        for card in &self.cards {
            writeln!(f)?;
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}
