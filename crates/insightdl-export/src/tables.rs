//! Denormalization of documents into four related CSV tables.
//!
//! One document fans out to:
//!
//! | table                    | rows per document                               |
//! |--------------------------|-------------------------------------------------|
//! | `documents`              | 1                                               |
//! | `documents_companies`    | one per company relation matching the focus id  |
//! | `documents_topics`       | one per topic relation                          |
//! | `documents_denormalised` | focus-matching companies × topics               |
//!
//! Every table repeats the document's id, harvest time, sentiment and reach so
//! each file can be analysed on its own. A focus id that matches several
//! relations on one document is written once per match; nothing is
//! deduplicated.

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use insightdl_api::{CompanyRelation, Document, TopicRelation};

use crate::error::ExportError;

/// One of the four output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Documents,
    Denormalised,
    Companies,
    Topics,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Documents,
        Table::Denormalised,
        Table::Companies,
        Table::Topics,
    ];

    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Table::Documents => "documents.csv",
            Table::Denormalised => "documents_denormalised.csv",
            Table::Companies => "documents_companies.csv",
            Table::Topics => "documents_topics.csv",
        }
    }

    #[must_use]
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Table::Documents => &[
                "id",
                "harvest_time",
                "sentiment",
                "reach",
                "publisher",
                "domain",
                "source",
                "author",
                "url",
                "title",
            ],
            Table::Denormalised => &[
                "document_id",
                "harvest_time",
                "data_source",
                "sentiment",
                "reach",
                "company_id",
                "company_name",
                "company_significance",
                "topic_id",
                "topic_name",
                "topic_significance",
            ],
            Table::Companies => &[
                "document_id",
                "harvest_time",
                "sentiment",
                "reach",
                "company_id",
                "company_name",
                "company_significance",
            ],
            Table::Topics => &[
                "document_id",
                "harvest_time",
                "sentiment",
                "reach",
                "topic_id",
                "topic_name",
                "topic_significance",
            ],
        }
    }
}

/// Rows appended to each table by one call to [`DocumentTables::write_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchRows {
    pub documents: usize,
    pub denormalised: usize,
    pub companies: usize,
    pub topics: usize,
}

impl std::ops::AddAssign for BatchRows {
    fn add_assign(&mut self, rhs: Self) {
        self.documents += rhs.documents;
        self.denormalised += rhs.denormalised;
        self.companies += rhs.companies;
        self.topics += rhs.topics;
    }
}

/// The four CSV writers, held open together for a whole export.
pub struct DocumentTables<W: Write> {
    documents: csv::Writer<W>,
    denormalised: csv::Writer<W>,
    companies: csv::Writer<W>,
    topics: csv::Writer<W>,
}

/// Builds a writer that quotes every field and ends records with `\n`.
pub(crate) fn csv_writer<W: Write>(inner: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(inner)
}

impl<W: Write> DocumentTables<W> {
    /// Wraps four raw sinks. No headers are written.
    pub fn from_writers(documents: W, denormalised: W, companies: W, topics: W) -> Self {
        Self {
            documents: csv_writer(documents),
            denormalised: csv_writer(denormalised),
            companies: csv_writer(companies),
            topics: csv_writer(topics),
        }
    }

    pub(crate) fn from_csv_writers(
        documents: csv::Writer<W>,
        denormalised: csv::Writer<W>,
        companies: csv::Writer<W>,
        topics: csv::Writer<W>,
    ) -> Self {
        Self {
            documents,
            denormalised,
            companies,
            topics,
        }
    }

    /// Writes the header row of every table.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] if any write fails.
    pub fn write_headers(&mut self) -> Result<(), ExportError> {
        for table in Table::ALL {
            self.writer(table).write_record(table.headers())?;
        }
        Ok(())
    }

    /// Appends the rows for every document in `documents`, then flushes.
    ///
    /// All rows for one document are written to the four tables before the
    /// next document is started.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] if any write or flush fails. Rows written
    /// before the failure are not rolled back.
    pub fn write_batch(
        &mut self,
        documents: &[Document],
        focus_id: &str,
    ) -> Result<BatchRows, ExportError> {
        let mut rows = BatchRows::default();
        for document in documents {
            rows += self.write_document(document, focus_id)?;
        }
        self.flush()?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] if an underlying writer cannot be flushed.
    pub fn flush(&mut self) -> Result<(), ExportError> {
        for table in Table::ALL {
            self.writer(table)
                .flush()
                .map_err(|e| ExportError::Csv(e.into()))?;
        }
        Ok(())
    }

    fn writer(&mut self, table: Table) -> &mut csv::Writer<W> {
        match table {
            Table::Documents => &mut self.documents,
            Table::Denormalised => &mut self.denormalised,
            Table::Companies => &mut self.companies,
            Table::Topics => &mut self.topics,
        }
    }

    fn write_document(
        &mut self,
        document: &Document,
        focus_id: &str,
    ) -> Result<BatchRows, ExportError> {
        let core = CoreFields::from(document);
        let focus: Vec<&CompanyRelation> = document
            .companies
            .iter()
            .filter(|relation| relation.company.id == focus_id)
            .collect();
        let mut rows = BatchRows::default();

        self.documents.write_record([
            core.id,
            core.harvest_time,
            core.sentiment.as_str(),
            core.reach.as_str(),
            text(document.publisher.as_deref()),
            text(document.domain.as_deref()),
            text(document.source.as_deref()),
            text(document.author.as_deref()),
            text(document.url.as_deref()),
            text(document.title.as_deref()),
        ])?;
        rows.documents += 1;

        let data_source = text(document.source.as_deref());
        for company in &focus {
            let company_significance = number(company.significance);
            for topic in &document.topics {
                let topic_significance = number(topic.significance);
                self.denormalised.write_record([
                    core.id,
                    core.harvest_time,
                    data_source,
                    core.sentiment.as_str(),
                    core.reach.as_str(),
                    company.company.id.as_str(),
                    text(company.company.name.as_deref()),
                    company_significance.as_str(),
                    topic.topic.id.as_str(),
                    text(topic.topic.name.as_deref()),
                    topic_significance.as_str(),
                ])?;
                rows.denormalised += 1;
            }
        }

        for company in &focus {
            self.companies.write_record([
                core.id,
                core.harvest_time,
                core.sentiment.as_str(),
                core.reach.as_str(),
                company.company.id.as_str(),
                text(company.company.name.as_deref()),
                number(company.significance).as_str(),
            ])?;
            rows.companies += 1;
        }

        for topic in &document.topics {
            self.write_topic(&core, topic)?;
            rows.topics += 1;
        }

        Ok(rows)
    }

    fn write_topic(&mut self, core: &CoreFields<'_>, topic: &TopicRelation) -> Result<(), ExportError> {
        self.topics.write_record([
            core.id,
            core.harvest_time,
            core.sentiment.as_str(),
            core.reach.as_str(),
            topic.topic.id.as_str(),
            text(topic.topic.name.as_deref()),
            number(topic.significance).as_str(),
        ])?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> [W; 4] {
        let unwrap = |w: csv::Writer<W>| match w.into_inner() {
            Ok(inner) => inner,
            Err(_) => panic!("flush failed"),
        };
        [
            unwrap(self.documents),
            unwrap(self.denormalised),
            unwrap(self.companies),
            unwrap(self.topics),
        ]
    }
}

/// Fields repeated on every row written for a document.
struct CoreFields<'a> {
    id: &'a str,
    harvest_time: &'a str,
    sentiment: String,
    reach: String,
}

impl<'a> From<&'a Document> for CoreFields<'a> {
    fn from(document: &'a Document) -> Self {
        Self {
            id: &document.id,
            harvest_time: text(document.harvest_time.as_deref()),
            sentiment: number(document.sentiment),
            reach: number(document.reach),
        }
    }
}

/// Nulls become empty fields.
fn text(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

fn number(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}
