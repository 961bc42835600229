//! Editions and the file attachments hanging off them.

use serde::{Deserialize, Serialize};

/// Root under which legacy attachment files were served.
pub const ATTACHMENT_UPLOAD_ROOT: &str = "/government/uploads/system/uploads/attachment_data/file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditionState {
    Draft,
    Submitted,
    Scheduled,
    Published,
    Superseded,
    Withdrawn,
    Archived,
    Unpublished,
}

impl EditionState {
    /// Whether content in this state is served on the public site.
    pub fn is_publicly_visible(self) -> bool {
        matches!(self, EditionState::Published | EditionState::Withdrawn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditionKind {
    NewsArticle,
    Publication,
    Consultation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub attachment_data_id: u64,
    pub filename: String,
}

impl FileAttachment {
    pub fn new(attachment_data_id: u64, filename: impl Into<String>) -> Self {
        Self {
            attachment_data_id,
            filename: filename.into(),
        }
    }

    fn directory(&self) -> String {
        format!("{ATTACHMENT_UPLOAD_ROOT}/{}", self.attachment_data_id)
    }

    pub fn legacy_url_path(&self) -> String {
        format!("{}/{}", self.directory(), self.filename)
    }

    /// PDFs get a generated PNG thumbnail next to the file.
    pub fn has_thumbnail(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".pdf")
    }

    pub fn thumbnail_legacy_url_path(&self) -> Option<String> {
        self.has_thumbnail()
            .then(|| format!("{}/thumbnail_{}.png", self.directory(), self.filename))
    }

    /// Every asset path backing this attachment: the file, then its thumbnail.
    pub fn asset_paths(&self) -> Vec<String> {
        std::iter::once(self.legacy_url_path())
            .chain(self.thumbnail_legacy_url_path())
            .collect()
    }
}

/// Outcome or public feedback of a consultation. Carries its own attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationResponse {
    pub summary: String,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    pub id: u64,
    pub kind: EditionKind,
    pub state: EditionState,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
    #[serde(default)]
    pub outcome: Option<ConsultationResponse>,
    #[serde(default)]
    pub public_feedback: Option<ConsultationResponse>,
}

impl Edition {
    pub fn new(id: u64, kind: EditionKind, state: EditionState) -> Self {
        Self {
            id,
            kind,
            state,
            attachments: Vec::new(),
            outcome: None,
            public_feedback: None,
        }
    }

    /// The edition's own attachments followed by those of its consultation responses.
    pub fn all_attachments(&self) -> impl Iterator<Item = &FileAttachment> {
        self.attachments.iter().chain(
            self.outcome
                .iter()
                .chain(self.public_feedback.iter())
                .flat_map(|response| response.attachments.iter()),
        )
    }
}

/// A non-editioned group page; its attachments are public as soon as they are added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_attachments_have_a_thumbnail_path() {
        let attachment = FileAttachment::new(42, "whitepaper.pdf");
        assert_eq!(
            attachment.asset_paths(),
            vec![
                "/government/uploads/system/uploads/attachment_data/file/42/whitepaper.pdf",
                "/government/uploads/system/uploads/attachment_data/file/42/thumbnail_whitepaper.pdf.png",
            ]
        );
    }

    #[test]
    fn other_attachments_have_no_thumbnail() {
        let attachment = FileAttachment::new(7, "data.csv");
        assert_eq!(attachment.thumbnail_legacy_url_path(), None);
        assert_eq!(attachment.asset_paths().len(), 1);
    }

    #[test]
    fn all_attachments_include_consultation_responses() {
        let mut edition = Edition::new(1, EditionKind::Consultation, EditionState::Draft);
        edition.attachments.push(FileAttachment::new(1, "a.pdf"));
        edition.outcome = Some(ConsultationResponse {
            summary: "Outcome".into(),
            attachments: vec![FileAttachment::new(2, "b.pdf")],
        });
        edition.public_feedback = Some(ConsultationResponse {
            summary: "Feedback".into(),
            attachments: vec![FileAttachment::new(3, "c.pdf")],
        });

        let ids: Vec<u64> = edition.all_attachments().map(|a| a.attachment_data_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
