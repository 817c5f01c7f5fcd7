// src/commands/readers.rs

use crate::error::{AppError, Result};
use crate::models::{Reader, ReaderStatus};
use crate::services::{LibraryService, search};
use crate::utils::console;

/// Field edits for `readers update`; unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ReaderChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub status: Option<ReaderStatus>,
}

impl ReaderChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone_no.is_none()
            && self.gender.is_none()
            && self.age.is_none()
            && self.status.is_none()
    }

    pub fn apply(self, current: Reader) -> Reader {
        Reader {
            reader_id: current.reader_id,
            name: self.name.unwrap_or(current.name),
            email: self.email.unwrap_or(current.email),
            phone_no: self.phone_no.unwrap_or(current.phone_no),
            gender: self.gender.unwrap_or(current.gender),
            age: self.age.unwrap_or(current.age),
            status: self.status.unwrap_or(current.status),
        }
    }
}

fn reader_row(reader: &Reader) -> Vec<String> {
    vec![
        reader.reader_id.to_string(),
        reader.name.clone(),
        reader.email.clone(),
        reader.phone_no.clone(),
        reader.gender.clone(),
        reader.age.to_string(),
        reader.status.to_string(),
    ]
}

const COLUMNS: [&str; 7] = ["ID", "Name", "Email", "Phone", "Gender", "Age", "Status"];

pub async fn run_list_readers(service: &LibraryService, term: Option<&str>) -> Result<()> {
    let mut readers = service.storage().list_readers().await?;
    readers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    let matches = search::readers(&readers, term.unwrap_or_default());

    console::header("Readers");
    let rows: Vec<Vec<String>> = matches.iter().map(|r| reader_row(r)).collect();
    console::table(&COLUMNS, &rows, "No readers found");
    console::summary(
        "Members",
        &[
            ("Shown", matches.len().to_string()),
            ("Total", readers.len().to_string()),
            (
                "Active",
                readers.iter().filter(|r| r.is_active()).count().to_string(),
            ),
        ],
    );
    Ok(())
}

pub async fn run_add_reader(service: &LibraryService, reader: Reader) -> Result<()> {
    let reader = service.add_reader(reader).await?;
    console::success(&format!(
        "Reader added: {} (id {})",
        reader.name, reader.reader_id
    ));
    Ok(())
}

pub async fn run_update_reader(service: &LibraryService, reader_id: u64, changes: ReaderChanges) -> Result<()> {
    if changes.is_empty() {
        return Err(AppError::validation("nothing to update"));
    }
    let snapshot = service.snapshot().await?;
    let current = snapshot
        .reader(reader_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Reader", reader_id))?;

    let reader = service.update_reader(reader_id, changes.apply(current)).await?;
    console::success(&format!("Reader updated: {} (id {})", reader.name, reader_id));
    if console::show_details() {
        console::table(&COLUMNS, &[reader_row(&reader)], "");
    }
    Ok(())
}

pub async fn run_delete_reader(service: &LibraryService, reader_id: u64) -> Result<()> {
    let reader = service.delete_reader(reader_id).await?;
    console::success(&format!("Reader deleted: {} (id {})", reader.name, reader_id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_never_touch_id() {
        let current = Reader {
            reader_id: 482913,
            name: "Meera".into(),
            email: "meera@example.com".into(),
            phone_no: "9876543210".into(),
            gender: "Female".into(),
            age: 31,
            status: ReaderStatus::Active,
        };
        let changes = ReaderChanges {
            status: Some(ReaderStatus::Inactive),
            ..ReaderChanges::default()
        };
        let updated = changes.apply(current);
        assert_eq!(updated.reader_id, 482913);
        assert_eq!(updated.status, ReaderStatus::Inactive);
        assert_eq!(updated.name, "Meera");
    }
}
