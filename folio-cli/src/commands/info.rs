//! Info command implementation

use anyhow::Result;
use folio_core::{format_char_count, Chapter, ChapterSection, FolioConfig, ReadingSession};
use std::path::Path;

/// Print the numbered chapter list of an EPUB
pub async fn info(input: &Path, json: bool, config: &FolioConfig) -> Result<()> {
    let session = super::open_session(input, config).await?;

    if json {
        let info = session.book_info(|_| false);
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let book = session.book();
    let map = session.display_map();
    println!("{}", book.display_title());
    println!(
        "{} of {} chapters visible (threshold {})",
        map.len(),
        book.chapters.len(),
        map.threshold()
    );

    let grouping = session.grouping();
    print_columns(&session, &grouping.before);
    for section in &grouping.sections {
        print_section(&session, section);
    }
    print_columns(&session, &grouping.after);

    Ok(())
}

fn print_section(session: &ReadingSession, section: &ChapterSection<'_>) {
    println!();
    if let Some(label) = section.label {
        println!("== {} ==", label);
    }
    print_columns(session, &section.chapters);
}

/// Two-column listing, filled row by row
fn print_columns(session: &ReadingSession, chapters: &[&Chapter]) {
    if chapters.is_empty() {
        return;
    }
    let cells: Vec<String> = chapters.iter().map(|c| cell(session, c)).collect();
    let width = cells.iter().map(|c| c.chars().count()).max().unwrap_or(0);

    for row in cells.chunks(2) {
        match row {
            [left, right] => println!("{:<width$}    {}", left, right, width = width),
            [left] => println!("{}", left),
            _ => {}
        }
    }
}

fn cell(session: &ReadingSession, chapter: &Chapter) -> String {
    let display = session
        .display_map()
        .real_to_display(chapter.real_number)
        .unwrap_or_default();
    format!(
        "[{:02}] {} — {}",
        display,
        format_char_count(chapter.content_length),
        chapter.name
    )
}
