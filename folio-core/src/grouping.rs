//! Section grouping of a chapter sequence

use crate::types::Chapter;
use serde::Serialize;

/// A contiguous run of chapters sharing the same group label
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChapterSection<'a> {
    /// `None` for an ungrouped run between labelled ones
    pub label: Option<&'a str>,
    pub chapters: Vec<&'a Chapter>,
}

/// Chapters before the first group, the grouped sections, and chapters after the last group
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChapterGrouping<'a> {
    pub before: Vec<&'a Chapter>,
    pub sections: Vec<ChapterSection<'a>>,
    pub after: Vec<&'a Chapter>,
}

impl<'a> ChapterGrouping<'a> {
    /// Chapters in their original order
    pub fn iter(&self) -> impl Iterator<Item = &'a Chapter> + '_ {
        self.before
            .iter()
            .copied()
            .chain(self.sections.iter().flat_map(|s| s.chapters.iter().copied()))
            .chain(self.after.iter().copied())
    }
}

/// Split chapters into runs by group label
///
/// An ungrouped run that sits between two groups stays in place as an
/// unlabelled section, so `iter()` always reproduces the input order.
pub fn group_chapters<'a, I>(chapters: I) -> ChapterGrouping<'a>
where
    I: IntoIterator<Item = &'a Chapter>,
{
    let mut runs: Vec<ChapterSection<'a>> = Vec::new();
    for chapter in chapters {
        let label = chapter.group.as_deref();
        match runs.last_mut() {
            Some(run) if run.label == label => run.chapters.push(chapter),
            _ => runs.push(ChapterSection {
                label,
                chapters: vec![chapter],
            }),
        }
    }

    let mut grouping = ChapterGrouping::default();
    if runs.first().map(|r| r.label.is_none()).unwrap_or(false) {
        grouping.before = runs.remove(0).chapters;
    }
    if runs.last().map(|r| r.label.is_none()).unwrap_or(false) {
        if let Some(last) = runs.pop() {
            grouping.after = last.chapters;
        }
    }
    grouping.sections = runs;
    grouping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(n: u32, group: Option<&str>) -> Chapter {
        Chapter::new(format!("c{}", n), format!("id{}", n), "text", n)
            .with_group(group.map(str::to_string))
    }

    fn names(list: &[&Chapter]) -> Vec<u32> {
        list.iter().map(|c| c.real_number).collect()
    }

    #[test]
    fn test_before_groups_after() {
        let list = vec![
            chapter(1, None),
            chapter(2, Some("Monday")),
            chapter(3, Some("Monday")),
            chapter(4, Some("Tuesday")),
            chapter(5, None),
        ];
        let grouping = group_chapters(&list);

        assert_eq!(names(&grouping.before), vec![1]);
        assert_eq!(grouping.sections.len(), 2);
        assert_eq!(grouping.sections[0].label, Some("Monday"));
        assert_eq!(names(&grouping.sections[0].chapters), vec![2, 3]);
        assert_eq!(names(&grouping.after), vec![5]);
    }

    #[test]
    fn test_ungrouped_run_between_groups_stays_in_place() {
        let list = vec![
            chapter(1, Some("Monday")),
            chapter(2, None),
            chapter(3, Some("Tuesday")),
        ];
        let grouping = group_chapters(&list);

        assert!(grouping.before.is_empty());
        assert!(grouping.after.is_empty());
        assert_eq!(grouping.sections[1].label, None);
        let order: Vec<u32> = grouping.iter().map(|c| c.real_number).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_no_groups_at_all() {
        let list = vec![chapter(1, None), chapter(2, None)];
        let grouping = group_chapters(&list);
        assert_eq!(names(&grouping.before), vec![1, 2]);
        assert!(grouping.sections.is_empty());
        assert!(grouping.after.is_empty());
    }
}
