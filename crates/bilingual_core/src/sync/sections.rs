//! Sync-point parsing and section construction.

use crate::models::{Section, SyncPoint};

use super::{SyncError, SyncResult};

/// Parse `"<baseIndex>:<targetIndex>"` strings in the order given.
pub fn parse_sync_points<S: AsRef<str>>(raw: &[S]) -> SyncResult<Vec<SyncPoint>> {
    raw.iter()
        .map(|s| s.as_ref().parse::<SyncPoint>().map_err(SyncError::from))
        .collect()
}

/// Build the sections bounded by `anchors`.
///
/// Each anchor closes a section just after the two named clips; one more
/// section runs from the last anchor to the end of both sequences. Returns
/// `None` for no anchors, meaning the whole input is a single section.
///
/// Anchors are taken in the order given. Any anchor that would produce an
/// empty or inverted range (repeated, decreasing, or past the end) fails
/// the whole call.
pub fn build_sections(
    anchors: &[SyncPoint],
    base_len: usize,
    target_len: usize,
) -> SyncResult<Option<Vec<Section>>> {
    if anchors.is_empty() {
        return Ok(None);
    }

    let mut sections = Vec::with_capacity(anchors.len() + 1);
    let mut base_start = 0;
    let mut target_start = 0;

    for (index, anchor) in anchors.iter().enumerate() {
        let (Some(base_end), Some(target_end)) =
            (anchor.base.checked_add(1), anchor.target.checked_add(1))
        else {
            return Err(SyncError::InvalidSection {
                index,
                section: Section::new(base_start..base_len, target_start..target_len),
                reason: format!("sync point {} is past the end of a track", anchor),
            });
        };
        let section = Section::new(base_start..base_end, target_start..target_end);
        check_section(index, &section, Some(*anchor))?;
        base_start = section.base_end;
        target_start = section.target_end;
        sections.push(section);
    }

    let tail = Section::new(base_start..base_len, target_start..target_len);
    check_section(anchors.len(), &tail, None)?;
    sections.push(tail);

    for section in &sections {
        tracing::debug!("Section {}", section);
    }

    Ok(Some(sections))
}

fn check_section(index: usize, section: &Section, anchor: Option<SyncPoint>) -> SyncResult<()> {
    if section.is_valid() {
        return Ok(());
    }
    let reason = match anchor {
        Some(anchor) => format!("sync point {} does not advance past the previous one", anchor),
        None => "last sync point reaches or passes the end of a track".to_string(),
    };
    Err(SyncError::InvalidSection {
        index,
        section: section.clone(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[&str]) -> Vec<SyncPoint> {
        parse_sync_points(raw).unwrap()
    }

    #[test]
    fn no_anchors_means_no_sections() {
        assert_eq!(build_sections(&[], 183, 373).unwrap(), None);
    }

    #[test]
    fn two_anchors_make_three_sections() {
        let sections = build_sections(&points(&["4:16", "51:101"]), 183, 373)
            .unwrap()
            .unwrap();

        assert_eq!(
            sections,
            vec![
                Section::new(0..5, 0..17),
                Section::new(5..52, 17..102),
                Section::new(52..183, 102..373),
            ]
        );
    }

    #[test]
    fn single_anchor_makes_two_sections() {
        let sections = build_sections(&points(&["4:16"]), 183, 373).unwrap().unwrap();
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn sections_cover_both_tracks_contiguously() {
        let anchors = points(&["4:16", "51:101", "99:212", "140:297"]);
        let sections = build_sections(&anchors, 183, 373).unwrap().unwrap();

        assert_eq!(sections.len(), anchors.len() + 1);
        assert_eq!((sections[0].base_start, sections[0].target_start), (0, 0));
        let last = sections.last().unwrap();
        assert_eq!((last.base_end, last.target_end), (183, 373));
        for pair in sections.windows(2) {
            assert_eq!(pair[0].base_end, pair[1].base_start);
            assert_eq!(pair[0].target_end, pair[1].target_start);
        }
    }

    #[test]
    fn repeated_anchor_is_fatal() {
        let err = build_sections(&points(&["4:16", "4:20"]), 183, 373).unwrap_err();
        match err {
            SyncError::InvalidSection { index, section, .. } => {
                assert_eq!(index, 1);
                assert_eq!(section.base_range(), 5..5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decreasing_target_index_is_fatal() {
        let err = build_sections(&points(&["4:16", "10:12"]), 183, 373).unwrap_err();
        assert!(matches!(err, SyncError::InvalidSection { index: 1, .. }));
    }

    #[test]
    fn anchor_at_track_end_leaves_empty_tail() {
        let err = build_sections(&points(&["182:100"]), 183, 373).unwrap_err();
        assert!(matches!(err, SyncError::InvalidSection { index: 1, .. }));
    }

    #[test]
    fn largest_index_is_rejected_not_overflowed() {
        let err = build_sections(&points(&["18446744073709551615:3"]), 10, 10).unwrap_err();
        match err {
            SyncError::InvalidSection { index, reason, .. } => {
                assert_eq!(index, 0);
                assert!(reason.contains("past the end"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_sync_point_is_fatal() {
        let err = parse_sync_points(&["4:16", "51-101"]).unwrap_err();
        match err {
            SyncError::ParseSyncPoint(inner) => assert_eq!(inner.input, "51-101"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
