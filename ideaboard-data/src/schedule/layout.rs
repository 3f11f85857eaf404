//! Map time units and tracks onto grid coordinates.
//!
//! The grid is 1-indexed in both directions. Row 1 holds the time-unit
//! headers and column 1 holds the track labels, so time unit `k` lives in
//! column `k + 1` and the track at position `i` lives in row `i + 2`.
//! Column ranges are half-open: `col_end` is one past the last occupied column.

use serde::Serialize;

use super::view::{NormalizedSchedule, TrackItem, TrackKind};

pub const HEADER_ROW: u32 = 1;
pub const LABEL_COLUMN: u32 = 1;
pub const CORNER_LABEL: &str = "担当 / フェーズ";

/// Row and half-open column range of a grid element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpan {
    pub row_index: u32,
    pub col_start: u32,
    pub col_end: u32,
}

impl GridSpan {
    /// Number of columns covered.
    pub fn width(&self) -> u32 {
        self.col_end.saturating_sub(self.col_start)
    }
}

pub fn column_for_unit(unit: u32) -> u32 {
    unit.saturating_add(1)
}

pub fn row_for_track(track_index: usize) -> u32 {
    (track_index as u32).saturating_add(2)
}

/// Grid position of `item` on the track at `track_index` (0-based).
pub fn to_grid_span(item: &TrackItem, track_index: usize) -> GridSpan {
    GridSpan {
        row_index: row_for_track(track_index),
        col_start: column_for_unit(item.start_unit),
        col_end: item.end_unit.saturating_add(2),
    }
}

/// A labelled cell: header, track label, or bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub label: String,
    pub span: GridSpan,
}

/// Dimensions of a timeline with `duration_count` units and `track_count` tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineGrid {
    duration_count: u32,
    track_count: usize,
}

impl TimelineGrid {
    pub fn new(duration_count: u32, track_count: usize) -> Self {
        Self {
            duration_count,
            track_count,
        }
    }

    /// Label column plus one column per time unit.
    pub fn column_count(&self) -> u32 {
        self.duration_count.saturating_add(1)
    }

    /// Header row plus one row per track.
    pub fn row_count(&self) -> u32 {
        (self.track_count as u32).saturating_add(1)
    }

    /// Corner cell followed by a `Month {k}` cell for every unit.
    pub fn header_cells(&self) -> Vec<GridCell> {
        let corner = GridCell {
            label: CORNER_LABEL.to_string(),
            span: GridSpan {
                row_index: HEADER_ROW,
                col_start: LABEL_COLUMN,
                col_end: LABEL_COLUMN + 1,
            },
        };

        std::iter::once(corner)
            .chain((1..=self.duration_count).map(|unit| GridCell {
                label: format!("Month {}", unit),
                span: GridSpan {
                    row_index: HEADER_ROW,
                    col_start: column_for_unit(unit),
                    col_end: column_for_unit(unit) + 1,
                },
            }))
            .collect()
    }

    pub fn label_span(&self, track_index: usize) -> GridSpan {
        GridSpan {
            row_index: row_for_track(track_index),
            col_start: LABEL_COLUMN,
            col_end: LABEL_COLUMN + 1,
        }
    }

    /// One single-column cell per time unit on the track's row.
    pub fn background_spans(&self, track_index: usize) -> Vec<GridSpan> {
        let row_index = row_for_track(track_index);
        (1..=self.duration_count)
            .map(|unit| GridSpan {
                row_index,
                col_start: column_for_unit(unit),
                col_end: column_for_unit(unit) + 1,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBar {
    pub label: String,
    pub kind: TrackKind,
    pub span: GridSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    pub label: GridCell,
    pub kind: TrackKind,
    pub background: Vec<GridSpan>,
    pub bars: Vec<TimelineBar>,
}

/// Every element of a rendered timeline with its grid position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineLayout {
    pub columns: u32,
    pub rows: u32,
    pub header: Vec<GridCell>,
    pub tracks: Vec<TimelineRow>,
}

impl TimelineLayout {
    /// Lay out `schedule`. Tracks without a kind take it from their position,
    /// so pre-built and phase-list schedules are placed the same way.
    pub fn from_schedule(schedule: &NormalizedSchedule) -> Self {
        let grid = TimelineGrid::new(schedule.duration_count, schedule.tracks.len());

        let tracks = schedule
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let kind = track.kind.unwrap_or_else(|| TrackKind::for_index(index));
                TimelineRow {
                    label: GridCell {
                        label: track.name.clone(),
                        span: grid.label_span(index),
                    },
                    kind,
                    background: grid.background_spans(index),
                    bars: track
                        .items
                        .iter()
                        .map(|item| TimelineBar {
                            label: item.label.clone(),
                            kind,
                            span: to_grid_span(item, index),
                        })
                        .collect(),
                }
            })
            .collect();

        TimelineLayout {
            columns: grid.column_count(),
            rows: grid.row_count(),
            header: grid.header_cells(),
            tracks,
        }
    }
}
