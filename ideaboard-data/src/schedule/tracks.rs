//! Fold a legacy phase list into the overall/vendor/client tracks.

use super::actor::{classify, Role};
use super::view::{TaskDetail, Track, TrackItem, TrackKind};
use crate::types::RawPhase;

pub const OVERALL_TRACK_NAME: &str = "全体スケジュール";
pub const VENDOR_TRACK_NAME: &str = "ベンダー（導入）";
pub const CLIENT_TRACK_NAME: &str = "企業側(人事・情シス)";

const LABEL_SEPARATOR: &str = " / ";

/// Label of the phase at 1-based `unit`: `phase`, else `month`, else `Phase {unit}`.
pub fn phase_label(phase: &RawPhase, unit: u32) -> String {
    phase
        .phase
        .as_deref()
        .filter(|p| !p.is_empty())
        .or_else(|| phase.month.as_deref().filter(|m| !m.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Phase {}", unit))
}

fn empty_track(name: &str, kind: TrackKind) -> Track {
    Track {
        name: name.to_string(),
        kind: Some(kind),
        items: Vec::new(),
        source: None,
    }
}

/// Build the three fixed tracks and the flattened task table.
///
/// Tracks come back in the order overall, vendor, client. Vendor and client
/// tracks are sparse: a phase with no task for that party adds no item.
/// Tasks classified `Both` or `Unknown` appear only in the task table.
pub fn build_tracks(phases: &[RawPhase]) -> (Vec<Track>, Vec<TaskDetail>) {
    let mut overall = empty_track(OVERALL_TRACK_NAME, TrackKind::Overall);
    let mut vendor = empty_track(VENDOR_TRACK_NAME, TrackKind::Vendor);
    let mut client = empty_track(CLIENT_TRACK_NAME, TrackKind::Client);
    let mut tasks = Vec::new();

    for (index, phase) in phases.iter().enumerate() {
        let unit = index as u32 + 1;
        let label = phase_label(phase, unit);

        overall.items.push(TrackItem::single(label.clone(), unit));

        let mut vendor_names: Vec<&str> = Vec::new();
        let mut client_names: Vec<&str> = Vec::new();

        for task in &phase.tasks {
            let role = classify(task);

            tasks.push(TaskDetail {
                name: task.name.clone(),
                phase_label: label.clone(),
                actor_role: role,
                duration: task.duration.clone().unwrap_or_default(),
                dependency: task.dependency.clone().unwrap_or_default(),
                source: None,
            });

            match role {
                Role::Vendor => vendor_names.push(&task.name),
                Role::Client => client_names.push(&task.name),
                Role::Both | Role::Unknown => {}
            }
        }

        if !vendor_names.is_empty() {
            vendor
                .items
                .push(TrackItem::single(vendor_names.join(LABEL_SEPARATOR), unit));
        }
        if !client_names.is_empty() {
            client
                .items
                .push(TrackItem::single(client_names.join(LABEL_SEPARATOR), unit));
        }
    }

    (vec![overall, vendor, client], tasks)
}
