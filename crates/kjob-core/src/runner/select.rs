use std::cmp::Ordering;

use crate::{cluster::PodInfo, config::PodSelection};

/// Pick one pod out of a listing.
///
/// Returns the chosen pod and how many pods were listed, or `None` for an empty listing.
pub(crate) fn select_pod(mut pods: Vec<PodInfo>, policy: PodSelection) -> Option<(PodInfo, usize)> {
    let count = pods.len();
    let index = match policy {
        PodSelection::FirstListed => 0,
        PodSelection::EarliestCreated => pods
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| by_creation(a, b))
            .map(|(i, _)| i)?,
    };
    if index >= count {
        return None;
    }
    Some((pods.swap_remove(index), count))
}

fn by_creation(a: &PodInfo, b: &PodInfo) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}
