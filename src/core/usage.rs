use std::collections::HashMap;

use super::blob::Blob;

/// How many distinct blobs reference each library, least used first.
///
/// Ties are ordered by library name so the ranking is stable.
pub fn rank_usage(blobs: &[Blob]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for blob in blobs.iter().filter(|blob| blob.is_known()) {
        for dependency in &blob.dependencies {
            *counts.entry(dependency.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranking: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(library, count)| (library.to_string(), count))
        .collect();
    ranking.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    ranking
}
