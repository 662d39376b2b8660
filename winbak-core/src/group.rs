use std::collections::HashMap;

use crate::domain::StagedFragment;
use crate::path::RelPath;

/// Fragments of one destination file, in concatenation order.
#[derive(Clone, Debug)]
pub struct MergeGroup {
    pub key: String,
    /// Destination taken from the first fragment.
    pub rel: RelPath,
    pub fragments: Vec<StagedFragment>,
}

impl MergeGroup {
    pub fn part_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.fragments.iter().map(|f| f.size).sum()
    }
}

/// Group by case-insensitive relative path. Groups come out in order of first
/// appearance; fragments within a group by sequence index only.
pub fn group_fragments(fragments: Vec<StagedFragment>) -> Vec<MergeGroup> {
    let mut groups: Vec<MergeGroup> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for frag in fragments {
        let key = frag.rel.key();
        match by_key.get(&key) {
            Some(&i) => groups[i].fragments.push(frag),
            None => {
                by_key.insert(key.clone(), groups.len());
                groups.push(MergeGroup {
                    key,
                    rel: frag.rel.clone(),
                    fragments: vec![frag],
                });
            }
        }
    }

    for g in &mut groups {
        // stable: equal indices keep discovery order
        g.fragments.sort_by_key(|f| f.index);
        g.rel = g.fragments[0].rel.clone();
    }
    groups
}
