use crate::ring::identity::{AddressScheme, NodeId};
use crate::ring::membership::ring_distance;

use std::net::Ipv4Addr;

/// Chooses which candidate neighbors are closer than the current ones.
///
/// Distances are measured on the ring formed by `known` members plus this node, the
/// current neighbors and the candidates, so a node discovered moments ago already
/// counts. Rules by (current, candidates) count:
///
/// | current | candidates | adopt candidate when                                    |
/// |---------|------------|---------------------------------------------------------|
/// | 2       | 1          | closer than some current, or tied with a different one  |
/// | 2       | 2          | closer than the current neighbor at the same position   |
/// | 1       | 1          | it is a different address                               |
/// | 1       | 2          | closer than the current, or tied and a different one    |
///
/// A candidate that already is a current neighbor never comes back.
pub fn select_back_neighbors(
    scheme: AddressScheme,
    self_id: NodeId,
    current: &[Ipv4Addr],
    candidates: &[Ipv4Addr],
    known: &[NodeId],
) -> Vec<Ipv4Addr> {
    let mut ring: Vec<NodeId> = known
        .iter()
        .copied()
        .chain(std::iter::once(self_id))
        .chain(current.iter().chain(candidates).filter_map(|&a| scheme.node_id(a)))
        .collect();
    ring.sort();
    ring.dedup();

    let distance = |addr: Ipv4Addr| {
        scheme
            .node_id(addr)
            .and_then(|id| ring_distance(&ring, self_id, id))
            .unwrap_or(usize::MAX)
    };
    let current_dist: Vec<usize> = current.iter().map(|&a| distance(a)).collect();
    let candidate_dist: Vec<usize> = candidates.iter().map(|&a| distance(a)).collect();

    let adopted: Vec<Ipv4Addr> = match (current.len(), candidates.len()) {
        (2, 1) => {
            let (cand, cand_dist) = (candidates[0], candidate_dist[0]);
            let closer_or_tied = current.iter().zip(&current_dist).any(|(&cur, &cur_dist)| {
                cand_dist < cur_dist || (cand_dist == cur_dist && cand != cur)
            });
            if closer_or_tied { vec![cand] } else { vec![] }
        }
        (2, 2) => candidates
            .iter()
            .zip(&candidate_dist)
            .zip(&current_dist)
            .filter(|((_, cand_dist), cur_dist)| cand_dist < cur_dist)
            .map(|((&cand, _), _)| cand)
            .collect(),
        (1, 1) => {
            if candidates[0] != current[0] {
                vec![candidates[0]]
            } else {
                vec![]
            }
        }
        (1, 2) => candidates
            .iter()
            .zip(&candidate_dist)
            .filter(|&(&cand, &cand_dist)| {
                cand_dist < current_dist[0] || (cand_dist == current_dist[0] && cand != current[0])
            })
            .map(|(&cand, _)| cand)
            .collect(),
        _ => vec![],
    };

    adopted
        .into_iter()
        .filter(|cand| !current.contains(cand))
        .collect()
}
