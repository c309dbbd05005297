use super::rotamer_trie::{RotamerTrie, TrieAtom, TrieNode};

/// Decides whether the interaction between two atoms is counted.
pub trait CountPairFunction<C> {
    fn count(&self, first: &C, second: &C) -> bool;
}

/// Energy between two trie atoms, with the distance beyond which it vanishes.
pub trait TrieEvaluator<A> {
    fn cutoff(&self) -> f64;

    /// Energy of `first` (from the first trie) against `second`.
    fn pair_energy(&self, first: &A, second: &A) -> f64;
}

/// Fills `row[j]` with the energy of `atom` against every atom on the path from
/// the root of `trie` down to node `j`.
fn path_energies<A, C, P, E>(
    atom: &TrieNode<A, C>,
    trie: &RotamerTrie<A, C>,
    count_pair: &P,
    evaluator: &E,
    row: &mut [f64],
    depth_sums: &mut [f64],
) where
    A: TrieAtom,
    C: Clone + PartialEq,
    P: CountPairFunction<C>,
    E: TrieEvaluator<A>,
{
    let cutoff = evaluator.cutoff();
    let nodes = trie.nodes();
    let mut j = 0;
    while j < nodes.len() {
        let node = &nodes[j];
        let parent = if node.depth == 0 {
            0.0
        } else {
            depth_sums[node.depth - 1]
        };
        let reach = cutoff + node.subtree_radius;
        if nalgebra::distance_squared(atom.atom.position(), node.atom.position()) > reach * reach {
            // Nothing in this subtree is in range of `atom`.
            row[j..node.subtree_end].fill(parent);
            j = node.subtree_end;
            continue;
        }
        let energy = if count_pair.count(&atom.count_pair, &node.count_pair) {
            evaluator.pair_energy(&atom.atom, &node.atom)
        } else {
            0.0
        };
        row[j] = parent + energy;
        depth_sums[node.depth] = row[j];
        j += 1;
    }
}

/// Energies of every rotamer of `first` against every rotamer of `second`.
///
/// Returns `table[r1][r2]`, the sum over all atom pairs of the two rotamers.
/// Energies of shared prefixes are computed once and propagated down both
/// tries.
pub fn trie_vs_trie<A, C, P, E>(
    first: &RotamerTrie<A, C>,
    second: &RotamerTrie<A, C>,
    count_pair: &P,
    evaluator: &E,
) -> Vec<Vec<f64>>
where
    A: TrieAtom,
    C: Clone + PartialEq,
    P: CountPairFunction<C>,
    E: TrieEvaluator<A>,
{
    let n2 = second.nodes().len();
    let mut table = vec![vec![0.0; second.num_rotamers()]; first.num_rotamers()];
    let second_terminals: Vec<usize> = second
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, n)| !n.terminal_rotamers.is_empty())
        .map(|(j, _)| j)
        .collect();

    // sums[d][j]: energy of the first-trie path down to depth d against the
    // second-trie path down to node j.
    let mut sums = vec![vec![0.0; n2]; first.max_depth()];
    let mut row = vec![0.0; n2];
    let mut depth_sums = vec![0.0; second.max_depth()];

    for node in first.nodes() {
        path_energies(node, second, count_pair, evaluator, &mut row, &mut depth_sums);
        let d = node.depth;
        if d == 0 {
            sums[0].copy_from_slice(&row);
        } else {
            let (above, below) = sums.split_at_mut(d);
            for ((out, parent), r) in below[0].iter_mut().zip(&above[d - 1]).zip(&row) {
                *out = parent + r;
            }
        }

        for &r1 in &node.terminal_rotamers {
            for &j in &second_terminals {
                for &r2 in &second.nodes()[j].terminal_rotamers {
                    table[r1][r2] = sums[d][j];
                }
            }
        }
    }
    table
}

/// Energies of every rotamer of `first` against the single rotamer of `path`.
pub fn trie_vs_path<A, C, P, E>(
    first: &RotamerTrie<A, C>,
    path: &RotamerTrie<A, C>,
    count_pair: &P,
    evaluator: &E,
) -> Vec<f64>
where
    A: TrieAtom,
    C: Clone + PartialEq,
    P: CountPairFunction<C>,
    E: TrieEvaluator<A>,
{
    debug_assert_eq!(path.num_rotamers(), 1);
    let mut energies = vec![0.0; first.num_rotamers()];
    let Some(path_end) = path
        .nodes()
        .iter()
        .position(|n| !n.terminal_rotamers.is_empty())
    else {
        return energies;
    };

    let mut row = vec![0.0; path.nodes().len()];
    let mut depth_sums = vec![0.0; path.max_depth()];
    let mut sums = vec![0.0; first.max_depth()];

    for node in first.nodes() {
        path_energies(node, path, count_pair, evaluator, &mut row, &mut depth_sums);
        let d = node.depth;
        let parent = if d == 0 { 0.0 } else { sums[d - 1] };
        sums[d] = parent + row[path_end];
        for &r1 in &node.terminal_rotamers {
            energies[r1] = sums[d];
        }
    }
    energies
}
