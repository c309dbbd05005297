use nalgebra::Point3;
use std::cmp::Ordering;

/// Atom payload stored in a [`RotamerTrie`].
pub trait TrieAtom: Clone + PartialEq {
    fn position(&self) -> &Point3<f64>;

    /// Total order used to sort descriptors before assembly; atoms that are
    /// `==` must compare equal.
    fn trie_cmp(&self, other: &Self) -> Ordering;
}

/// The ordered atoms of one rotamer, each with its count-pair data.
#[derive(Debug, Clone, PartialEq)]
pub struct RotamerDescriptor<A, C> {
    pub atoms: Vec<(A, C)>,
    pub rotamer: usize,
}

impl<A, C> RotamerDescriptor<A, C> {
    pub fn new(rotamer: usize) -> Self {
        Self {
            atoms: Vec::new(),
            rotamer,
        }
    }

    pub fn push(&mut self, atom: A, count_pair: C) {
        self.atoms.push((atom, count_pair));
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrieNode<A, C> {
    pub atom: A,
    pub count_pair: C,
    /// Zero-based depth; roots have depth 0.
    pub depth: usize,
    /// One past the last node of this node's subtree (preorder).
    pub subtree_end: usize,
    /// Rotamers whose descriptor ends at this node.
    pub terminal_rotamers: Vec<usize>,
    /// Largest distance from this atom to any atom in its subtree.
    pub subtree_radius: f64,
}

/// A prefix tree over rotamer descriptors, stored in depth-first preorder.
///
/// Rotamers sharing their leading atoms (typically the backbone) share the
/// corresponding nodes, so interactions of those atoms are evaluated once.
#[derive(Debug, Clone, PartialEq)]
pub struct RotamerTrie<A, C> {
    nodes: Vec<TrieNode<A, C>>,
    num_rotamers: usize,
    max_depth: usize,
}

impl<A, C> RotamerTrie<A, C>
where
    A: TrieAtom,
    C: Clone + PartialEq,
{
    /// Builds a trie from descriptors of rotamers `0..descriptors.len()`.
    ///
    /// Every descriptor must contain at least one atom and rotamer ids must be
    /// distinct and below `descriptors.len()`.
    pub fn build(mut descriptors: Vec<RotamerDescriptor<A, C>>) -> Self {
        let num_rotamers = descriptors.len();
        debug_assert!(descriptors.iter().all(|d| !d.is_empty()));
        debug_assert!(descriptors.iter().all(|d| d.rotamer < num_rotamers));

        descriptors.sort_by(|a, b| compare_descriptors(a, b));

        let mut nodes: Vec<TrieNode<A, C>> = Vec::new();
        let mut path: Vec<usize> = Vec::new();
        let mut previous: Option<&RotamerDescriptor<A, C>> = None;

        for descriptor in &descriptors {
            let shared = previous.map_or(0, |prev| common_prefix(prev, descriptor));
            path.truncate(shared);
            for (depth, (atom, cp)) in descriptor.atoms.iter().enumerate().skip(shared) {
                path.push(nodes.len());
                nodes.push(TrieNode {
                    atom: atom.clone(),
                    count_pair: cp.clone(),
                    depth,
                    subtree_end: 0,
                    terminal_rotamers: Vec::new(),
                    subtree_radius: 0.0,
                });
            }
            if let Some(&last) = path.last() {
                nodes[last].terminal_rotamers.push(descriptor.rotamer);
            }
            previous = Some(descriptor);
        }

        // Close subtrees: a node's subtree ends at the next node that is not deeper.
        let mut open: Vec<usize> = Vec::new();
        for i in 0..nodes.len() {
            while let Some(&top) = open.last() {
                if nodes[top].depth >= nodes[i].depth {
                    nodes[top].subtree_end = i;
                    open.pop();
                } else {
                    break;
                }
            }
            open.push(i);
        }
        let len = nodes.len();
        for top in open {
            nodes[top].subtree_end = len;
        }

        for i in 0..nodes.len() {
            let center = *nodes[i].atom.position();
            nodes[i].subtree_radius = nodes[i + 1..nodes[i].subtree_end]
                .iter()
                .map(|n| nalgebra::distance(&center, n.atom.position()))
                .fold(0.0, f64::max);
        }

        let max_depth = nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0);
        Self {
            nodes,
            num_rotamers,
            max_depth,
        }
    }

    #[inline]
    pub fn nodes(&self) -> &[TrieNode<A, C>] {
        &self.nodes
    }

    #[inline]
    pub fn num_rotamers(&self) -> usize {
        self.num_rotamers
    }

    /// Number of levels in the deepest path.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

fn compare_descriptors<A: TrieAtom, C>(
    a: &RotamerDescriptor<A, C>,
    b: &RotamerDescriptor<A, C>,
) -> Ordering {
    for ((atom_a, _), (atom_b, _)) in a.atoms.iter().zip(b.atoms.iter()) {
        match atom_a.trie_cmp(atom_b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.atoms
        .len()
        .cmp(&b.atoms.len())
        .then(a.rotamer.cmp(&b.rotamer))
}

fn common_prefix<A: PartialEq, C: PartialEq>(
    a: &RotamerDescriptor<A, C>,
    b: &RotamerDescriptor<A, C>,
) -> usize {
    a.atoms
        .iter()
        .zip(b.atoms.iter())
        .take_while(|(x, y)| x == y)
        .count()
}
