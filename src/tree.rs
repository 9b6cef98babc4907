//! Huffman tree and its construction.
//!
//! The tree is a plain owned structure, every branch owns its two children.
//! Construction is the classic greedy merge of the two lightest nodes, using a
//! binary heap as the priority queue.
//!
//! Ties are broken by insertion order.  The starting nodes are stably sorted by
//! weight and numbered in that order, and each new branch gets the next number.
//! So among nodes of equal weight the oldest is taken first, and a new branch
//! queues up behind every existing node of the same weight.

use std::cmp::{Ordering,Reverse};
use std::collections::{BinaryHeap,HashMap};
use std::fmt;
use crate::{Error,Symbol};

/// Node in a Huffman tree, the root node stands for the whole tree.
#[derive(Clone,Debug,PartialEq)]
pub enum Node<S> {
    Leaf {
        symbol: S,
        weight: usize
    },
    Branch {
        left: Box<Node<S>>,
        right: Box<Node<S>>,
        /// always the sum of the children's weights
        weight: usize
    }
}

impl <S: Symbol> Node<S> {
    pub fn leaf(symbol: S,weight: usize) -> Self {
        Self::Leaf { symbol, weight }
    }
    /// join two nodes, `left` will be reached with a 0, `right` with a 1
    pub fn branch(left: Node<S>,right: Node<S>) -> Self {
        let weight = left.weight() + right.weight();
        Self::Branch {
            left: Box::new(left),
            right: Box::new(right),
            weight
        }
    }
    pub fn weight(&self) -> usize {
        match self {
            Self::Leaf { weight, .. } => *weight,
            Self::Branch { weight, .. } => *weight
        }
    }
    pub fn is_leaf(&self) -> bool {
        matches!(self,Self::Leaf { .. })
    }
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Branch { left, right, .. } => left.leaf_count() + right.leaf_count()
        }
    }
    pub fn branch_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Branch { left, right, .. } => 1 + left.branch_count() + right.branch_count()
        }
    }
    /// length of the longest path from here to a leaf, which is the longest code
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Branch { left, right, .. } => 1 + usize::max(left.depth(),right.depth())
        }
    }
    /// leaf symbols in pre-order
    pub fn symbols(&self) -> Vec<S> {
        let mut ans = Vec::new();
        self.gather_symbols(&mut ans);
        ans
    }
    fn gather_symbols(&self,ans: &mut Vec<S>) {
        match self {
            Self::Leaf { symbol, .. } => ans.push(symbol.clone()),
            Self::Branch { left, right, .. } => {
                left.gather_symbols(ans);
                right.gather_symbols(ans);
            }
        }
    }
    /// Compare shape and leaf symbols, weights are ignored.
    /// Two trees with the same shape produce the same codes.
    pub fn same_shape(&self,other: &Node<S>) -> bool {
        match (self,other) {
            (Self::Leaf { symbol: a, .. },Self::Leaf { symbol: b, .. }) => a == b,
            (Self::Branch { left: l1, right: r1, .. },Self::Branch { left: l2, right: r2, .. }) => {
                l1.same_shape(l2) && r1.same_shape(r2)
            },
            _ => false
        }
    }
}

impl <S: Symbol> fmt::Display for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { symbol, weight } => write!(f,"L{}|{}",symbol.label(),weight),
            Self::Branch { weight, .. } => write!(f,"B{}",weight)
        }
    }
}

/// Entry in the priority queue, ordered so the heap pops the lightest, oldest node first.
struct Queued<S> {
    key: Reverse<(usize,usize)>,
    node: Node<S>
}

impl <S: Symbol> Queued<S> {
    fn new(node: Node<S>,seq: usize) -> Self {
        Self {
            key: Reverse((node.weight(),seq)),
            node
        }
    }
}

impl <S> PartialEq for Queued<S> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl <S> Eq for Queued<S> {}

impl <S> PartialOrd for Queued<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl <S> Ord for Queued<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Count occurrences of each distinct symbol, producing one leaf per symbol.
/// Leaves come out in order of first appearance.
pub fn count_frequencies<S: Symbol>(symbols: &[S]) -> Vec<Node<S>> {
    let mut slots: HashMap<S,usize> = HashMap::new();
    let mut counts: Vec<(S,usize)> = Vec::new();
    for symbol in symbols {
        match slots.get(symbol) {
            Some(i) => counts[*i].1 += 1,
            None => {
                slots.insert(symbol.clone(),counts.len());
                counts.push((symbol.clone(),1));
            }
        }
    }
    log::debug!("{} symbols, {} distinct",symbols.len(),counts.len());
    counts.into_iter().map(|(symbol,weight)| Node::leaf(symbol,weight)).collect()
}

/// Merge a list of nodes into a single tree, the nodes can be leaves or branches.
/// A single node is returned as is, so the tree can be a bare leaf.
pub fn build_tree_from_nodes<S: Symbol>(mut nodes: Vec<Node<S>>) -> Result<Node<S>,Error> {
    if nodes.is_empty() {
        log::error!("cannot build a tree without symbols");
        return Err(Error::InvalidInput);
    }
    nodes.sort_by_key(|node| node.weight());
    let mut seq = 0;
    let mut queue = BinaryHeap::with_capacity(nodes.len());
    for node in nodes {
        queue.push(Queued::new(node,seq));
        seq += 1;
    }
    while queue.len() > 1 {
        if let (Some(left),Some(right)) = (queue.pop(),queue.pop()) {
            log::trace!("merge {} and {}",left.node,right.node);
            queue.push(Queued::new(Node::branch(left.node,right.node),seq));
            seq += 1;
        }
    }
    match queue.pop() {
        Some(root) => Ok(root.node),
        None => Err(Error::InvalidInput)
    }
}

/// Count the symbols and build the Huffman tree
pub fn build_tree<S: Symbol>(symbols: &[S]) -> Result<Node<S>,Error> {
    let root = build_tree_from_nodes(count_frequencies(symbols))?;
    log::debug!("tree has {} leaves, depth {}",root.leaf_count(),root.depth());
    Ok(root)
}

#[cfg(test)]
fn weights_add_up<S: Symbol>(node: &Node<S>) -> bool {
    match node {
        Node::Leaf { .. } => true,
        Node::Branch { left, right, weight } => {
            *weight == left.weight() + right.weight() && weights_add_up(left) && weights_add_up(right)
        }
    }
}

#[test]
fn frequencies_in_order_of_appearance() {
    let leaves = count_frequencies(&"abracadabra".chars().collect::<Vec<char>>());
    let expected = vec![
        Node::leaf('a',5),
        Node::leaf('b',2),
        Node::leaf('r',2),
        Node::leaf('c',1),
        Node::leaf('d',1)
    ];
    assert_eq!(leaves,expected);
    assert!(count_frequencies::<char>(&[]).is_empty());
}

#[test]
fn builds_expected_tree() {
    // c and b merge first, then a (weight 3) is older than the new branch (weight 3)
    let tree = build_tree(&"aaabbc".chars().collect::<Vec<char>>()).expect("build failed");
    let expected = Node::branch(
        Node::leaf('a',3),
        Node::branch(Node::leaf('c',1),Node::leaf('b',2))
    );
    assert_eq!(tree,expected);
    assert_eq!(tree.weight(),6);
}

#[test]
fn ties_go_by_insertion_order() {
    let tree = build_tree(&"abcd".chars().collect::<Vec<char>>()).expect("build failed");
    let expected = Node::branch(
        Node::branch(Node::leaf('a',1),Node::leaf('b',1)),
        Node::branch(Node::leaf('c',1),Node::leaf('d',1))
    );
    assert_eq!(tree,expected);
}

#[test]
fn weights_and_counts() {
    let text = "I am Sam. Sam I am. I do not like this Sam I am.\n";
    let syms: Vec<char> = text.chars().collect();
    let tree = build_tree(&syms).expect("build failed");
    let distinct = count_frequencies(&syms).len();
    assert!(weights_add_up(&tree));
    assert_eq!(tree.weight(),syms.len());
    assert_eq!(tree.leaf_count(),distinct);
    assert_eq!(tree.branch_count(),distinct - 1);
}

#[test]
fn single_symbol_is_bare_leaf() {
    let tree = build_tree(&"aaaa".chars().collect::<Vec<char>>()).expect("build failed");
    assert_eq!(tree,Node::leaf('a',4));
    assert!(tree.is_leaf());
    assert_eq!(tree.depth(),0);
}

#[test]
fn empty_input_is_rejected() {
    assert_eq!(build_tree::<u8>(&[]),Err(Error::InvalidInput));
    assert_eq!(build_tree_from_nodes::<u8>(Vec::new()),Err(Error::InvalidInput));
}

#[test]
fn mixed_nodes() {
    let nodes = vec![
        Node::branch(Node::leaf(b'x',1),Node::leaf(b'y',1)),
        Node::leaf(b'z',1)
    ];
    let tree = build_tree_from_nodes(nodes).expect("build failed");
    assert_eq!(tree.weight(),3);
    assert_eq!(tree.leaf_count(),3);
    assert_eq!(tree.symbols(),vec![b'z',b'x',b'y']);
}

#[test]
fn shape_ignores_weights() {
    let a = Node::branch(Node::leaf('a',7),Node::leaf('b',3));
    let b = Node::branch(Node::leaf('a',1),Node::leaf('b',1));
    let c = Node::branch(Node::leaf('b',1),Node::leaf('a',1));
    assert!(a.same_shape(&b));
    assert!(!a.same_shape(&c));
    assert!(!a.same_shape(&Node::leaf('a',10)));
}
