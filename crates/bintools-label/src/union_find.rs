use bintools_core::Label;

/// Disjoint sets over provisional labels `1..=len`.
///
/// Slot 0 is reserved for the background and never joins a set. Unions
/// link the larger root under the smaller one, so every root is the
/// smallest label of its set.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<Label>,
}

impl Default for DisjointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DisjointSet {
    pub fn new() -> Self {
        Self { parent: vec![0] }
    }

    /// `len` singleton sets labelled `1..=len`.
    pub fn with_len(len: usize) -> Self {
        Self {
            parent: (0..=len as Label).collect(),
        }
    }

    /// Number of labels handed out so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Open a new singleton set, or `None` once the label space is used up.
    pub fn make_set(&mut self) -> Option<Label> {
        let id = Label::try_from(self.parent.len()).ok()?;
        if id == Label::MAX {
            return None;
        }
        self.parent.push(id);
        Some(id)
    }

    /// Root of `x`, halving the path on the way.
    pub fn find(&mut self, mut x: Label) -> Label {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    /// Merge the sets of `a` and `b`; returns the surviving (smaller) root.
    pub fn union(&mut self, a: Label, b: Label) -> Label {
        let ra = self.find(a);
        let rb = self.find(b);
        let (lo, hi) = if ra <= rb { (ra, rb) } else { (rb, ra) };
        self.parent[hi as usize] = lo;
        lo
    }
}
