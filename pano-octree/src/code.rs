use crate::AxisSchedule;

/// Code entry of a level below a collapsed cell.
pub const MERGED: i8 = -1;

/// Fixed-length cell codes stored contiguously, one row per cell.
///
/// Entry `level` of a row is the child index taken at that level, with bit
/// `i` set when the cell lies on the positive side of the `i`th axis still
/// subdividing there. Trailing [`MERGED`] entries mark a cell that covers a
/// whole subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    width: usize,
    data: Vec<i8>,
}

impl CodeTable {
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "cell codes need at least one level");
        Self {
            width,
            data: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.width
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn push(&mut self, code: &[i8]) {
        assert_eq!(code.len(), self.width);
        self.data.extend_from_slice(code);
    }

    pub fn row(&self, index: usize) -> &[i8] {
        &self.data[index * self.width..(index + 1) * self.width]
    }

    fn row_mut(&mut self, index: usize) -> &mut [i8] {
        &mut self.data[index * self.width..(index + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i8]> + '_ {
        self.data.chunks_exact(self.width)
    }

    /// Removes consecutive duplicate rows.
    fn dedup(&mut self) {
        let mut kept = Vec::with_capacity(self.data.len());
        let mut previous: Option<&[i8]> = None;
        for row in self.data.chunks_exact(self.width) {
            if previous != Some(row) {
                kept.extend_from_slice(row);
                previous = Some(row);
            }
        }
        self.data = kept;
    }
}

/// Lists, in lexicographic order, every leaf of the tree that is not in
/// `occupied`. `occupied` must be sorted and free of duplicates.
pub fn empty_leaves<const D: usize>(schedule: &AxisSchedule<D>, occupied: &[Vec<i8>]) -> CodeTable {
    let depth = schedule.max_depth();
    let radices: Vec<i8> = (0..depth)
        .map(|level| schedule.branching(level) as i8)
        .collect();
    let mut table = CodeTable::new(depth);
    let mut code = vec![0i8; depth];
    let mut occupied = occupied.iter().peekable();
    loop {
        if occupied.peek().map_or(false, |row| row.as_slice() == code.as_slice()) {
            occupied.next();
        } else {
            table.push(&code);
        }

        let mut level = depth;
        loop {
            if level == 0 {
                return table;
            }
            level -= 1;
            code[level] += 1;
            if code[level] < radices[level] {
                break;
            }
            code[level] = 0;
        }
    }
}

/// Collapses complete groups of empty siblings into their parent cell.
///
/// Levels are processed from the deepest up. At level `j`, every run of rows
/// sharing the first `j` entries that is at least as large as the subtree
/// below those entries gets its entries from `j` on replaced by [`MERGED`].
/// The table must be sorted; it stays sorted and ends up without duplicates.
pub fn merge_empty<const D: usize>(table: &mut CodeTable, schedule: &AxisSchedule<D>) {
    let rows = table.len();
    for level in (1..schedule.max_depth()).rev() {
        let threshold = schedule.leaves_below(level);
        let mut start = 0;
        while start < rows {
            let mut end = start + 1;
            while end < rows && table.row(end)[..level] == table.row(start)[..level] {
                end += 1;
            }
            if (end - start) as u64 >= threshold {
                for index in start..end {
                    table.row_mut(index)[level..].fill(MERGED);
                }
            }
            start = end;
        }
    }
    table.dedup();
}
