//! TTree, TBranch and TLeaf metadata.

/// Leaf element type (maps to ROOT TLeaf class names).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafType {
    /// `TLeafF`
    F32,
    /// `TLeafD`
    F64,
    /// `TLeafI`
    I32,
    /// `TLeafI` with `fIsUnsigned`
    U32,
    /// `TLeafL`
    I64,
    /// `TLeafS`
    I16,
    /// `TLeafB`
    I8,
    /// `TLeafO`
    Bool,
}

impl LeafType {
    /// Map a TLeaf class name, honouring the unsigned flag for integer leaves.
    pub fn from_class(class_name: &str, unsigned: bool) -> Option<Self> {
        Some(match class_name {
            "TLeafF" => LeafType::F32,
            "TLeafD" => LeafType::F64,
            "TLeafI" if unsigned => LeafType::U32,
            "TLeafI" => LeafType::I32,
            "TLeafL" => LeafType::I64,
            "TLeafS" => LeafType::I16,
            "TLeafB" => LeafType::I8,
            "TLeafO" => LeafType::Bool,
            _ => return None,
        })
    }

    /// ROOT class name of a leaf holding this type.
    pub fn class_name(self) -> &'static str {
        match self {
            LeafType::F32 => "TLeafF",
            LeafType::F64 => "TLeafD",
            LeafType::I32 | LeafType::U32 => "TLeafI",
            LeafType::I64 => "TLeafL",
            LeafType::I16 => "TLeafS",
            LeafType::I8 => "TLeafB",
            LeafType::Bool => "TLeafO",
        }
    }

    /// Size in bytes of one element.
    pub fn byte_size(self) -> usize {
        match self {
            LeafType::F32 | LeafType::I32 | LeafType::U32 => 4,
            LeafType::F64 | LeafType::I64 => 8,
            LeafType::I16 => 2,
            LeafType::I8 | LeafType::Bool => 1,
        }
    }

    /// Decode one big-endian element as `f64`. `b` must hold `byte_size()` bytes.
    pub fn decode_f64(self, b: &[u8]) -> f64 {
        match self {
            LeafType::F32 => f32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
            LeafType::F64 => f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
            LeafType::I32 => i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
            LeafType::U32 => u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
            LeafType::I64 => {
                i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f64
            }
            LeafType::I16 => i16::from_be_bytes([b[0], b[1]]) as f64,
            LeafType::I8 => b[0] as i8 as f64,
            LeafType::Bool => f64::from(u8::from(b[0] != 0)),
        }
    }
}

/// One leaf of a branch.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafInfo {
    /// Leaf name (e.g. `pt`).
    pub name: String,
    /// Leaf title carrying the dimension (e.g. `pt[2]`, `recoPt[numRecoMuons]`).
    pub title: String,
    /// Element type.
    pub leaf_type: LeafType,
    /// Fixed number of elements per entry (`fLen`).
    pub len: usize,
    /// Name of the counter leaf for variable-length leaves.
    pub count_leaf: Option<String>,
}

impl LeafInfo {
    /// Bytes this leaf occupies inside a fixed-size record.
    pub fn record_bytes(&self) -> usize {
        self.len * self.leaf_type.byte_size()
    }
}

/// Split a leaf title such as `hit_eta[4][2]` or `recoPt[numRecoMuons]` into
/// the fixed element count and the optional counter name.
pub fn parse_leaf_dims(title: &str) -> (usize, Option<String>) {
    let mut len = 1usize;
    let mut count = None;
    let mut rest = match title.find('[') {
        Some(i) => &title[i..],
        None => return (1, None),
    };
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']') else { break };
        let dim = &rest[open + 1..open + close];
        match dim.parse::<usize>() {
            Ok(n) => len *= n,
            Err(_) => count = Some(dim.to_string()),
        }
        rest = &rest[open + close + 1..];
    }
    (len, count)
}

/// Metadata for a single TBranch.
#[derive(Debug, Clone)]
pub struct BranchInfo {
    /// Branch name.
    pub name: String,
    /// Branch title (the leaf list, e.g. `nMuons/I:pt[2]/F`).
    pub title: String,
    /// Leaves in declaration order.
    pub leaves: Vec<LeafInfo>,
    /// Number of entries.
    pub entries: u64,
    /// Non-zero when baskets carry an entry-offset table (variable-size entries).
    pub entry_offset_len: i32,
    /// On-disk byte sizes for each basket.
    pub basket_bytes: Vec<u32>,
    /// First entry of each basket (`n_baskets + 1` values when complete).
    pub basket_entry: Vec<u64>,
    /// Absolute file offsets of each basket key.
    pub basket_seek: Vec<u64>,
    /// Number of written baskets (`fWriteBasket`).
    pub n_baskets: usize,
}

impl BranchInfo {
    /// Leaf type of the first leaf, if any.
    pub fn leaf_type(&self) -> Option<LeafType> {
        self.leaves.first().map(|l| l.leaf_type)
    }

    /// Size of one fixed record (sum over leaves).
    pub fn record_len(&self) -> usize {
        self.leaves.iter().map(LeafInfo::record_bytes).sum()
    }

    /// Whether any leaf is sized by a counter leaf.
    pub fn is_jagged(&self) -> bool {
        self.entry_offset_len > 0 || self.leaves.iter().any(|l| l.count_leaf.is_some())
    }

    /// Number of entries stored in basket `i`.
    pub fn basket_n_entries(&self, i: usize) -> usize {
        let first = self.basket_entry.get(i).copied().unwrap_or(0);
        let next = self.basket_entry.get(i + 1).copied().unwrap_or(self.entries);
        next.saturating_sub(first) as usize
    }

    /// Basket holding `entry` and the entry's row inside that basket.
    pub fn locate(&self, entry: u64) -> Option<(usize, usize)> {
        if entry >= self.entries {
            return None;
        }
        let n = self.n_baskets.min(self.basket_seek.len()).min(self.basket_entry.len());
        let starts = &self.basket_entry[..n];
        let k = starts.partition_point(|&first| first <= entry).checked_sub(1)?;
        usize::try_from(entry - starts[k]).ok().map(|row| (k, row))
    }
}

/// A parsed TTree.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Tree name.
    pub name: String,
    /// Tree title.
    pub title: String,
    /// Number of entries.
    pub entries: u64,
    /// Top-level branches.
    pub branches: Vec<BranchInfo>,
}

impl Tree {
    /// Find a branch by name.
    pub fn find_branch(&self, name: &str) -> Option<&BranchInfo> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// All branch names in order.
    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }
}
