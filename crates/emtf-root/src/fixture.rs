//! Minimal ROOT writer for test fixtures.
//!
//! Produces small-format files (32-bit seeks) holding TH1D histograms,
//! TGraph/TGraphErrors graphs and flat TTrees whose branches are leaf lists,
//! scalars or counter-sized arrays. Streamed layouts mirror what the reader in
//! [`crate::objects`] consumes, including class tags and byte counts.

use std::collections::HashMap;
use std::path::Path;

use crate::decompress::zlib_block;
use crate::graph::Graph;
use crate::histogram::Histogram;
use crate::objects::{K_BYTE_COUNT_MASK, K_CLASS_MASK, K_MAP_OFFSET, K_NEW_CLASS_TAG};
use crate::tree::{LeafType, parse_leaf_dims};

const BEGIN: usize = 100;
const FILE_VERSION: u32 = 62_206;
const SMALL_KEY_FIXED: usize = 26;

/// One branch of a fixture tree.
#[derive(Debug, Clone)]
pub struct FixtureBranch {
    name: String,
    leaves: Vec<FixtureLeaf>,
    rows: Vec<Vec<f64>>,
    jagged: bool,
    per_basket: usize,
}

#[derive(Debug, Clone)]
struct FixtureLeaf {
    name: String,
    title: String,
    leaf_type: LeafType,
    len: usize,
    counter: Option<String>,
}

impl FixtureBranch {
    /// A leaf-list branch. Each leaf is given by its title (`nMuons`, `pt[2]`)
    /// and type; each row holds the record's elements in leaf order.
    pub fn records(name: &str, leaves: &[(&str, LeafType)], rows: Vec<Vec<f64>>) -> Self {
        let leaves = leaves
            .iter()
            .map(|&(title, leaf_type)| {
                let (len, _) = parse_leaf_dims(title);
                let name = title.split('[').next().unwrap_or(title).to_string();
                FixtureLeaf { name, title: title.to_string(), leaf_type, len, counter: None }
            })
            .collect();
        Self { name: name.to_string(), leaves, rows, jagged: false, per_basket: usize::MAX }
    }

    /// A single-value branch.
    pub fn scalar(name: &str, leaf_type: LeafType, values: &[f64]) -> Self {
        Self::records(name, &[(name, leaf_type)], values.iter().map(|&v| vec![v]).collect())
    }

    /// A counter-sized array branch (`name[counter]`).
    pub fn jagged(name: &str, leaf_type: LeafType, counter: &str, rows: Vec<Vec<f64>>) -> Self {
        let leaf = FixtureLeaf {
            name: name.to_string(),
            title: format!("{name}[{counter}]"),
            leaf_type,
            len: 1,
            counter: Some(counter.to_string()),
        };
        Self { name: name.to_string(), leaves: vec![leaf], rows, jagged: true, per_basket: usize::MAX }
    }

    /// Split entries over baskets of at most `n` entries.
    pub fn entries_per_basket(mut self, n: usize) -> Self {
        self.per_basket = n.max(1);
        self
    }

    fn title(&self) -> String {
        let code = |t: LeafType| match t {
            LeafType::F32 => "F",
            LeafType::F64 => "D",
            LeafType::I32 => "I",
            LeafType::U32 => "i",
            LeafType::I64 => "L",
            LeafType::I16 => "S",
            LeafType::I8 => "B",
            LeafType::Bool => "O",
        };
        self.leaves
            .iter()
            .map(|l| format!("{}/{}", l.title, code(l.leaf_type)))
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// A flat tree for fixtures.
#[derive(Debug, Clone)]
pub struct FixtureTree {
    name: String,
    branches: Vec<FixtureBranch>,
}

impl FixtureTree {
    /// An empty tree named `name`.
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), branches: Vec::new() }
    }

    /// Append a branch.
    pub fn branch(mut self, b: FixtureBranch) -> Self {
        self.branches.push(b);
        self
    }

    fn entries(&self) -> usize {
        self.branches.iter().map(|b| b.rows.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
enum Item {
    Histogram(Histogram),
    Graph(Graph),
    Tree(FixtureTree),
}

/// Builder for an in-memory ROOT file.
#[derive(Debug, Clone, Default)]
pub struct FixtureFile {
    compress: bool,
    items: Vec<(String, Item)>,
}

impl FixtureFile {
    /// An empty, uncompressed file.
    pub fn new() -> Self {
        Self::default()
    }

    /// zlib-compress object payloads and baskets.
    pub fn compressed(mut self, yes: bool) -> Self {
        self.compress = yes;
        self
    }

    /// Add a TH1D at the top level.
    pub fn histogram(mut self, h: Histogram) -> Self {
        self.items.push((String::new(), Item::Histogram(h)));
        self
    }

    /// Add a TGraphErrors (or TGraph when `ey` is absent) at the top level.
    pub fn graph(mut self, g: Graph) -> Self {
        self.items.push((String::new(), Item::Graph(g)));
        self
    }

    /// Add a tree inside directory `dir` (`""` for the top level).
    pub fn tree(mut self, dir: &str, t: FixtureTree) -> Self {
        self.items.push((dir.trim_matches('/').to_string(), Item::Tree(t)));
        self
    }

    /// Write the file to disk.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    /// Serialize the whole file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; BEGIN];

        // Top record: TKey + name/title + TDirectory. Seek fields patched below.
        let (file_name, file_title) = ("fixture.root", "");
        let top_key_len = key_len_for("TFile", file_name, file_title);
        let nbytes_name = top_key_len + str_len(file_name) + str_len(file_title);
        let dir_len = 2 + 4 * 7;
        let top_header = key_header(
            nbytes_name + dir_len,
            nbytes_name - top_key_len + dir_len,
            top_key_len,
            BEGIN,
            ("TFile", file_name, file_title),
        );
        out.extend_from_slice(&top_header);
        let mut w = WBuffer::new(0);
        w.string(file_name);
        w.string(file_title);
        out.extend_from_slice(&w.buf);
        let top_dir_pos = out.len();
        out.extend_from_slice(&dir_streamer(0, nbytes_name, BEGIN, 0, 0));

        let mut writer = Writer { out, compress: self.compress };
        let mut top_keys: Vec<Vec<u8>> = Vec::new();
        let mut dirs: Vec<&str> = Vec::new();

        for (dir, item) in &self.items {
            if dir.is_empty() {
                top_keys.push(writer.item(item));
            } else if !dirs.contains(&dir.as_str()) {
                dirs.push(dir);
            }
        }
        for dir in dirs {
            let keys: Vec<Vec<u8>> = self
                .items
                .iter()
                .filter(|(d, _)| d == dir)
                .map(|(_, item)| writer.item(item))
                .collect();
            let (seek_keys, nbytes_keys) = writer.key_list(dir, &keys);
            let payload = dir_streamer(nbytes_keys, 0, 0, BEGIN, seek_keys);
            top_keys.push(writer.record(("TDirectoryFile", dir, dir), payload, false));
        }
        let (seek_keys, nbytes_keys) = writer.key_list(file_name, &top_keys);

        let mut out = writer.out;
        let patched = dir_streamer(nbytes_keys, nbytes_name, BEGIN, 0, seek_keys);
        out[top_dir_pos..top_dir_pos + patched.len()].copy_from_slice(&patched);

        let mut head = WBuffer::new(0);
        head.bytes(b"root");
        head.u32(FILE_VERSION);
        head.u32(BEGIN as u32);
        head.u32(out.len() as u32);
        head.u32(0);
        head.u32(0);
        head.u32(0);
        head.u32(nbytes_name as u32);
        head.u8(4);
        head.u32(if self.compress { 101 } else { 0 });
        head.u32(0);
        head.u32(0);
        head.bytes(&[0u8; 18]);
        out[..head.buf.len()].copy_from_slice(&head.buf);
        out
    }
}

struct Writer {
    out: Vec<u8>,
    compress: bool,
}

impl Writer {
    fn item(&mut self, item: &Item) -> Vec<u8> {
        match item {
            Item::Histogram(h) => {
                let key_len = key_len_for("TH1D", &h.name, &h.title);
                let mut w = WBuffer::new(key_len);
                w.th1(h, "TH1D");
                self.record(("TH1D", &h.name, &h.title), w.buf, self.compress)
            }
            Item::Graph(g) => {
                let class = if g.ey.is_some() { "TGraphErrors" } else { "TGraph" };
                let key_len = key_len_for(class, &g.name, &g.title);
                let mut w = WBuffer::new(key_len);
                w.graph(g);
                self.record((class, &g.name, &g.title), w.buf, self.compress)
            }
            Item::Tree(t) => {
                let baskets: Vec<BranchBaskets> =
                    t.branches.iter().map(|b| self.baskets(b, &t.name)).collect();
                let key_len = key_len_for("TTree", &t.name, &t.name);
                let mut w = WBuffer::new(key_len);
                w.ttree(t, &baskets);
                self.record(("TTree", &t.name, &t.name), w.buf, self.compress)
            }
        }
    }

    /// Append a key record; returns the key header for the directory list.
    fn record(&mut self, (class, name, title): (&str, &str, &str), payload: Vec<u8>, compress: bool) -> Vec<u8> {
        let key_len = key_len_for(class, name, title);
        let body = if compress {
            let packed = zlib_block(&payload);
            if packed.len() < payload.len() { packed } else { payload.clone() }
        } else {
            payload.clone()
        };
        let seek = self.out.len();
        let header = key_header(key_len + body.len(), payload.len(), key_len, seek, (class, name, title));
        self.out.extend_from_slice(&header);
        self.out.extend_from_slice(&body);
        header
    }

    fn key_list(&mut self, dir: &str, keys: &[Vec<u8>]) -> (usize, usize) {
        let key_len = key_len_for("TDirectory", dir, "");
        let body_len = 4 + keys.iter().map(Vec::len).sum::<usize>();
        let seek = self.out.len();
        let header = key_header(key_len + body_len, body_len, key_len, seek, ("TDirectory", dir, ""));
        self.out.extend_from_slice(&header);
        self.out.extend_from_slice(&(keys.len() as u32).to_be_bytes());
        for k in keys {
            self.out.extend_from_slice(k);
        }
        (seek, key_len + body_len)
    }

    fn baskets(&mut self, b: &FixtureBranch, tree: &str) -> BranchBaskets {
        let mut out = BranchBaskets::default();
        let mut first = 0usize;
        for chunk in b.rows.chunks(b.per_basket.min(b.rows.len().max(1))) {
            let key_len = key_len_for("TBasket", &b.name, tree) + BASKET_EXTRA;
            let mut data = Vec::new();
            let mut offsets = Vec::with_capacity(chunk.len());
            for row in chunk {
                offsets.push(key_len + data.len());
                encode_row(b, row, &mut data);
            }
            let last = key_len + data.len();
            let mut payload = data;
            if b.jagged {
                payload.extend_from_slice(&(chunk.len() as i32).to_be_bytes());
                for off in &offsets {
                    payload.extend_from_slice(&(*off as i32).to_be_bytes());
                }
            }
            let body = if self.compress {
                let packed = zlib_block(&payload);
                if packed.len() < payload.len() { packed } else { payload.clone() }
            } else {
                payload.clone()
            };

            let seek = self.out.len();
            let n_bytes = key_len + body.len();
            let mut header =
                key_header(n_bytes, payload.len(), key_len, seek, ("TBasket", &b.name, tree));
            let mut w = WBuffer::new(0);
            w.u16(3);
            w.i32(32_000);
            w.i32(if b.jagged { 0 } else { b.leaves.iter().map(|l| l.len * l.leaf_type.byte_size()).sum::<usize>() as i32 });
            w.i32(chunk.len() as i32);
            w.i32(last as i32);
            w.u8(0);
            header.extend_from_slice(&w.buf);
            self.out.extend_from_slice(&header);
            self.out.extend_from_slice(&body);

            out.seeks.push(seek as i64);
            out.bytes.push(n_bytes as i32);
            out.first_entry.push(first as i64);
            out.zip_bytes += n_bytes as i64;
            out.tot_bytes += (key_len + payload.len()) as i64;
            first += chunk.len();
        }
        out
    }
}

/// TBasket fields following the plain key header.
const BASKET_EXTRA: usize = 2 + 4 * 4 + 1;

#[derive(Debug, Default)]
struct BranchBaskets {
    seeks: Vec<i64>,
    bytes: Vec<i32>,
    first_entry: Vec<i64>,
    tot_bytes: i64,
    zip_bytes: i64,
}

fn encode_row(b: &FixtureBranch, row: &[f64], out: &mut Vec<u8>) {
    if b.jagged {
        let t = b.leaves[0].leaf_type;
        for &v in row {
            encode_value(t, v, out);
        }
        return;
    }
    let mut values = row.iter().copied();
    for leaf in &b.leaves {
        for _ in 0..leaf.len {
            encode_value(leaf.leaf_type, values.next().unwrap_or(0.0), out);
        }
    }
}

fn encode_value(t: LeafType, v: f64, out: &mut Vec<u8>) {
    match t {
        LeafType::F32 => out.extend_from_slice(&(v as f32).to_be_bytes()),
        LeafType::F64 => out.extend_from_slice(&v.to_be_bytes()),
        LeafType::I32 => out.extend_from_slice(&(v as i32).to_be_bytes()),
        LeafType::U32 => out.extend_from_slice(&(v as u32).to_be_bytes()),
        LeafType::I64 => out.extend_from_slice(&(v as i64).to_be_bytes()),
        LeafType::I16 => out.extend_from_slice(&(v as i16).to_be_bytes()),
        LeafType::I8 => out.push(v as i8 as u8),
        LeafType::Bool => out.push(u8::from(v != 0.0)),
    }
}

fn str_len(s: &str) -> usize {
    if s.len() < 255 { 1 + s.len() } else { 5 + s.len() }
}

fn key_len_for(class: &str, name: &str, title: &str) -> usize {
    SMALL_KEY_FIXED + str_len(class) + str_len(name) + str_len(title)
}

fn key_header(
    n_bytes: usize,
    obj_len: usize,
    key_len: usize,
    seek: usize,
    (class, name, title): (&str, &str, &str),
) -> Vec<u8> {
    let mut w = WBuffer::new(0);
    w.u32(n_bytes as u32);
    w.u16(4);
    w.u32(obj_len as u32);
    w.u32(0);
    w.u16(key_len as u16);
    w.u16(1);
    w.u32(seek as u32);
    w.u32(BEGIN as u32);
    w.string(class);
    w.string(name);
    w.string(title);
    w.buf
}

fn dir_streamer(nbytes_keys: usize, nbytes_name: usize, seek_dir: usize, seek_parent: usize, seek_keys: usize) -> Vec<u8> {
    let mut w = WBuffer::new(0);
    w.u16(5);
    w.u32(0);
    w.u32(0);
    w.u32(nbytes_keys as u32);
    w.u32(nbytes_name as u32);
    w.u32(seek_dir as u32);
    w.u32(seek_parent as u32);
    w.u32(seek_keys as u32);
    w.buf
}

/// Big-endian streamer buffer with byte counts and the class-tag map.
struct WBuffer {
    buf: Vec<u8>,
    origin: usize,
    classes: HashMap<String, u32>,
    objects: HashMap<String, u32>,
}

impl WBuffer {
    fn new(origin: usize) -> Self {
        Self { buf: Vec::new(), origin, classes: HashMap::new(), objects: HashMap::new() }
    }

    fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_be_bytes());
    }
    fn i16(&mut self, v: i16) {
        self.bytes(&v.to_be_bytes());
    }
    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_be_bytes());
    }
    fn i32(&mut self, v: i32) {
        self.bytes(&v.to_be_bytes());
    }
    fn i64(&mut self, v: i64) {
        self.bytes(&v.to_be_bytes());
    }
    fn f32(&mut self, v: f32) {
        self.bytes(&v.to_be_bytes());
    }
    fn f64(&mut self, v: f64) {
        self.bytes(&v.to_be_bytes());
    }
    fn f64s(&mut self, v: &[f64]) {
        for &x in v {
            self.f64(x);
        }
    }

    fn string(&mut self, s: &str) {
        if s.len() < 255 {
            self.u8(s.len() as u8);
        } else {
            self.u8(255);
            self.u32(s.len() as u32);
        }
        self.bytes(s.as_bytes());
    }

    /// Open a versioned block; close it with [`end`](Self::end).
    fn begin(&mut self, version: u16) -> usize {
        let start = self.buf.len();
        self.u32(0);
        self.u16(version);
        start
    }

    fn end(&mut self, start: usize) {
        let count = (self.buf.len() - start - 4) as u32 | K_BYTE_COUNT_MASK;
        self.buf[start..start + 4].copy_from_slice(&count.to_be_bytes());
    }

    fn tobject(&mut self, unique_id: u32) {
        self.u16(1);
        self.u32(unique_id);
        self.u32(0x0300_0000);
    }

    fn tnamed(&mut self, name: &str, title: &str) {
        let s = self.begin(1);
        self.tobject(0);
        self.string(name);
        self.string(title);
        self.end(s);
    }

    /// Write an object pointer with an inline body; returns its object reference.
    fn object(&mut self, class: &str, body: impl FnOnce(&mut Self)) -> u32 {
        let start = self.buf.len();
        self.u32(0);
        let tag_pos = self.buf.len();
        match self.classes.get(class) {
            Some(&at) => self.u32(at | K_CLASS_MASK),
            None => {
                self.u32(K_NEW_CLASS_TAG);
                self.bytes(class.as_bytes());
                self.u8(0);
                self.classes.insert(class.to_string(), (tag_pos + self.origin + K_MAP_OFFSET) as u32);
            }
        }
        body(self);
        self.end(start);
        (start + self.origin + K_MAP_OFFSET) as u32
    }

    fn att_line(&mut self) {
        let s = self.begin(2);
        self.i16(1);
        self.i16(1);
        self.i16(1);
        self.end(s);
    }

    fn att_fill(&mut self) {
        let s = self.begin(2);
        self.i16(0);
        self.i16(1001);
        self.end(s);
    }

    fn att_marker(&mut self) {
        let s = self.begin(2);
        self.i16(1);
        self.i16(1);
        self.f32(1.0);
        self.end(s);
    }

    fn att_axis(&mut self) {
        let s = self.begin(4);
        self.i32(510);
        for v in [1i16, 1, 42] {
            self.i16(v);
        }
        for v in [0.005f32, 0.035, 0.03, 1.0, 0.035] {
            self.f32(v);
        }
        self.i16(1);
        self.i16(42);
        self.end(s);
    }

    fn tlist(&mut self, labels: &[(u32, &str)]) {
        let s = self.begin(5);
        self.tobject(0);
        self.string("");
        self.i32(labels.len() as i32);
        for &(bin, text) in labels {
            self.object("TObjString", |w| {
                let o = w.begin(1);
                w.tobject(bin);
                w.string(text);
                w.end(o);
            });
            self.u8(0);
        }
        self.end(s);
    }

    fn objarray_empty(&mut self) {
        let s = self.begin(3);
        self.tobject(0);
        self.string("");
        self.i32(0);
        self.i32(0);
        self.end(s);
    }

    fn taxis(&mut self, name: &str, title: &str, edges: &[f64], labels: &[(u32, &str)]) {
        let s = self.begin(10);
        self.tnamed(name, title);
        self.att_axis();
        let n = edges.len().saturating_sub(1);
        let (lo, hi) = (edges.first().copied().unwrap_or(0.0), edges.last().copied().unwrap_or(1.0));
        self.i32(n as i32);
        self.f64(lo);
        self.f64(hi);
        let width = (hi - lo) / n.max(1) as f64;
        let uniform = edges.iter().enumerate().all(|(i, &e)| (e - (lo + i as f64 * width)).abs() < 1e-9);
        if uniform {
            self.u32(0);
        } else {
            self.u32(edges.len() as u32);
            self.f64s(edges);
        }
        self.i32(0);
        self.i32(0);
        self.u16(0);
        self.u8(0);
        self.string("");
        if labels.is_empty() {
            self.u32(0);
        } else {
            self.object("THashList", |w| w.tlist(labels));
        }
        self.u32(0);
        self.end(s);
    }

    fn th1(&mut self, h: &Histogram, class: &str) {
        let n = h.n_bins();
        let s = self.begin(3);
        let b = self.begin(8);
        self.tnamed(&h.name, &h.title);
        self.att_line();
        self.att_fill();
        self.att_marker();
        self.i32((n + 2) as i32);
        let labels: Vec<(u32, &str)> = h.bin_labels.iter().map(|l| (l.bin as u32, l.text.as_str())).collect();
        self.taxis("xaxis", &h.x_title, &h.bin_edges, &labels);
        self.taxis("yaxis", "", &[0.0, 1.0], &[]);
        self.taxis("zaxis", "", &[0.0, 1.0], &[]);
        self.i16(0);
        self.i16(1000);
        self.f64(h.entries);
        self.f64(h.integral());
        self.f64s(&[0.0, 0.0, 0.0]);
        self.f64(-1111.0);
        self.f64(-1111.0);
        self.f64(0.0);
        self.u32(0);
        match &h.sumw2 {
            Some(w2) => {
                let [under, over] = h.flow_sumw2.unwrap_or_default();
                self.u32((n + 2) as u32);
                self.f64(under);
                self.f64s(w2);
                self.f64(over);
            }
            None => self.u32(0),
        }
        self.string("");
        self.tlist(&[]);
        self.i32(0);
        self.u8(0);
        self.i32(0);
        self.i32(2);
        self.end(b);

        self.u32((n + 2) as u32);
        let cells = std::iter::once(h.underflow)
            .chain(h.bin_content.iter().copied())
            .chain(std::iter::once(h.overflow));
        if class == "TH1D" {
            for v in cells {
                self.f64(v);
            }
        } else {
            for v in cells {
                self.f32(v as f32);
            }
        }
        self.end(s);
    }

    fn graph(&mut self, g: &Graph) {
        let errors = g.ey.is_some();
        let outer = errors.then(|| self.begin(3));
        let s = self.begin(4);
        self.tnamed(&g.name, &g.title);
        self.att_line();
        self.att_fill();
        self.att_marker();
        self.i32(g.n_points() as i32);
        self.u8(1);
        self.f64s(&g.x);
        self.u8(1);
        self.f64s(&g.y);
        self.object("TList", |w| w.tlist(&[]));
        match &g.histogram {
            Some(h) => {
                self.object("TH1F", |w| w.th1(h, "TH1F"));
            }
            None => self.u32(0),
        }
        self.f64(-1111.0);
        self.f64(-1111.0);
        self.end(s);
        if let Some(outer) = outer {
            let n = g.n_points();
            self.u8(1);
            self.f64s(&(0..n).map(|i| g.ex_at(i)).collect::<Vec<_>>());
            self.u8(1);
            self.f64s(&(0..n).map(|i| g.ey_at(i)).collect::<Vec<_>>());
            self.end(outer);
        }
    }

    fn io_features(&mut self) {
        let s = self.begin(1);
        self.u8(0);
        self.end(s);
    }

    fn ttree(&mut self, t: &FixtureTree, baskets: &[BranchBaskets]) {
        let entries = t.entries() as i64;
        let tot: i64 = baskets.iter().map(|b| b.tot_bytes).sum();
        let zip: i64 = baskets.iter().map(|b| b.zip_bytes).sum();
        let s = self.begin(20);
        self.tnamed(&t.name, &t.name);
        self.att_line();
        self.att_fill();
        self.att_marker();
        self.i64(entries);
        self.i64(tot);
        self.i64(zip);
        self.i64(tot);
        self.i64(zip);
        self.f64(1.0);
        self.i32(0);
        self.i32(25);
        self.i32(0);
        self.i32(1000);
        self.i32(0);
        for v in [1_000_000_000_000i64, 1_000_000_000_000, 0, -300_000_000, -30_000_000, 1_000_000] {
            self.i64(v);
        }
        self.u8(0);
        self.u8(0);
        self.io_features();

        let a = self.begin(3);
        self.tobject(0);
        self.string("");
        self.i32(t.branches.len() as i32);
        self.i32(0);
        for (b, bk) in t.branches.iter().zip(baskets) {
            self.object("TBranch", |w| w.tbranch(b, bk, entries));
        }
        self.end(a);
        self.end(s);
    }

    fn tbranch(&mut self, b: &FixtureBranch, bk: &BranchBaskets, tree_entries: i64) {
        let n_baskets = bk.seeks.len();
        let max_baskets = n_baskets + 1;
        let s = self.begin(13);
        self.tnamed(&b.name, &b.title());
        self.att_fill();
        self.i32(if bk.zip_bytes < bk.tot_bytes { 101 } else { 0 });
        self.i32(32_000);
        self.i32(if b.jagged { 1000 } else { 0 });
        self.i32(n_baskets as i32);
        self.i64(b.rows.len() as i64);
        self.io_features();
        self.i32(0);
        self.i32(max_baskets as i32);
        self.i32(0);
        self.i64(b.rows.len().min(tree_entries as usize) as i64);
        self.i64(0);
        self.i64(bk.tot_bytes);
        self.i64(bk.zip_bytes);

        self.objarray_empty();
        let a = self.begin(3);
        self.tobject(0);
        self.string("");
        self.i32(b.leaves.len() as i32);
        self.i32(0);
        for leaf in &b.leaves {
            let counter = leaf.counter.as_ref().and_then(|c| self.objects.get(c).copied());
            let reference = self.object(leaf.leaf_type.class_name(), |w| w.tleaf(leaf, counter));
            self.objects.insert(leaf.name.clone(), reference);
        }
        self.end(a);
        self.objarray_empty();

        self.u8(1);
        for i in 0..max_baskets {
            self.i32(bk.bytes.get(i).copied().unwrap_or(0));
        }
        self.u8(1);
        for i in 0..max_baskets {
            self.i64(bk.first_entry.get(i).copied().unwrap_or(b.rows.len() as i64));
        }
        self.u8(1);
        for i in 0..max_baskets {
            self.i64(bk.seeks.get(i).copied().unwrap_or(0));
        }
        self.string("");
        self.end(s);
    }

    fn tleaf(&mut self, leaf: &FixtureLeaf, counter: Option<u32>) {
        let size = leaf.leaf_type.byte_size();
        let s = self.begin(1);
        let l = self.begin(2);
        self.tnamed(&leaf.name, &leaf.title);
        self.i32(leaf.len as i32);
        self.i32(size as i32);
        self.i32(0);
        self.u8(0);
        self.u8(u8::from(leaf.leaf_type == LeafType::U32));
        self.u32(counter.unwrap_or(0));
        self.end(l);
        self.bytes(&vec![0u8; 2 * size]);
        self.end(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_counts_cover_their_blocks() {
        let mut w = WBuffer::new(0);
        let s = w.begin(7);
        w.u32(5);
        w.end(s);
        assert_eq!(&w.buf[..4], &(K_BYTE_COUNT_MASK | 6).to_be_bytes());
    }

    #[test]
    fn repeated_classes_are_written_by_reference() {
        let mut w = WBuffer::new(40);
        w.object("TObjString", |_| {});
        let second = w.buf.len();
        w.object("TObjString", |_| {});
        let tag = u32::from_be_bytes(w.buf[second + 4..second + 8].try_into().unwrap());
        assert_eq!(tag, (4 + 40 + K_MAP_OFFSET) as u32 | K_CLASS_MASK);
    }

    #[test]
    fn leaf_list_title() {
        let b = FixtureBranch::records("muon", &[("nMuons", LeafType::I32), ("pt[2]", LeafType::F32)], vec![]);
        assert_eq!(b.title(), "nMuons/I:pt[2]/F");
        assert_eq!(b.leaves[1].name, "pt");
        assert_eq!(b.leaves[1].len, 2);
    }
}
