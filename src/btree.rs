/*
Traversal algorithms over the three shapes a query needs from a b-tree:
a full scan of a table's leaf cells, a point lookup by rowid, and a pruned
walk of an index keyed on a column-value prefix.

None of these detect cycles; a page graph that loops is a malformed
database and these functions will loop with it (spec §1: trusts the file).

Overflow pages are not followed (see cell.rs); a cell whose payload would
spill onto one is decoded as if fully inline.
*/

use anyhow::{bail, Context, Result};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::cell::{IndexInteriorCell, IndexLeafCell, TableInteriorCell, TableLeafCell};
use crate::page::{Page, PageType};
use crate::pager::Pager;
use crate::value::{compare_prefix, Value};

fn decode_table_leaf_cells(page: &Page) -> Result<Vec<TableLeafCell>> {
    (0..page.num_cells())
        .map(|i| TableLeafCell::from_be_bytes(page.cell_content(i)?))
        .collect()
}

fn decode_table_interior_cells(page: &Page) -> Result<Vec<TableInteriorCell>> {
    (0..page.num_cells())
        .map(|i| TableInteriorCell::from_be_bytes(page.cell_content(i)?))
        .collect()
}

fn decode_index_leaf_cells(page: &Page) -> Result<Vec<IndexLeafCell>> {
    (0..page.num_cells())
        .map(|i| IndexLeafCell::from_be_bytes(page.cell_content(i)?))
        .collect()
}

fn decode_index_interior_cells(page: &Page) -> Result<Vec<IndexInteriorCell>> {
    (0..page.num_cells())
        .map(|i| IndexInteriorCell::from_be_bytes(page.cell_content(i)?))
        .collect()
}

// breadth-first walk of every table-leaf cell reachable from `root`, in
// left-to-right key order within each page (order across pages is BFS
// order, not necessarily full key order, but callers only need the set).
pub fn collect_table_leaf_cells(pager: &Pager, root: u32) -> Result<Vec<TableLeafCell>> {
    let mut out = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(number) = queue.pop_front() {
        let page = pager.read_page(number).with_context(|| format!("reading page {number}"))?;

        match page.page_type() {
            PageType::LeafTable => {
                out.extend(decode_table_leaf_cells(&page)?);
            }
            PageType::InteriorTable => {
                for cell in decode_table_interior_cells(&page)? {
                    queue.push_back(cell.left_child_page);
                }
                if let Some(rightmost) = page.right_most_pointer() {
                    queue.push_back(rightmost);
                }
            }
            other => bail!("page {number} has unexpected type {other:?} in a table b-tree"),
        }
    }

    Ok(out)
}

type PageCache = HashMap<u32, Rc<Page>>;

fn cached_page(pager: &Pager, number: u32, cache: &mut PageCache) -> Result<Rc<Page>> {
    if let Some(page) = cache.get(&number) {
        return Ok(Rc::clone(page));
    }
    let page = Rc::new(pager.read_page(number).with_context(|| format!("reading page {number}"))?);
    cache.insert(number, Rc::clone(&page));
    Ok(page)
}

// descends from `root` to the leaf cell whose rowid matches exactly,
// sharing `cache` across repeated descents within one batch lookup.
//
// at interior pages, the child holding `rowid` is found by lower-bound
// binary search over each cell's key (the maximum rowid of its left
// subtree): the first cell whose key is >= rowid. If every cell's key is
// less than rowid, the rightmost pointer is followed instead — this
// mirrors the subtree-max-key convention and is deliberately preserved
// even though it means a rowid larger than every key in the page falls
// through to the rightmost child.
//
// at leaf pages, cells are searched by an inclusive-bound binary search
// (`left <= right`) against the exact rowid, not the half-open bisection
// a textbook binary search would use; this is a preserved quirk rather
// than a simplification; it still terminates correctly for a page whose
// rowids are in their required strictly-ascending order.
fn get_row_by_rowid_cached(
    pager: &Pager,
    root: u32,
    rowid: i64,
    cache: &mut PageCache,
) -> Result<TableLeafCell> {
    let mut number = root;
    loop {
        let page = cached_page(pager, number, cache)?;

        match page.page_type() {
            PageType::InteriorTable => {
                let cells = decode_table_interior_cells(&page)?;
                let idx = cells.partition_point(|c| c.key < rowid);
                number = if idx == cells.len() {
                    page.right_most_pointer()
                        .context("interior table page missing right-most pointer")?
                } else {
                    cells[idx].left_child_page
                };
            }
            PageType::LeafTable => {
                let cells = decode_table_leaf_cells(&page)?;
                if cells.is_empty() {
                    bail!("rowid {rowid} not found (empty leaf)");
                }
                let mut left = 0usize;
                let mut right = cells.len() - 1;
                loop {
                    let mid = left + (right - left) / 2;
                    match cells[mid].rowid.cmp(&rowid) {
                        Ordering::Equal => return Ok(cells[mid].clone()),
                        Ordering::Less => {
                            if mid == right {
                                bail!("rowid {rowid} not found");
                            }
                            left = mid + 1;
                        }
                        Ordering::Greater => {
                            if mid == left {
                                bail!("rowid {rowid} not found");
                            }
                            right = mid - 1;
                        }
                    }
                    if left > right {
                        bail!("rowid {rowid} not found");
                    }
                }
            }
            other => bail!("page {number} has unexpected type {other:?} in a table b-tree"),
        }
    }
}

pub fn get_row_by_rowid(pager: &Pager, root: u32, rowid: i64) -> Result<TableLeafCell> {
    let mut cache = PageCache::new();
    get_row_by_rowid_cached(pager, root, rowid, &mut cache)
}

// looks up several rowids against the same root, sharing one page cache
// across all of them so pages revisited during descent are read once.
pub fn get_rows_by_rowids(pager: &Pager, root: u32, rowids: &[i64]) -> Result<Vec<TableLeafCell>> {
    let mut cache = PageCache::new();
    rowids
        .iter()
        .map(|&rowid| get_row_by_rowid_cached(pager, root, rowid, &mut cache))
        .collect()
}

// pruned breadth-first walk of an index b-tree, collecting the rowids of
// every entry whose key has `key_prefix` as a prefix (spec §4.4/§4.6):
//
//   leaf page: cells are in ascending key order. A cell comparing Equal
//   contributes its rowid; a cell comparing Greater means every
//   remaining cell on the page also compares Greater (by the page's sort
//   order), so the scan of that page stops there.
//
//   interior page: a cell comparing Less is skipped without descending
//   (its entire left subtree sorts before the prefix). A cell comparing
//   Equal or Greater has its left child enqueued, since the boundary
//   between "less" and "not less" keys can fall inside that subtree; an
//   Equal cell additionally contributes its own rowid. The first cell
//   comparing Greater also ends the scan of that page — but only after
//   its left child has been enqueued — since every cell after it sorts
//   even further above the prefix. If no cell on the page ever compared
//   Greater, the page's right-most pointer is enqueued too, since the
//   matching range may continue into it.
pub fn find_rowids(pager: &Pager, index_root: u32, key_prefix: &[Value]) -> Result<Vec<i64>> {
    let mut out = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(index_root);

    while let Some(number) = queue.pop_front() {
        let page = pager.read_page(number).with_context(|| format!("reading page {number}"))?;

        match page.page_type() {
            PageType::LeafIndex => {
                for cell in decode_index_leaf_cells(&page)? {
                    match compare_prefix(cell.key(), key_prefix) {
                        Ordering::Equal => out.push(cell.rowid()?),
                        Ordering::Greater => break,
                        Ordering::Less => {}
                    }
                }
            }
            PageType::InteriorIndex => {
                let mut found_greater = false;
                for cell in decode_index_interior_cells(&page)? {
                    match compare_prefix(cell.key(), key_prefix) {
                        Ordering::Less => continue,
                        Ordering::Equal => {
                            queue.push_back(cell.left_child_page);
                            out.push(cell.rowid()?);
                        }
                        Ordering::Greater => {
                            queue.push_back(cell.left_child_page);
                            found_greater = true;
                            break;
                        }
                    }
                }
                if !found_greater {
                    if let Some(rightmost) = page.right_most_pointer() {
                        queue.push_back(rightmost);
                    }
                }
            }
            other => bail!("page {number} has unexpected type {other:?} in an index b-tree"),
        }
    }

    Ok(out)
}
