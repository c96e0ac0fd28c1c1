//! Sequential table scans.

use crate::error::Result;
use crate::expr::Expr;
use crate::storage::heap::Table;
use crate::storage::page::PageNum;
use crate::types::{Record, Rid};

/// A cursor over the live records of a table.
///
/// Visits data pages in ascending page order and slots in ascending slot
/// order, skipping free slots. With a predicate, only records the
/// expression evaluates to boolean true for are yielded; evaluation
/// errors abort the scan.
///
/// The scan holds no pin between calls, so it observes a live view of
/// the table; every record it yields was live at the moment it was
/// returned.
pub struct TableScan<'a> {
    table: &'a Table,
    current_page: PageNum,
    current_slot: usize,
    predicate: Option<Expr>,
}

impl<'a> TableScan<'a> {
    pub(crate) fn new(table: &'a Table, predicate: Option<Expr>) -> Self {
        Self {
            table,
            current_page: 1,
            current_slot: 0,
            predicate,
        }
    }

    /// Yields the next matching record, or `None` when the table is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if a page cannot be fetched or the predicate
    /// fails to evaluate.
    pub fn next(&mut self) -> Result<Option<Record>> {
        let layout = self.table.layout();
        let slots_per_page = layout.slots_per_page();

        loop {
            if self.current_page >= self.table.pool.total_pages()? {
                return Ok(None);
            }

            let handle = self.table.pool.pin(self.current_page)?;
            let data = handle.data();

            while self.current_slot < slots_per_page {
                let slot = self.current_slot;
                if layout.slot_in_use(data, slot) {
                    let record = Record::from_parts(
                        Rid::new(self.current_page, slot as u32),
                        layout.record(data, slot).to_vec(),
                    );
                    let accepted = match &self.predicate {
                        None => true,
                        Some(expr) => expr.accepts(&record, self.table.schema())?,
                    };
                    if accepted {
                        self.current_slot = slot + 1;
                        return Ok(Some(record));
                    }
                }
                self.current_slot += 1;
            }

            drop(handle);
            self.current_page += 1;
            self.current_slot = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Attribute, Schema};
    use crate::expr::CmpOp;
    use crate::types::{DataType, Value};
    use tempfile::TempDir;

    fn schema() -> Schema {
        Schema::new(
            vec![
                Attribute::new("id", DataType::Int, 0),
                Attribute::new("score", DataType::Float, 0),
            ],
            vec![0],
        )
        .unwrap()
    }

    fn table_with(rows: &[(i32, f32)]) -> (Table, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.tbl");
        let schema = schema();
        Table::create(&path, &schema).unwrap();
        let mut table = Table::open(&path).unwrap();
        for &(id, score) in rows {
            let mut record = Record::new(&schema);
            record.set_attr(&schema, 0, &Value::Int(id)).unwrap();
            record.set_attr(&schema, 1, &Value::Float(score)).unwrap();
            table.insert(&mut record).unwrap();
        }
        (table, temp_dir)
    }

    #[test]
    fn test_scan_empty_table() {
        let (table, _temp) = table_with(&[]);
        let mut scan = table.scan(None);
        assert!(scan.next().unwrap().is_none());
        // Exhaustion is stable
        assert!(scan.next().unwrap().is_none());
    }

    #[test]
    fn test_scan_returns_all_records_in_order() {
        let rows: Vec<(i32, f32)> = (0..10).map(|i| (i, i as f32)).collect();
        let (table, _temp) = table_with(&rows);

        let schema = schema();
        let mut scan = table.scan(None);
        let mut seen = Vec::new();
        let mut last_rid = None;
        while let Some(record) = scan.next().unwrap() {
            let rid = record.id().unwrap();
            if let Some(prev) = last_rid {
                assert!((rid.page, rid.slot) > prev);
            }
            last_rid = Some((rid.page, rid.slot));
            seen.push(record.get_attr(&schema, 0).unwrap().as_int().unwrap());
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_scan_skips_deleted_records() {
        let rows: Vec<(i32, f32)> = (0..6).map(|i| (i, 0.0)).collect();
        let (mut table, _temp) = table_with(&rows);
        let schema = schema();

        // Delete the even ids
        let mut scan = table.scan(None);
        let mut to_delete = Vec::new();
        while let Some(record) = scan.next().unwrap() {
            if record.get_attr(&schema, 0).unwrap().as_int().unwrap() % 2 == 0 {
                to_delete.push(record.id().unwrap());
            }
        }
        for rid in to_delete {
            table.delete(rid).unwrap();
        }

        let mut scan = table.scan(None);
        let mut seen = Vec::new();
        while let Some(record) = scan.next().unwrap() {
            seen.push(record.get_attr(&schema, 0).unwrap().as_int().unwrap());
        }
        assert_eq!(seen, vec![1, 3, 5]);
    }

    #[test]
    fn test_scan_with_predicate() {
        let rows: Vec<(i32, f32)> = vec![(0, 100.0), (1, 900.0), (2, 799.9), (3, 800.0)];
        let (table, _temp) = table_with(&rows);
        let schema = schema();

        // NOT (score < 800.0)
        let predicate = Expr::not(Expr::cmp(
            CmpOp::Lt,
            Expr::attr(1),
            Expr::literal(Value::Float(800.0)),
        ));

        let mut scan = table.scan(Some(predicate));
        let mut seen = Vec::new();
        while let Some(record) = scan.next().unwrap() {
            seen.push(record.get_attr(&schema, 0).unwrap().as_int().unwrap());
        }
        assert_eq!(seen, vec![1, 3]);
    }

    #[test]
    fn test_scan_crosses_page_boundaries() {
        let per_page =
            crate::storage::heap::RecordLayout::new(schema().record_size()).slots_per_page();
        let rows: Vec<(i32, f32)> = (0..per_page as i32 + 5).map(|i| (i, 0.0)).collect();
        let (table, _temp) = table_with(&rows);

        let mut scan = table.scan(None);
        let mut count = 0;
        let mut pages = std::collections::BTreeSet::new();
        while let Some(record) = scan.next().unwrap() {
            pages.insert(record.id().unwrap().page);
            count += 1;
        }
        assert_eq!(count, per_page + 5);
        assert_eq!(pages.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_scan_predicate_error_propagates() {
        let (table, _temp) = table_with(&[(1, 1.0)]);

        // Comparing an INT attribute with a FLOAT literal is a type error
        let predicate = Expr::cmp(CmpOp::Eq, Expr::attr(0), Expr::literal(Value::Float(1.0)));
        let mut scan = table.scan(Some(predicate));
        assert!(scan.next().is_err());
    }
}
