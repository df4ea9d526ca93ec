//! Insert serializer, the inverse of [`super::parse_inserts`].

use super::InsertRow;

/// Renders rows as dump insert statements, one per line, in input order.
pub fn serialize_inserts(rows: &[InsertRow]) -> String {
    let mut out = String::new();

    for row in rows {
        let values: Vec<&str> = row.values.iter().map(|v| v.trim()).collect();
        out.push_str("INSERT INTO ");
        out.push_str(&row.table_name);
        out.push_str(" VALUES(");
        out.push_str(&values.join(","));
        out.push_str(");\n");
    }

    out
}
