use crate::core::Row;

/// A fully materialized result set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Renders the result as an aligned text table.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "Empty result set\n".to_string();
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(value.to_string().len());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{:width$}", col, width = widths[i]))
            .collect();
        out.push_str(&header.join(" | "));
        out.push('\n');

        let separator: String = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");
        out.push_str(&separator);
        out.push('\n');

        for row in &self.rows {
            let row_str: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, val)| {
                    let width = widths.get(i).copied().unwrap_or(0);
                    format!("{:width$}", val.to_string(), width = width)
                })
                .collect();
            out.push_str(&row_str.join(" | "));
            out.push('\n');
        }

        out.push_str(&format!("\n{} row(s)\n", self.rows.len()));
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn test_render_aligns_columns() {
        let result = QueryResult::new(
            vec!["table".into(), "rows".into()],
            vec![
                vec![Value::Text("opt_clients".into()), Value::Integer(100)],
                vec![Value::Text("opt_orders".into()), Value::Integer(5)],
            ],
        );

        let text = result.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "table       | rows");
        assert_eq!(lines[1], "------------+-----");
        assert_eq!(lines[2], "opt_clients | 100 ");
        assert!(text.ends_with("2 row(s)\n"));
    }

    #[test]
    fn test_render_empty_result() {
        assert_eq!(QueryResult::empty().render(), "Empty result set\n");
        assert!(QueryResult::empty().is_empty());
    }
}
