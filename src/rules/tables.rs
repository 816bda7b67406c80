// SPDX-License-Identifier: PMPL-1.0-or-later
//! Table header rule - WCAG 1.3.1 Info and Relationships

use crate::config::EngineConfig;
use crate::error::Result;
use crate::finding::Finding;
use crate::frames::{NodeRef, Scope};
use crate::rules::{finding_at, is_presentational, Rule};

/// Data table without usable header cells
pub struct MissingTableHeaders;

impl MissingTableHeaders {
    /// Descendants of `table` that belong to it rather than to a nested table
    fn own<'a>(table: &NodeRef<'a>, tag: &'a str) -> Vec<NodeRef<'a>> {
        table
            .descendants()
            .filter(|n| n.tag() == tag)
            .filter(|n| n.ancestors().find(|a| a.tag() == "table").map(|t| t.id) == Some(table.id))
            .collect()
    }
}

impl Rule for MissingTableHeaders {
    fn id(&self) -> &str {
        "missing-table-headers"
    }

    fn name(&self) -> &str {
        "Missing Table Headers"
    }

    fn criterion(&self) -> &str {
        "1.3.1"
    }

    fn description(&self) -> &str {
        "Data tables need th cells, with scope when both row and column headers exist"
    }

    fn evaluate(&self, scope: &Scope, _config: &EngineConfig) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for table in scope.by_tag("table") {
            if is_presentational(&table) {
                continue;
            }
            let headers = Self::own(&table, "th");
            if headers.is_empty() {
                if !Self::own(&table, "td").is_empty() {
                    findings.push(finding_at(self, &table, "Data table has no header cells (<th>)."));
                }
                continue;
            }
            let first_row = Self::own(&table, "tr").first().map(|r| r.id);
            let (column, row): (Vec<&NodeRef<'_>>, Vec<&NodeRef<'_>>) = headers
                .iter()
                .partition(|th| th.parent().map(|p| p.id) == first_row);
            if column.is_empty() || row.is_empty() {
                continue;
            }
            let unscoped = headers.iter().filter(|th| th.non_empty_attr("scope").is_none()).count();
            if unscoped > 0 {
                findings.push(finding_at(
                    self,
                    &table,
                    &format!(
                        "Table has both row and column headers but {} <th> cell(s) lack a scope attribute.",
                        unscoped
                    ),
                ));
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{page, run};

    #[test]
    fn test_table_without_headers() {
        let html = page("<table><tr><td>1</td><td>2</td></tr></table>");
        assert_eq!(run(&MissingTableHeaders, &html).len(), 1);
    }

    #[test]
    fn test_table_with_column_headers() {
        let html = page("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>");
        assert!(run(&MissingTableHeaders, &html).is_empty());
    }

    #[test]
    fn test_two_axis_headers_need_scope() {
        let unscoped = page(
            "<table><tr><td></td><th>Mon</th></tr><tr><th>Alice</th><td>9</td></tr></table>",
        );
        assert_eq!(run(&MissingTableHeaders, &unscoped).len(), 1);
        let scoped = page(
            r#"<table><tr><td></td><th scope="col">Mon</th></tr><tr><th scope="row">Alice</th><td>9</td></tr></table>"#,
        );
        assert!(run(&MissingTableHeaders, &scoped).is_empty());
    }

    #[test]
    fn test_layout_table_is_exempt() {
        let html = page(r#"<table role="presentation"><tr><td>layout</td></tr></table>"#);
        assert!(run(&MissingTableHeaders, &html).is_empty());
    }
}
