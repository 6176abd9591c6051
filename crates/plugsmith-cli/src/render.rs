//! Result rendering as aligned text or JSON.

use std::io::Write;
use std::path::Path;

use plugsmith_core::{BuildResult, DeployReport, DeployResult, ReleaseResult};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::cli::ResolvedOutputFormat;
use crate::errors::AppError;

const COLUMN_GAP: &str = "  ";
const DECLINED: &str = "(declined)";
const NOWHERE: &str = "(no matching layer)";

/// Rows of text cells under a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Table {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl Table {
    fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let mut widths: Vec<usize> = self.headers.iter().map(|header| header.width()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }
        let header_row: Vec<String> = self
            .headers
            .iter()
            .map(|header| (*header).to_owned())
            .collect();
        for row in std::iter::once(&header_row).chain(&self.rows) {
            writeln!(out, "{}", format_row(row, &widths))?;
        }
        Ok(())
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        line.extend(std::iter::repeat_n(' ', width.saturating_sub(cell.width())));
    }
    line.trim_end().to_owned()
}

/// Writes `results` as JSON, or as the text table built by `table`.
pub(crate) fn emit<W, T>(
    out: &mut W,
    format: ResolvedOutputFormat,
    results: &T,
    table: impl FnOnce(&T) -> Table,
) -> Result<(), AppError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    match format {
        ResolvedOutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results).map_err(AppError::SerialiseResults)?;
            writeln!(out).map_err(AppError::WriteResults)
        }
        ResolvedOutputFormat::Text => table(results)
            .write_to(out)
            .map_err(AppError::WriteResults),
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn destination(deployment: &DeployResult) -> [String; 2] {
    [
        format!("{}:{}", deployment.registry_id, deployment.layer_id),
        deployment
            .path
            .as_deref()
            .map_or_else(|| DECLINED.to_owned(), display),
    ]
}

/// One row per built plugin.
pub(crate) fn build_table(results: &[BuildResult]) -> Table {
    Table {
        headers: &["PLUGIN", "VERSION", "SET", "ARCHIVE"],
        rows: results
            .iter()
            .map(|result| {
                vec![
                    result.plugin_id.to_string(),
                    result.descriptor.version().to_string(),
                    result.set_id.clone(),
                    display(&result.artifact),
                ]
            })
            .collect(),
    }
}

/// One row per deployment, or a placeholder row for an archive that no
/// requested layer received.
pub(crate) fn deploy_table(reports: &[DeployReport]) -> Table {
    let mut rows = Vec::new();
    for report in reports {
        let archive = display(&report.artifact);
        if report.deployments.is_empty() {
            rows.push(vec![
                archive.clone(),
                report.plugin_id.to_string(),
                String::new(),
                NOWHERE.to_owned(),
                String::new(),
            ]);
        }
        for deployment in &report.deployments {
            let [layer, path] = destination(deployment);
            rows.push(vec![
                archive.clone(),
                report.plugin_id.to_string(),
                deployment.descriptor.version().to_string(),
                layer,
                path,
            ]);
        }
    }
    Table {
        headers: &["ARCHIVE", "PLUGIN", "VERSION", "LAYER", "DEPLOYED"],
        rows,
    }
}

/// One row per released deployment.
pub(crate) fn release_table(results: &[ReleaseResult]) -> Table {
    let mut rows = Vec::new();
    for result in results {
        if result.deployments.is_empty() {
            rows.push(vec![
                result.plugin_id.to_string(),
                String::new(),
                NOWHERE.to_owned(),
                String::new(),
            ]);
        }
        for deployment in &result.deployments {
            let [layer, path] = destination(deployment);
            rows.push(vec![
                result.plugin_id.to_string(),
                deployment.descriptor.version().to_string(),
                layer,
                path,
            ]);
        }
    }
    Table {
        headers: &["PLUGIN", "VERSION", "LAYER", "DEPLOYED"],
        rows,
    }
}
