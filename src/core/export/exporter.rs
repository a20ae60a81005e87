//! View export: rendered image and data extract per requested view

use crate::adapters::tableau::{BiServer, ViewRequest};
use crate::domain::context::ResultExt;
use crate::domain::export::{ExportConfig, ImageIndex, ViewExport, ViewFilters};
use crate::domain::items::WorkbookItem;
use crate::domain::result::Result;
use std::collections::HashSet;
use std::path::Path;

/// Output of the export stage
#[derive(Debug, Clone, Default)]
pub struct ExportedViews {
    /// Image file names in export order; the hand-off to tiling
    pub index: ImageIndex,
    pub views: Vec<ViewExport>,
}

/// Exports the requested views of a workbook into a scratch directory
pub struct ViewExporter<'a, S: ?Sized> {
    server: &'a S,
    max_age_minutes: u32,
}

impl<'a, S> ViewExporter<'a, S>
where
    S: BiServer + ?Sized,
{
    pub fn new(server: &'a S, max_age_minutes: u32) -> Self {
        Self {
            server,
            max_age_minutes,
        }
    }

    /// Exports every requested view, in workbook order
    ///
    /// Writes `<view>.png` and `<view>.csv` into `scratch_dir`. Requested
    /// views the workbook does not have are logged and skipped. Names that
    /// clean up to the same file name get a numeric suffix.
    pub async fn export(
        &self,
        workbook: &WorkbookItem,
        config: &ExportConfig,
        scratch_dir: &Path,
    ) -> Result<ExportedViews> {
        let filters = ViewFilters::from_specs(&config.filters);
        if filters.is_empty() {
            tracing::info!("No filters applied");
        }
        for (field, values) in filters.iter() {
            tracing::info!(field = %field, values = %values, "Applying filter");
        }

        let request = ViewRequest {
            filters,
            max_age_minutes: self.max_age_minutes,
        };

        let views = self.server.workbook_views(&workbook.id).await?;
        let mut exported = ExportedViews::default();
        let mut used_names = HashSet::new();

        for view in views.iter().filter(|v| config.wants_view(&v.name)) {
            let base_name = unique_base_name(&sanitize_file_name(&view.name), &mut used_names);
            let image_file = scratch_dir.join(format!("{base_name}.png"));
            let csv_file = scratch_dir.join(format!("{base_name}.csv"));

            let image = self.server.view_image(&view.id, &request).await?;
            tokio::fs::write(&image_file, &image)
                .await
                .with_context(|| format!("Failed to write {}", image_file.display()))?;

            let data = self.server.view_data(&view.id, &request).await?;
            tokio::fs::write(&csv_file, &data)
                .await
                .with_context(|| format!("Failed to write {}", csv_file.display()))?;

            tracing::info!(
                view = %view.name,
                image_bytes = image.len(),
                data_bytes = data.len(),
                "Exported view"
            );

            exported.index.push(format!("{base_name}.png"));
            exported.views.push(ViewExport {
                view_name: view.name.clone(),
                image_file,
                csv_file,
            });
        }

        for requested in &config.slide_views {
            if !views.iter().any(|v| &v.name == requested) {
                tracing::warn!(
                    view = %requested,
                    workbook = %workbook.name,
                    "Requested view not found in workbook"
                );
            }
        }

        Ok(exported)
    }
}

/// Makes a view name safe to use as a file name
///
/// Path separators, characters reserved on common filesystems and control
/// characters become `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "view".to_string()
    } else {
        cleaned
    }
}

/// Returns `base_name`, or `base_name_2`, `base_name_3`, ... when it is
/// already taken
///
/// Comparison ignores case so the files stay distinct on case-insensitive
/// filesystems.
fn unique_base_name(base_name: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base_name.to_string();
    let mut n = 1;
    while !used.insert(candidate.to_lowercase()) {
        n += 1;
        candidate = format!("{base_name}_{n}");
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Overview", "Overview" ; "plain")]
    #[test_case("Sales / Region", "Sales _ Region" ; "slash")]
    #[test_case("a:b*c?d", "a_b_c_d" ; "reserved")]
    #[test_case("..", "view" ; "dots only")]
    #[test_case("  Spaced  ", "Spaced" ; "trimmed")]
    fn test_sanitize_file_name(input: &str, expected: &str) {
        assert_eq!(sanitize_file_name(input), expected);
    }

    #[test]
    fn test_unique_base_name_suffixes_collisions() {
        let mut used = HashSet::new();
        let names: Vec<String> = ["A_B", "A_B", "a_b", "A_B_2", "Overview"]
            .iter()
            .map(|n| unique_base_name(n, &mut used))
            .collect();
        assert_eq!(names, vec!["A_B", "A_B_2", "a_b_3", "A_B_2_2", "Overview"]);
    }
}
