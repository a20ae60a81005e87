//! Workbook resolution by name and project

use crate::adapters::tableau::{collect_pages, BiServer};
use crate::domain::errors::TabopsError;
use crate::domain::items::WorkbookItem;
use crate::domain::result::Result;

/// Finds the single workbook named `workbook_name` in `project_name`
///
/// Every page of the workbook listing is fetched before matching. Both names
/// must match exactly.
///
/// # Errors
///
/// [`TabopsError::NotFound`] when nothing matches, [`TabopsError::Ambiguous`]
/// when more than one workbook does.
pub async fn resolve_workbook<S>(
    server: &S,
    page_size: u32,
    workbook_name: &str,
    project_name: &str,
) -> Result<WorkbookItem>
where
    S: BiServer + ?Sized,
{
    let workbooks = collect_pages(page_size, move |page| server.workbooks_page(page)).await?;
    tracing::debug!(count = workbooks.len(), "Fetched workbooks");

    let workbook = select_workbook(workbooks, workbook_name, project_name)?;
    tracing::info!(
        workbook = %workbook.name,
        project = %workbook.project_name,
        workbook_id = %workbook.id,
        "Resolved workbook"
    );
    Ok(workbook)
}

/// Picks the exact name and project match out of a full listing
pub fn select_workbook(
    workbooks: Vec<WorkbookItem>,
    workbook_name: &str,
    project_name: &str,
) -> Result<WorkbookItem> {
    let mut matches: Vec<WorkbookItem> = workbooks
        .into_iter()
        .filter(|wb| wb.name == workbook_name && wb.project_name == project_name)
        .collect();

    match matches.len() {
        0 => Err(TabopsError::NotFound(format!(
            "Workbook '{workbook_name}' in project '{project_name}'"
        ))),
        1 => Ok(matches.remove(0)),
        n => Err(TabopsError::Ambiguous(format!(
            "{n} workbooks named '{workbook_name}' in project '{project_name}'"
        ))),
    }
}
