//! End-to-end tests for the export pipeline against an in-memory server

mod common;

use common::FakeServer;
use std::path::Path;
use tabops::adapters::tableau::BiServer;
use tabops::config::{ExportSettings, ServerConfig, TabopsConfig};
use tabops::core::export::{ExportPipeline, ExportRequest};
use tabops::domain::{ExportType, TabopsError};
use tempfile::TempDir;

struct Workspace {
    _temp: TempDir,
    config: TabopsConfig,
    descriptor: std::path::PathBuf,
}

impl Workspace {
    fn new(descriptor_json: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let descriptor = root.join("sales.json");
        std::fs::write(&descriptor, descriptor_json).unwrap();

        let config = TabopsConfig {
            application: Default::default(),
            server: ServerConfig::default(),
            export: ExportSettings {
                output_root: root.join("out").to_string_lossy().to_string(),
                scratch_root: root.join("img").to_string_lossy().to_string(),
                descriptor_dir: root.join("config").to_string_lossy().to_string(),
                ..Default::default()
            },
            permissions: Default::default(),
            users: Default::default(),
            logging: Default::default(),
        };

        Self {
            _temp: temp,
            config,
            descriptor,
        }
    }

    fn request(&self, export_type: ExportType) -> ExportRequest {
        ExportRequest {
            descriptor_path: self.descriptor.clone(),
            export_type,
            page_type: None,
            orientation: None,
        }
    }

    fn scratch_root(&self) -> &Path {
        Path::new(&self.config.export.scratch_root)
    }
}

const TWO_VIEWS: &str = r#"{
    "workbook_name": "Sales",
    "project_name": "Finance",
    "slide_views": ["Overview", "Regions"]
}"#;

fn sales_server() -> FakeServer {
    FakeServer::new()
        .with_workbook("wb-1", "Sales", "Finance")
        .with_workbook("wb-2", "Sales", "Marketing")
        .with_view("wb-1", "Overview", 800, 600)
        .with_view("wb-1", "Details", 640, 480)
        .with_view("wb-1", "Regions", 1001, 751)
}

fn scratch_is_empty(root: &Path) -> bool {
    match std::fs::read_dir(root) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

fn pdf_page_count(path: &Path) -> usize {
    printpdf::lopdf::Document::load(path)
        .unwrap()
        .get_pages()
        .len()
}

/// Pixel widths of the PPTX media, in slide order
fn media_widths(path: &Path) -> Vec<u32> {
    use image::GenericImageView;
    use std::io::Read;

    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut widths = Vec::new();
    for n in 1.. {
        let Ok(mut entry) = archive.by_name(&format!("ppt/media/image{n}.png")) else {
            break;
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        widths.push(image::load_from_memory(&bytes).unwrap().dimensions().0);
    }
    widths
}

fn slide_count(path: &Path) -> usize {
    let file = std::fs::File::open(path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count()
}

#[tokio::test]
async fn test_pdf_export_two_views() {
    let ws = Workspace::new(TWO_VIEWS);
    let mut server = sales_server();
    let pipeline = ExportPipeline::new(ws.config.clone());

    let summary = pipeline
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap();

    assert_eq!(summary.workbook, "Sales");
    assert_eq!(summary.project, "Finance");
    assert_eq!(summary.views_exported, 2);
    assert_eq!(summary.tiles, 6);
    assert_eq!(summary.pages, 7);

    let bytes = std::fs::read(&summary.output_path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(pdf_page_count(&summary.output_path), 7);
    assert!(summary.output_path.ends_with("pdf/Sales.pdf"));

    assert!(scratch_is_empty(ws.scratch_root()));
    assert_eq!(server.sign_ins, 1);
    assert_eq!(server.sign_outs, 1);
    assert!(!server.is_authenticated());
}

#[tokio::test]
async fn test_ppt_export_two_views() {
    let ws = Workspace::new(TWO_VIEWS);
    let mut server = sales_server();
    let pipeline = ExportPipeline::new(ws.config.clone());

    let summary = pipeline
        .run(&mut server, &ws.request(ExportType::Ppt))
        .await
        .unwrap();

    assert_eq!(summary.tiles, 6);
    assert_eq!(summary.pages, 7);
    assert!(summary.output_path.ends_with("ppt/Sales.pptx"));
    assert_eq!(slide_count(&summary.output_path), 7);
    assert!(scratch_is_empty(ws.scratch_root()));
}

#[tokio::test]
async fn test_views_with_clashing_file_names_keep_their_own_images() {
    let ws = Workspace::new(
        r#"{
            "workbook_name": "Sales",
            "project_name": "Finance",
            "slide_views": ["A/B", "A_B"]
        }"#,
    );
    let mut server = FakeServer::new()
        .with_workbook("wb-1", "Sales", "Finance")
        .with_view("wb-1", "A/B", 400, 300)
        .with_view("wb-1", "A_B", 800, 600);

    let summary = ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Ppt))
        .await
        .unwrap();

    assert_eq!(summary.views_exported, 2);
    assert_eq!(summary.tiles, 6);
    assert_eq!(
        media_widths(&summary.output_path),
        vec![400, 200, 200, 800, 400, 400]
    );
}

#[tokio::test]
async fn test_views_follow_workbook_order() {
    let ws = Workspace::new(
        r#"{
            "workbook_name": "Sales",
            "project_name": "Finance",
            "slide_views": ["Regions", "Overview"]
        }"#,
    );
    let mut server = sales_server();
    ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Ppt))
        .await
        .unwrap();

    let rendered: Vec<String> = server
        .view_requests
        .lock()
        .unwrap()
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    assert_eq!(rendered, vec!["Overview", "Regions"]);
}

#[tokio::test]
async fn test_filters_reach_every_render() {
    let ws = Workspace::new(
        r#"{
            "workbook_name": "Sales",
            "project_name": "Finance",
            "slide_views": ["Overview"],
            "filters": [{"description": "Region", "values": ["East", "West"]}]
        }"#,
    );
    let mut server = sales_server();
    ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap();

    let requests = server.view_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let pairs = requests[0].1.filters.query_pairs();
    assert_eq!(
        pairs,
        vec![("vf_Region".to_string(), "East,West".to_string())]
    );
    assert_eq!(requests[0].1.max_age_minutes, 1);
}

#[tokio::test]
async fn test_missing_views_are_skipped() {
    let ws = Workspace::new(
        r#"{
            "workbook_name": "Sales",
            "project_name": "Finance",
            "slide_views": ["Overview", "Forecast"]
        }"#,
    );
    let mut server = sales_server();
    let summary = ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap();

    assert_eq!(summary.views_exported, 1);
    assert_eq!(summary.tiles, 3);
    assert_eq!(summary.pages, 4);
}

#[tokio::test]
async fn test_unknown_workbook_is_not_found() {
    let ws = Workspace::new(
        r#"{"workbook_name": "Sales", "project_name": "HR", "slide_views": ["Overview"]}"#,
    );
    let mut server = sales_server();
    let err = ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap_err();

    assert!(matches!(err, TabopsError::NotFound(_)));
    assert_eq!(server.sign_outs, 1);
}

#[tokio::test]
async fn test_duplicate_workbooks_are_ambiguous() {
    let ws = Workspace::new(TWO_VIEWS);
    let mut server = sales_server().with_workbook("wb-3", "Sales", "Finance");
    let err = ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap_err();

    assert!(matches!(err, TabopsError::Ambiguous(_)));
    assert_eq!(server.sign_outs, 1);
}

#[tokio::test]
async fn test_workbook_found_across_pages() {
    let ws = Workspace::new(TWO_VIEWS);
    let mut server = FakeServer::new();
    for i in 0..7 {
        server = server.with_workbook(&format!("other-{i}"), &format!("Other {i}"), "Finance");
    }
    let mut server = server
        .with_workbook("wb-1", "Sales", "Finance")
        .with_view("wb-1", "Overview", 400, 300);

    let mut config = ws.config.clone();
    config.server.page_size = 3;
    let summary = ExportPipeline::new(config)
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap();
    assert_eq!(summary.views_exported, 1);
}

#[tokio::test]
async fn test_render_failure_still_cleans_up() {
    let ws = Workspace::new(TWO_VIEWS);
    // 1x1 images cannot be split into a 2x2 grid
    let mut server = FakeServer::new()
        .with_workbook("wb-1", "Sales", "Finance")
        .with_view("wb-1", "Overview", 1, 1);

    let err = ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap_err();

    assert!(matches!(err, TabopsError::Render(_)));
    assert!(scratch_is_empty(ws.scratch_root()));
    assert_eq!(server.sign_outs, 1);
}

#[tokio::test]
async fn test_bad_descriptor_never_signs_in() {
    let ws = Workspace::new(r#"{"workbook_name": "Sales"}"#);
    let mut server = sales_server();
    let err = ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(server.sign_ins, 0);
}

#[tokio::test]
async fn test_rejected_sign_in_is_fatal() {
    let ws = Workspace::new(TWO_VIEWS);
    let mut server = sales_server();
    server.reject_sign_in.insert(String::new());

    let err = ExportPipeline::new(ws.config.clone())
        .run(&mut server, &ws.request(ExportType::Pdf))
        .await
        .unwrap_err();
    assert!(matches!(err, TabopsError::Server(_)));
    assert!(!err.is_configuration());
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let ws = Workspace::new(TWO_VIEWS);
    let pipeline = ExportPipeline::new(ws.config.clone());

    let mut first_server = sales_server();
    let first = pipeline
        .run(&mut first_server, &ws.request(ExportType::Ppt))
        .await
        .unwrap();
    let mut second_server = sales_server();
    let second = pipeline
        .run(&mut second_server, &ws.request(ExportType::Ppt))
        .await
        .unwrap();

    assert_ne!(first.export_id, second.export_id);
    assert_eq!(first.tiles, second.tiles);
    assert_eq!(first.pages, second.pages);
    assert_eq!(first.output_path, second.output_path);
    assert_eq!(slide_count(&second.output_path), 7);
}
