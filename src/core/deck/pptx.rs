//! PowerPoint (PPTX) output
//!
//! A PPTX file is an OOXML package: a zip of XML parts tied together by
//! relationship files. The deck carries one master, two layouts ("Title
//! Slide" and "Title Only"), one theme, the slides and their PNG media.
//!
//! Slides are modelled before serialization. A slide starts with the
//! placeholders its layout defines; image slides then drop the title
//! placeholder so only the picture remains.

use super::layout;
use super::{DeckMetadata, DeckWriter};
use crate::core::tiles::TileIndex;
use crate::domain::errors::TabopsError;
use crate::domain::result::Result;
use image::GenericImageView;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// EMU per inch
pub const EMU_PER_INCH: i64 = 914_400;
/// EMU per pixel at 96 dpi
pub const EMU_PER_PIXEL: i64 = 9_525;
/// 10in x 7.5in
pub const SLIDE_WIDTH_EMU: i64 = 10 * EMU_PER_INCH;
pub const SLIDE_HEIGHT_EMU: i64 = 7 * EMU_PER_INCH + EMU_PER_INCH / 2;
/// Pictures are fitted into 8in x 6in
pub const CONTENT_WIDTH_EMU: i64 = 8 * EMU_PER_INCH;
pub const CONTENT_HEIGHT_EMU: i64 = 6 * EMU_PER_INCH;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Slide layouts available in the generated master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideLayout {
    TitleSlide,
    TitleOnly,
}

impl SlideLayout {
    /// 1-based part number of the layout
    fn part_number(&self) -> usize {
        match self {
            SlideLayout::TitleSlide => 1,
            SlideLayout::TitleOnly => 2,
        }
    }

    fn placeholders(&self) -> Vec<PlaceholderKind> {
        match self {
            SlideLayout::TitleSlide => vec![PlaceholderKind::CenterTitle, PlaceholderKind::Subtitle],
            SlideLayout::TitleOnly => vec![PlaceholderKind::Title],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Title,
    CenterTitle,
    Subtitle,
}

impl PlaceholderKind {
    fn is_title(&self) -> bool {
        matches!(self, PlaceholderKind::Title | PlaceholderKind::CenterTitle)
    }

    fn ph_element(&self) -> &'static str {
        match self {
            PlaceholderKind::Title => r#"<p:ph type="title"/>"#,
            PlaceholderKind::CenterTitle => r#"<p:ph type="ctrTitle"/>"#,
            PlaceholderKind::Subtitle => r#"<p:ph type="subTitle" idx="1"/>"#,
        }
    }
}

/// Something drawn on a slide
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Placeholder {
        kind: PlaceholderKind,
        text: String,
    },
    Picture {
        /// 1-based media number (`ppt/media/image{n}.png`)
        media: usize,
        name: String,
        x: i64,
        y: i64,
        cx: i64,
        cy: i64,
    },
}

/// One slide: its layout plus the shapes on it
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub layout: SlideLayout,
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// A slide carrying the empty placeholders of `layout`
    pub fn from_layout(layout: SlideLayout) -> Self {
        let shapes = layout
            .placeholders()
            .into_iter()
            .map(|kind| Shape::Placeholder {
                kind,
                text: String::new(),
            })
            .collect();
        Self { layout, shapes }
    }

    /// Fills the placeholder of `kind`; returns false if the slide has none
    pub fn set_text(&mut self, kind: PlaceholderKind, value: impl Into<String>) -> bool {
        for shape in &mut self.shapes {
            if let Shape::Placeholder { kind: k, text } = shape {
                if *k == kind {
                    *text = value.into();
                    return true;
                }
            }
        }
        false
    }

    /// Drops the title placeholder the layout added
    pub fn remove_title_placeholder(&mut self) {
        self.shapes
            .retain(|s| !matches!(s, Shape::Placeholder { kind, .. } if kind.is_title()));
    }

    pub fn add_picture(&mut self, picture: Shape) {
        self.shapes.push(picture);
    }

    fn media(&self) -> Option<usize> {
        self.shapes.iter().find_map(|s| match s {
            Shape::Picture { media, .. } => Some(*media),
            Shape::Placeholder { .. } => None,
        })
    }

    fn to_xml(&self) -> String {
        let mut body = String::new();
        for (i, shape) in self.shapes.iter().enumerate() {
            // id 1 is the group shape
            let id = i + 2;
            match shape {
                Shape::Placeholder { kind, text } => {
                    body.push_str(&placeholder_xml(id, *kind, text));
                }
                Shape::Picture {
                    name, x, y, cx, cy, ..
                } => {
                    body.push_str(&format!(
                        concat!(
                            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}" descr="{name}"/>"#,
                            r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
                            r#"<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
                        ),
                        id = id,
                        name = xml_escape(name),
                        x = x,
                        y = y,
                        cx = cx,
                        cy = cy,
                    ));
                }
            }
        }

        format!(
            r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld>{tree}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
            tree = sp_tree(&body),
        )
    }

    fn rels_xml(&self) -> String {
        let mut rels = vec![relationship(
            "rId1",
            "slideLayout",
            &format!("../slideLayouts/slideLayout{}.xml", self.layout.part_number()),
        )];
        if let Some(media) = self.media() {
            rels.push(relationship("rId2", "image", &format!("../media/image{media}.png")));
        }
        relationships(&rels)
    }
}

/// Writes a title slide followed by one picture slide per tile
#[derive(Debug, Default)]
pub struct PptxDeck;

impl PptxDeck {
    pub fn new() -> Self {
        Self
    }

    fn title_slide(meta: &DeckMetadata) -> Slide {
        let mut slide = Slide::from_layout(SlideLayout::TitleSlide);
        slide.set_text(PlaceholderKind::CenterTitle, meta.title());
        slide.set_text(
            PlaceholderKind::Subtitle,
            format!("{}\n{}", meta.project_line(), meta.timestamp_line()),
        );
        slide
    }

    fn picture_slide(media: usize, name: &str, px_width: u32, px_height: u32) -> Slide {
        let mut slide = Slide::from_layout(SlideLayout::TitleOnly);
        slide.remove_title_placeholder();

        let placement = layout::place(
            (i64::from(px_width) * EMU_PER_PIXEL) as f64,
            (i64::from(px_height) * EMU_PER_PIXEL) as f64,
            CONTENT_WIDTH_EMU as f64,
            CONTENT_HEIGHT_EMU as f64,
            SLIDE_WIDTH_EMU as f64,
            SLIDE_HEIGHT_EMU as f64,
        );
        slide.add_picture(Shape::Picture {
            media,
            name: name.to_string(),
            x: placement.x.round() as i64,
            y: placement.y.round() as i64,
            cx: placement.width.round() as i64,
            cy: placement.height.round() as i64,
        });
        slide
    }
}

impl DeckWriter for PptxDeck {
    fn write(&self, tiles: &TileIndex, meta: &DeckMetadata, output: &Path) -> Result<usize> {
        let mut slides = vec![Self::title_slide(meta)];
        let mut media: Vec<Vec<u8>> = Vec::with_capacity(tiles.len());

        for (tile, path) in tiles.tiles().iter().zip(tiles.paths()) {
            let img = image::open(&path).map_err(|e| {
                TabopsError::Render(format!("Failed to open tile {}: {}", path.display(), e))
            })?;
            let (px_w, px_h) = img.dimensions();
            media.push(fs::read(&path)?);
            slides.push(Self::picture_slide(media.len(), &tile.file_name, px_w, px_h));
            tracing::debug!(tile = %tile.file_name, slide = slides.len(), "Added tile to deck");
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        write_package(output, meta, &slides, &media)?;

        tracing::info!(path = %output.display(), slides = slides.len(), "Saved PPTX deck");
        Ok(slides.len())
    }
}

fn write_package(
    output: &Path,
    meta: &DeckMetadata,
    slides: &[Slide],
    media: &[Vec<u8>],
) -> Result<()> {
    let file = File::create(output)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut put = |name: String, bytes: &[u8]| -> Result<()> {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
        Ok(())
    };

    put("[Content_Types].xml".into(), content_types_xml(slides.len()).as_bytes())?;
    put("_rels/.rels".into(), root_rels_xml().as_bytes())?;
    put("docProps/core.xml".into(), core_props_xml(meta).as_bytes())?;
    put("docProps/app.xml".into(), app_props_xml(slides.len()).as_bytes())?;
    put("ppt/presentation.xml".into(), presentation_xml(slides.len()).as_bytes())?;
    put(
        "ppt/_rels/presentation.xml.rels".into(),
        presentation_rels_xml(slides.len()).as_bytes(),
    )?;
    put("ppt/slideMasters/slideMaster1.xml".into(), SLIDE_MASTER_XML.as_bytes())?;
    put(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
        master_rels_xml().as_bytes(),
    )?;
    put("ppt/slideLayouts/slideLayout1.xml".into(), TITLE_LAYOUT_XML.as_bytes())?;
    put("ppt/slideLayouts/slideLayout2.xml".into(), TITLE_ONLY_LAYOUT_XML.as_bytes())?;
    for n in 1..=2 {
        put(
            format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"),
            layout_rels_xml().as_bytes(),
        )?;
    }
    put("ppt/theme/theme1.xml".into(), THEME_XML.as_bytes())?;

    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        put(format!("ppt/slides/slide{n}.xml"), slide.to_xml().as_bytes())?;
        put(format!("ppt/slides/_rels/slide{n}.xml.rels"), slide.rels_xml().as_bytes())?;
    }
    for (i, bytes) in media.iter().enumerate() {
        put(format!("ppt/media/image{}.png", i + 1), bytes)?;
    }

    zip.finish()?;
    Ok(())
}

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn sp_tree(shapes: &str) -> String {
    format!(
        concat!(
            r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
            r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
            r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{}</p:spTree>"#
        ),
        shapes
    )
}

fn placeholder_xml(id: usize, kind: PlaceholderKind, text: &str) -> String {
    let paragraphs: String = if text.is_empty() {
        r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#.to_string()
    } else {
        text.split('\n')
            .map(|line| {
                format!(
                    r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                    xml_escape(line)
                )
            })
            .collect()
    };
    let name = if kind.is_title() { "Title" } else { "Subtitle" };
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name} {id}"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
        ),
        id = id,
        name = name,
        ph = kind.ph_element(),
        paragraphs = paragraphs,
    )
}

fn relationship(id: &str, kind: &str, target: &str) -> String {
    format!(r#"<Relationship Id="{id}" Type="{REL_BASE}/{kind}" Target="{target}"/>"#)
}

fn relationships(rels: &[String]) -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}">{}</Relationships>"#,
        rels.concat()
    )
}

fn content_types_xml(slide_count: usize) -> String {
    const PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";
    let mut overrides = vec![
        format!(r#"<Override PartName="/ppt/presentation.xml" ContentType="{PML}.presentation.main+xml"/>"#),
        format!(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{PML}.slideMaster+xml"/>"#),
        format!(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{PML}.slideLayout+xml"/>"#),
        format!(r#"<Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="{PML}.slideLayout+xml"/>"#),
        r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#.to_string(),
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#.to_string(),
        r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#.to_string(),
    ];
    for n in 1..=slide_count {
        overrides.push(format!(
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="{PML}.slide+xml"/>"#
        ));
    }

    format!(
        concat!(
            r#"{decl}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Default Extension="png" ContentType="image/png"/>{overrides}</Types>"#
        ),
        decl = XML_DECL,
        overrides = overrides.concat(),
    )
}

fn root_rels_xml() -> String {
    relationships(&[
        relationship("rId1", "officeDocument", "ppt/presentation.xml"),
        format!(
            r#"<Relationship Id="rId2" Type="{NS_PKG_REL}/metadata/core-properties" Target="docProps/core.xml"/>"#
        ),
        relationship("rId3", "extended-properties", "docProps/app.xml"),
    ])
}

/// Relationship ids in presentation.xml.rels: master, theme, then slides
fn presentation_rels_xml(slide_count: usize) -> String {
    let mut rels = vec![
        relationship("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        relationship("rId2", "theme", "theme/theme1.xml"),
    ];
    for n in 1..=slide_count {
        rels.push(relationship(
            &format!("rId{}", n + 2),
            "slide",
            &format!("slides/slide{n}.xml"),
        ));
    }
    relationships(&rels)
}

fn presentation_xml(slide_count: usize) -> String {
    let slide_ids: String = (1..=slide_count)
        .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 2))
        .collect();
    format!(
        concat!(
            r#"{decl}<p:presentation xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" saveSubsetFonts="1">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            r#"<p:sldIdLst>{ids}</p:sldIdLst>"#,
            r#"<p:sldSz cx="{cx}" cy="{cy}" type="screen4x3"/><p:notesSz cx="{cy}" cy="{cx}"/>"#,
            r#"</p:presentation>"#
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        ids = slide_ids,
        cx = SLIDE_WIDTH_EMU,
        cy = SLIDE_HEIGHT_EMU,
    )
}

fn master_rels_xml() -> String {
    relationships(&[
        relationship("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
        relationship("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml"),
        relationship("rId3", "theme", "../theme/theme1.xml"),
    ])
}

fn layout_rels_xml() -> String {
    relationships(&[relationship(
        "rId1",
        "slideMaster",
        "../slideMasters/slideMaster1.xml",
    )])
}

fn core_props_xml(meta: &DeckMetadata) -> String {
    let created = meta
        .generated_at
        .with_timezone(&chrono::Utc)
        .format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            r#"{decl}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<dc:title>{title}</dc:title><dc:subject>{project}</dc:subject><dc:creator>tabops</dc:creator>"#,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified>"#,
            r#"</cp:coreProperties>"#
        ),
        decl = XML_DECL,
        title = xml_escape(&meta.title()),
        project = xml_escape(&meta.project_name),
        created = created,
    )
}

fn app_props_xml(slide_count: usize) -> String {
    format!(
        concat!(
            r#"{decl}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            r#"<Application>tabops</Application><Slides>{slides}</Slides></Properties>"#
        ),
        decl = XML_DECL,
        slides = slide_count,
    )
}

const SLIDE_MASTER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
    r#"<p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>"#,
    r#"<p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
    r#"<p:txBody><a:bodyPr anchor="ctr"/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
    r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Text Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
    r#"<p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr>"#,
    r#"<p:spPr><a:xfrm><a:off x="457200" y="1600200"/><a:ext cx="8229600" cy="4525963"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
    r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
    r#"</p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" "#,
    r#"accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst>"#,
    r#"<p:txStyles>"#,
    r#"<p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
    r#"<a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
    r#"<p:bodyStyle><a:lvl1pPr><a:defRPr sz="3200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
    r#"<a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#,
    r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
    r#"<a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#,
    r#"</p:txStyles></p:sldMaster>"#
);

const TITLE_LAYOUT_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="title" preserve="1">"#,
    r#"<p:cSld name="Title Slide"><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
    r#"<p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr>"#,
    r#"<p:spPr><a:xfrm><a:off x="685800" y="2130425"/><a:ext cx="7772400" cy="1470025"/></a:xfrm></p:spPr>"#,
    r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
    r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Subtitle 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
    r#"<p:nvPr><p:ph type="subTitle" idx="1"/></p:nvPr></p:nvSpPr>"#,
    r#"<p:spPr><a:xfrm><a:off x="1371600" y="3886200"/><a:ext cx="6400800" cy="1752600"/></a:xfrm></p:spPr>"#,
    r#"<p:txBody><a:bodyPr/><a:lstStyle><a:lvl1pPr marL="0" indent="0" algn="ctr"><a:buNone/></a:lvl1pPr></a:lstStyle>"#,
    r#"<a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
    r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
);

const TITLE_ONLY_LAYOUT_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="titleOnly" preserve="1">"#,
    r#"<p:cSld name="Title Only"><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
    r#"<p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
    r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
    r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
);

const THEME_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tiles::Tile;
    use image::{Rgb, RgbImage};
    use std::io::Read;
    use tempfile::TempDir;

    fn tile_index(dir: &Path, sizes: &[(u32, u32)]) -> TileIndex {
        let tiles = sizes
            .iter()
            .enumerate()
            .map(|(i, (w, h))| {
                let file_name = format!("v_tile_{i}.png");
                RgbImage::from_pixel(*w, *h, Rgb([200, 10, 10]))
                    .save(dir.join(&file_name))
                    .unwrap();
                Tile {
                    source: "v".to_string(),
                    row: 0,
                    col: 0,
                    file_name,
                }
            })
            .collect();
        TileIndex::new(dir, tiles)
    }

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut text = String::new();
        part.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_title_only_layout_cleanup() {
        let mut slide = Slide::from_layout(SlideLayout::TitleOnly);
        assert_eq!(slide.shapes.len(), 1);
        slide.remove_title_placeholder();
        assert!(slide.shapes.is_empty());
    }

    #[test]
    fn test_title_slide_placeholders() {
        let slide = PptxDeck::title_slide(&DeckMetadata::now("Sales", "Finance"));
        assert_eq!(slide.layout, SlideLayout::TitleSlide);
        assert!(slide.shapes.iter().any(|s| matches!(
            s,
            Shape::Placeholder { kind: PlaceholderKind::Subtitle, text } if text.starts_with("Project: Finance\nExported on: ")
        )));
    }

    #[test]
    fn test_picture_is_fitted_and_centered() {
        let slide = PptxDeck::picture_slide(1, "t.png", 1600, 900);
        let Shape::Picture { x, y, cx, cy, .. } = slide.shapes[0].clone() else {
            panic!("expected a picture");
        };
        assert_eq!(cx, CONTENT_WIDTH_EMU);
        assert_eq!(cy, CONTENT_WIDTH_EMU * 9 / 16);
        assert_eq!(x, (SLIDE_WIDTH_EMU - cx) / 2);
        assert_eq!(y, (SLIDE_HEIGHT_EMU - cy) / 2);
    }

    #[test]
    fn test_small_picture_is_not_upscaled() {
        let slide = PptxDeck::picture_slide(1, "t.png", 100, 50);
        let Shape::Picture { cx, cy, .. } = slide.shapes[0].clone() else {
            panic!("expected a picture");
        };
        assert_eq!((cx, cy), (100 * EMU_PER_PIXEL, 50 * EMU_PER_PIXEL));
    }

    #[test]
    fn test_writes_one_slide_per_tile_plus_title() {
        let dir = TempDir::new().unwrap();
        let tiles = tile_index(dir.path(), &[(1200, 300), (600, 300), (600, 300)]);
        let output = dir.path().join("ppt/Sales & Co.pptx");

        let count = PptxDeck::new()
            .write(&tiles, &DeckMetadata::now("Sales & Co", "Finance"), &output)
            .unwrap();
        assert_eq!(count, 4);

        let archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let slide_parts = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count();
        assert_eq!(slide_parts, 4);
        assert_eq!(
            archive.file_names().filter(|n| n.starts_with("ppt/media/")).count(),
            3
        );

        let title = read_part(&output, "ppt/slides/slide1.xml");
        assert!(title.contains("Tableau Workbook Export: Sales &amp; Co"));

        let image_slide = read_part(&output, "ppt/slides/slide2.xml");
        assert!(image_slide.contains("<p:pic>"));
        assert!(!image_slide.contains("<p:ph"));

        let presentation = read_part(&output, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 4);
    }

    #[test]
    fn test_unreadable_tile_is_render_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.png"), b"nope").unwrap();
        let tiles = TileIndex::new(
            dir.path(),
            vec![Tile {
                source: "bad".to_string(),
                row: 0,
                col: 0,
                file_name: "bad.png".to_string(),
            }],
        );

        let err = PptxDeck::new()
            .write(&tiles, &DeckMetadata::now("S", "P"), &dir.path().join("x.pptx"))
            .unwrap_err();
        assert!(matches!(err, TabopsError::Render(_)));
    }
}
