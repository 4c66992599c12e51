//! Unit tests for image export through the renderer seam.

use crate::helpers::{all_rows, scores};
use csvscope::data::chart_engine::build;
use csvscope::data::{ChartDescription, DataError, Theme};
use csvscope::render::{ChartRenderer, RenderedImage, export_png, to_data_url};
use csvscope::types::{ChartKind, ChartSelection};

/// Paints one vertical stripe per point in the point's fill color
struct StripeRenderer;

impl ChartRenderer for StripeRenderer {
    fn render(
        &self,
        description: &ChartDescription,
        width: u32,
        height: u32,
    ) -> Result<RenderedImage, String> {
        let points = description.point_count().max(1) as u32;
        let palette = Theme::default();
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..height {
            for x in 0..width {
                let index = (x * points / width.max(1)) as usize;
                rgba.extend_from_slice(&palette.color(index).to_rgba8(1.0));
            }
        }
        Ok(RenderedImage {
            width,
            height,
            rgba,
        })
    }

    fn point_at(&self, description: &ChartDescription, x: f32, _y: f32) -> Option<usize> {
        let index = (x / 10.0) as usize;
        (index < description.point_count()).then_some(index)
    }
}

struct FailingRenderer;

impl ChartRenderer for FailingRenderer {
    fn render(&self, _: &ChartDescription, _: u32, _: u32) -> Result<RenderedImage, String> {
        Err("no surface".to_string())
    }

    fn point_at(&self, _: &ChartDescription, _: f32, _: f32) -> Option<usize> {
        None
    }
}

fn description() -> ChartDescription {
    let ds = scores();
    build(
        &ds,
        &all_rows(&ds),
        Some(&ChartSelection::new(ChartKind::Bar, "name", "score")),
        &Theme::default(),
        &[],
    )
    .unwrap()
}

#[test]
fn test_export_png_signature() {
    let png = export_png(&StripeRenderer, &description(), 30, 10).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_png_decodes_back() {
    let png = export_png(&StripeRenderer, &description(), 30, 10).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();

    assert_eq!(decoded.dimensions(), (30, 10));
    assert_eq!(decoded.get_pixel(0, 0).0, [75, 192, 192, 255]);
    assert_eq!(decoded.get_pixel(29, 9).0, [255, 206, 86, 255]);
}

#[test]
fn test_renderer_error_is_render_error() {
    let err = export_png(&FailingRenderer, &description(), 10, 10).unwrap_err();
    match err {
        DataError::Render(msg) => assert_eq!(msg, "no surface"),
        other => panic!("Expected Render error, got {:?}", other),
    }
}

#[test]
fn test_data_url() {
    let png = export_png(&StripeRenderer, &description(), 3, 1).unwrap();
    let url = to_data_url(&png);
    assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
}
