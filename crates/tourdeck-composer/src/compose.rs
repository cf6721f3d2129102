//! Tour composition: overlays, template render, PDF output.

use crate::template::{RenderContext, TemplateStore};
use crate::{pdf, ComposeError};
use bytes::Bytes;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tourdeck_core::constants::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
use tourdeck_core::models::{Stop, Tour};
use tourdeck_overlay::{code_image, GeoPoint, StaticMapProvider};

/// A stop paired with its generated code image. The stop itself is copied,
/// never mutated; enrichment only adds data alongside it.
#[derive(Debug, Clone)]
pub struct StopOverlay {
    pub stop: Stop,
    pub qr_png: Bytes,
}

/// Generate one code image per stop on blocking threads, preserving input
/// order in the result.
pub async fn enrich_stops(stops: &[Stop]) -> Result<Vec<StopOverlay>, ComposeError> {
    let handles: Vec<_> = stops
        .iter()
        .cloned()
        .map(|stop| {
            tokio::task::spawn_blocking(move || {
                let qr_png = code_image(stop.lat, stop.lon)?;
                Ok::<_, ComposeError>(StopOverlay { stop, qr_png })
            })
        })
        .collect();

    let mut overlays = Vec::with_capacity(handles.len());
    for handle in handles {
        overlays.push(handle.await??);
    }
    Ok(overlays)
}

/// Static inputs for composition: where templates and fonts live, and the
/// logo image embedded into every document.
#[derive(Debug, Clone)]
pub struct ComposerAssets {
    pub template_dir: PathBuf,
    pub template_name: String,
    pub font_dir: PathBuf,
    pub font_family: String,
    pub logo_png: Bytes,
}

/// Builds tour schedule PDFs. Holds the injected map provider and asset
/// locations; carries no per-tour state, so one composer serves many tours.
pub struct TourComposer {
    map: Arc<dyn StaticMapProvider>,
    assets: ComposerAssets,
    map_width: u32,
    map_height: u32,
}

impl TourComposer {
    pub fn new(map: Arc<dyn StaticMapProvider>, assets: ComposerAssets) -> Self {
        TourComposer {
            map,
            assets,
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
        }
    }

    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    /// Compose `tour` into a PDF at `output`.
    pub async fn compose(&self, tour: &Tour, output: &Path) -> Result<(), ComposeError> {
        self.compose_with_cancel(tour, output, CancellationToken::new())
            .await
    }

    /// Compose with cooperative cancellation. Cancelling drops the
    /// outstanding overlay and map work and returns
    /// [`ComposeError::Cancelled`]; no partial file is left at `output`.
    pub async fn compose_with_cancel(
        &self,
        tour: &Tour,
        output: &Path,
        cancel: CancellationToken,
    ) -> Result<(), ComposeError> {
        if tour.stops.is_empty() {
            return Err(tourdeck_overlay::OverlayError::EmptyStops.into());
        }

        let start = std::time::Instant::now();
        let points: Vec<GeoPoint> = tour
            .stops
            .iter()
            .map(|s| GeoPoint { lat: s.lat, lon: s.lon })
            .collect();

        // Per-stop code images and the composite map are independent; run
        // them concurrently, racing against cancellation.
        let work = async {
            let (overlays, map_png) = tokio::join!(
                enrich_stops(&tour.stops),
                self.map.composite_map(&points, self.map_width, self.map_height),
            );
            Ok::<_, ComposeError>((overlays?, map_png?))
        };
        let (overlays, map_png) = tokio::select! {
            _ = cancel.cancelled() => return Err(ComposeError::Cancelled),
            result = work => result?,
        };

        let template = TemplateStore::new(&self.assets.template_dir).load(&self.assets.template_name)?;
        let markup = template.render(&build_context(tour, &overlays))?;

        let mut images: HashMap<String, Bytes> = HashMap::new();
        images.insert("logo".to_string(), self.assets.logo_png.clone());
        images.insert("map".to_string(), map_png);
        for (i, overlay) in overlays.iter().enumerate() {
            images.insert(format!("qr-{i}"), overlay.qr_png.clone());
        }

        if cancel.is_cancelled() {
            return Err(ComposeError::Cancelled);
        }

        let title = format!("Property Tour - {}", tour.client_name);
        let font_dir = self.assets.font_dir.clone();
        let font_family = self.assets.font_family.clone();
        let output_path = output.to_path_buf();
        tokio::task::spawn_blocking(move || {
            pdf::write_pdf(&markup, &images, &font_dir, &font_family, &title, &output_path)
        })
        .await??;

        tracing::info!(
            client = %tour.client_name,
            stops = tour.stops.len(),
            output = %output.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "tour document composed"
        );
        Ok(())
    }
}

fn build_context(tour: &Tour, overlays: &[StopOverlay]) -> RenderContext {
    let mut globals = HashMap::new();
    globals.insert("client_name".to_string(), tour.client_name.clone());
    globals.insert("tour_date".to_string(), format_long_date(tour.date));
    globals.insert("start_time".to_string(), tour.start_time.clone());
    globals.insert(
        "today".to_string(),
        format_long_date(chrono::Local::now().date_naive()),
    );
    globals.insert(
        "hero".to_string(),
        tour.hero_image
            .as_ref()
            .map(|url| format!("Hero image: {url}"))
            .unwrap_or_default(),
    );

    let stops = overlays
        .iter()
        .enumerate()
        .map(|(i, overlay)| {
            let stop = &overlay.stop;
            let mut fields = HashMap::new();
            fields.insert("time".to_string(), stop.time.clone());
            fields.insert("address".to_string(), stop.address.clone());
            fields.insert("floor".to_string(), stop.floor.clone());
            fields.insert("lat".to_string(), stop.lat.to_string());
            fields.insert("lon".to_string(), stop.lon.to_string());
            fields.insert("qr".to_string(), format!("qr-{i}"));
            fields.insert(
                "photo".to_string(),
                stop.image_url
                    .as_ref()
                    .map(|url| format!("Photo: {url}"))
                    .unwrap_or_default(),
            );
            fields.insert(
                "floorplan".to_string(),
                stop.floorplan_url
                    .as_ref()
                    .map(|url| format!("Floor plan: {url}"))
                    .unwrap_or_default(),
            );
            fields
        })
        .collect();

    RenderContext { globals, stops }
}

/// "March 24, 2025" style dates, no zero padding on the day.
fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::sync::Mutex;
    use tourdeck_overlay::OverlayError;

    const FONT_DIR: &str = "/usr/share/fonts/truetype/dejavu";

    fn fonts_installed() -> bool {
        PathBuf::from(FONT_DIR).join("DejaVuSans.ttf").is_file()
    }

    fn tiny_png() -> Bytes {
        let img = RgbaImage::from_pixel(8, 8, Rgba([200, 200, 200, 255]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                image::ImageFormat::Png,
            )
            .unwrap();
        Bytes::from(buffer)
    }

    /// Records calls and serves a canned response.
    struct StubMaps {
        calls: Mutex<Vec<Vec<GeoPoint>>>,
        fail_status: Option<u16>,
    }

    impl StubMaps {
        fn ok() -> Self {
            StubMaps {
                calls: Mutex::new(Vec::new()),
                fail_status: None,
            }
        }

        fn failing(status: u16) -> Self {
            StubMaps {
                calls: Mutex::new(Vec::new()),
                fail_status: Some(status),
            }
        }
    }

    #[async_trait]
    impl StaticMapProvider for StubMaps {
        async fn composite_map(
            &self,
            points: &[GeoPoint],
            _width: u32,
            _height: u32,
        ) -> Result<Bytes, OverlayError> {
            self.calls.lock().unwrap().push(points.to_vec());
            match self.fail_status {
                Some(status) => Err(OverlayError::MapStatus {
                    status,
                    body: "stub failure".to_string(),
                }),
                None => Ok(tiny_png()),
            }
        }
    }

    /// Never resolves; composition can only end through cancellation.
    struct HangingMaps;

    #[async_trait]
    impl StaticMapProvider for HangingMaps {
        async fn composite_map(
            &self,
            _points: &[GeoPoint],
            _width: u32,
            _height: u32,
        ) -> Result<Bytes, OverlayError> {
            futures::future::pending().await
        }
    }

    fn sample_tour() -> Tour {
        Tour {
            client_name: "Jordan Lee".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 24).unwrap(),
            start_time: "9:00 AM".to_string(),
            stops: vec![
                Stop {
                    time: "9:00 AM".to_string(),
                    address: "12 Beacon St, Waltham MA".to_string(),
                    floor: "Floor 3".to_string(),
                    lat: 42.3763,
                    lon: -71.2351,
                    image_url: Some("https://cdn.example.com/beacon.jpg".to_string()),
                    floorplan_url: None,
                },
                Stop {
                    time: "10:30 AM".to_string(),
                    address: "88 River Rd, Weston MA".to_string(),
                    floor: "Floor 1".to_string(),
                    lat: 42.40,
                    lon: -71.30,
                    image_url: None,
                    floorplan_url: Some("https://cdn.example.com/river-plan.pdf".to_string()),
                },
            ],
            hero_image: None,
            logo: None,
        }
    }

    fn assets_in(dir: &Path, template: &str) -> ComposerAssets {
        std::fs::write(dir.join("tour_schedule.tpl"), template).unwrap();
        ComposerAssets {
            template_dir: dir.to_path_buf(),
            template_name: "tour_schedule".to_string(),
            font_dir: PathBuf::from(FONT_DIR),
            font_family: "DejaVuSans".to_string(),
            logo_png: tiny_png(),
        }
    }

    const TEMPLATE: &str = "\
# Property Tour - {{client_name}}\n\
{{tour_date}} starting {{start_time}}\n\
[img:logo]\n\
{{#stops}}\n\
## {{time}} - {{address}}\n\
{{floor}}\n\
[img:{{qr}}]\n\
{{photo}}\n\
{{/stops}}\n\
[img:map]\n";

    #[tokio::test]
    async fn composes_tour_into_pdf() {
        if !fonts_installed() {
            eprintln!("skipping: DejaVu fonts not installed");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tour.pdf");
        let maps = Arc::new(StubMaps::ok());
        let composer = TourComposer::new(maps.clone(), assets_in(dir.path(), TEMPLATE));

        composer.compose(&sample_tour(), &output).await.unwrap();

        let data = std::fs::read(&output).unwrap();
        assert!(data.starts_with(b"%PDF"));

        // One composite map request covering both stops, in order.
        let calls = maps.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[0][0].lat, 42.3763);
        assert_eq!(calls[0][1].lat, 42.40);
    }

    #[tokio::test]
    async fn map_failure_leaves_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tour.pdf");
        let composer = TourComposer::new(
            Arc::new(StubMaps::failing(401)),
            assets_in(dir.path(), TEMPLATE),
        );

        let result = composer.compose(&sample_tour(), &output).await;
        assert!(matches!(
            result,
            Err(ComposeError::Overlay(OverlayError::MapStatus { status: 401, .. }))
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn empty_stop_list_is_rejected_without_provider_call() {
        let dir = tempfile::tempdir().unwrap();
        let maps = Arc::new(StubMaps::ok());
        let composer = TourComposer::new(maps.clone(), assets_in(dir.path(), TEMPLATE));

        let mut tour = sample_tour();
        tour.stops.clear();
        let result = composer.compose(&tour, &dir.path().join("tour.pdf")).await;
        assert!(matches!(
            result,
            Err(ComposeError::Overlay(OverlayError::EmptyStops))
        ));
        assert!(maps.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_placeholder_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tour.pdf");
        let composer = TourComposer::new(
            Arc::new(StubMaps::ok()),
            assets_in(dir.path(), "{{client_name}} {{not_a_field}}\n"),
        );

        let result = composer.compose(&sample_tour(), &output).await;
        assert!(matches!(
            result,
            Err(ComposeError::MissingField(name)) if name == "not_a_field"
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn cancellation_aborts_composition() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tour.pdf");
        let composer = TourComposer::new(Arc::new(HangingMaps), assets_in(dir.path(), TEMPLATE));

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = composer
            .compose_with_cancel(&sample_tour(), &output, cancel)
            .await;
        assert!(matches!(result, Err(ComposeError::Cancelled)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn enrichment_preserves_stop_order_and_content() {
        let tour = sample_tour();
        let overlays = enrich_stops(&tour.stops).await.unwrap();

        assert_eq!(overlays.len(), 2);
        for (overlay, stop) in overlays.iter().zip(&tour.stops) {
            assert_eq!(overlay.stop.address, stop.address);
            assert!(!overlay.qr_png.is_empty());
        }
        // Different coordinates produce different code images.
        assert_ne!(overlays[0].qr_png, overlays[1].qr_png);
    }

    #[test]
    fn long_dates_drop_day_padding() {
        assert_eq!(
            format_long_date(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()),
            "March 4, 2025"
        );
    }
}
