//! Per-frame driver: vehicle readings in, scene items out.
//!
//! Each frame [`Dashboard::tick`] does, for every gauge in turn:
//!
//! 1. `query` the connection for the gauge's PID
//! 2. feed a reading into the gauge's [`MovingAverage`]; a missing reading
//!    is skipped (the filter keeps its previous window) and counted
//! 3. lay the gauge out at the smoothed value
//! 4. delete last frame's ticks, labels, zone boxes and danger bar, then
//!    create the new ones
//! 5. raise the needle above the fresh zone boxes, update the readout text
//!    and raise it to the front
//!
//! A gauge with an empty filter is laid out at 0 and its readout shows `---`.
//!
//! # Link Status
//!
//! | Status | Condition |
//! |--------|-----------|
//! | `NoLink` | connection reports not connected |
//! | `NoData` | some gauge missed [`STALE_READ_LIMIT`] reads in a row |
//! | `Live` | otherwise |

use core::fmt::Write;

use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};
use heapless::String;

use crate::{
    config::{GaugeConfig, HudConfig, STALE_READ_LIMIT},
    gauge::Gauge,
    render::TEXT_CAPACITY,
    scene::{ItemId, Scene},
    smoothing::MovingAverage,
    vehicle::{Pid, VehicleConnection},
};

/// Readout text while a gauge has no samples.
pub const NO_READING: &str = "---";

/// Health of the vehicle link as shown in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    Live,
    NoData,
    NoLink,
}

impl LinkStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::NoData => "NO DATA",
            Self::NoLink => "NO LINK",
        }
    }
}

/// What one frame produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Smoothed RPM, `None` before the first reading.
    pub rpm: Option<f32>,
    /// Smoothed speed, `None` before the first reading.
    pub speed: Option<f32>,
    pub link: LinkStatus,
    /// `link` differs from the previous frame.
    pub link_changed: bool,
}

/// One gauge with its filter and scene items.
struct GaugeView {
    pid: Pid,
    gauge: Gauge,
    filter: MovingAverage,
    needle: ItemId,
    readout: ItemId,
    /// Items recreated every frame.
    dynamic: Vec<ItemId>,
    /// Consecutive queries without a reading.
    misses: u32,
}

impl GaugeView {
    fn new(
        scene: &mut Scene,
        pid: Pid,
        config: &GaugeConfig,
        filter: MovingAverage,
    ) -> Self {
        let gauge = Gauge::new(config.clone());
        scene.create(gauge.frame());
        scene.create(gauge.title());
        let needle = scene.create(gauge.needle());
        let readout = scene.create(gauge.readout(NO_READING));
        Self {
            pid,
            gauge,
            filter,
            needle,
            readout,
            dynamic: Vec::new(),
            misses: 0,
        }
    }

    fn ingest(
        &mut self,
        reading: Option<f32>,
    ) {
        match reading {
            Some(value) => {
                self.filter.add_value(value);
                self.misses = 0;
            }
            None => self.misses = self.misses.saturating_add(1),
        }
    }

    fn redraw(
        &mut self,
        scene: &mut Scene,
    ) {
        let smoothed = self.filter.mean();
        let set = self.gauge.layout(smoothed.unwrap_or(0.0));

        scene.delete_all(self.dynamic.drain(..));
        self.dynamic
            .extend(set.primitives(&self.gauge).into_iter().map(|primitive| scene.create(primitive)));

        scene.raise(self.needle);
        scene.set_text(self.readout, &readout_text(smoothed));
        scene.raise(self.readout);
    }

    const fn is_stale(&self) -> bool { self.misses >= STALE_READ_LIMIT }
}

/// Readout string: the rounded value, or [`NO_READING`].
fn readout_text(value: Option<f32>) -> String<TEXT_CAPACITY> {
    let mut text = String::new();
    match value {
        Some(v) => {
            let _ = write!(text, "{v:.0}");
        }
        None => {
            let _ = text.push_str(NO_READING);
        }
    }
    text
}

/// The HUD: vehicle connection, one view per gauge and the shared scene.
pub struct Dashboard {
    connection: Box<dyn VehicleConnection>,
    scene: Scene,
    views: [GaugeView; 2],
    last_link: LinkStatus,
    frames: u64,
}

impl Dashboard {
    pub fn new(
        config: &HudConfig,
        connection: Box<dyn VehicleConnection>,
    ) -> Self {
        let mut scene = Scene::new();
        let views = [
            GaugeView::new(
                &mut scene,
                Pid::EngineRpm,
                &config.rpm_gauge,
                MovingAverage::new(config.smoothing.rpm_window),
            ),
            GaugeView::new(
                &mut scene,
                Pid::VehicleSpeed,
                &config.speed_gauge,
                MovingAverage::new(config.smoothing.speed_window),
            ),
        ];
        let last_link = if connection.is_connected() { LinkStatus::Live } else { LinkStatus::NoLink };
        Self {
            connection,
            scene,
            views,
            last_link,
            frames: 0,
        }
    }

    /// Sample, smooth and rebuild every gauge once.
    pub fn tick(&mut self) -> FrameReport {
        for view in &mut self.views {
            let reading = self.connection.query(view.pid);
            view.ingest(reading);
            view.redraw(&mut self.scene);
        }
        self.frames += 1;

        let link = self.link_status();
        let link_changed = link != self.last_link;
        if link_changed {
            match link {
                LinkStatus::Live => tracing::info!("Vehicle link: {}", link.label()),
                LinkStatus::NoData | LinkStatus::NoLink => tracing::warn!("Vehicle link: {}", link.label()),
            }
            self.last_link = link;
        }
        tracing::trace!(frame = self.frames, items = self.scene.len(), "Frame built");

        FrameReport {
            rpm: self.smoothed(Pid::EngineRpm),
            speed: self.smoothed(Pid::VehicleSpeed),
            link,
            link_changed,
        }
    }

    pub fn link_status(&self) -> LinkStatus {
        if !self.connection.is_connected() {
            LinkStatus::NoLink
        } else if self.views.iter().any(GaugeView::is_stale) {
            LinkStatus::NoData
        } else {
            LinkStatus::Live
        }
    }

    /// Current smoothed value for `pid`.
    pub fn smoothed(
        &self,
        pid: Pid,
    ) -> Option<f32> {
        self.views.iter().find(|view| view.pid == pid).and_then(|view| view.filter.mean())
    }

    #[inline]
    pub fn scene(&self) -> &Scene { &self.scene }

    #[inline]
    pub fn connection(&self) -> &dyn VehicleConnection { self.connection.as_ref() }

    /// Frames built so far.
    #[inline]
    pub const fn frames(&self) -> u64 { self.frames }

    /// Paint the scene.
    pub fn draw<D>(
        &self,
        target: &mut D,
    ) where
        D: DrawTarget<Color = Rgb565>,
    {
        self.scene.draw(target);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::num::NonZeroUsize;

    use embedded_graphics::prelude::{Dimensions, PointsIter, Size};
    use embedded_graphics_simulator::SimulatorDisplay;

    use super::*;
    use crate::colors::{BLACK, HUD_GREEN};
    use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::render::Primitive;

    /// Connection answering from per-PID queues; `None` once a queue runs dry.
    struct FakeVehicle {
        rpm: VecDeque<Option<f32>>,
        speed: VecDeque<Option<f32>>,
        connected: bool,
    }

    impl FakeVehicle {
        fn new(
            rpm: &[Option<f32>],
            speed: &[Option<f32>],
        ) -> Box<Self> {
            Box::new(Self {
                rpm: rpm.iter().copied().collect(),
                speed: speed.iter().copied().collect(),
                connected: true,
            })
        }
    }

    impl VehicleConnection for FakeVehicle {
        fn is_connected(&self) -> bool { self.connected }

        fn query(
            &mut self,
            pid: Pid,
        ) -> Option<f32> {
            match pid {
                Pid::EngineRpm => self.rpm.pop_front().flatten(),
                Pid::VehicleSpeed => self.speed.pop_front().flatten(),
            }
        }

        fn describe(&self) -> &str { "fake" }
    }

    fn config() -> HudConfig {
        let mut config = HudConfig::default();
        config.smoothing.rpm_window = NonZeroUsize::new(4).expect("non-zero");
        config
    }

    fn readout<'a>(
        dashboard: &'a Dashboard,
        index: usize,
    ) -> Option<&'a str> {
        dashboard.scene.get(dashboard.views[index].readout).and_then(Primitive::text_content)
    }

    // -------------------------------------------------------------------------
    // Construction Tests
    // -------------------------------------------------------------------------

    fn count_color(
        display: &SimulatorDisplay<Rgb565>,
        color: Rgb565,
    ) -> usize {
        display.bounding_box().points().filter(|&p| display.get_pixel(p) == color).count()
    }

    #[test]
    fn test_new_creates_static_items() {
        let dashboard = Dashboard::new(&config(), FakeVehicle::new(&[], &[]));

        // Frame, title, needle, readout per gauge
        assert_eq!(dashboard.scene().len(), 8);
        assert_eq!(readout(&dashboard, 0), Some(NO_READING));
        assert_eq!(readout(&dashboard, 1), Some(NO_READING));
        assert_eq!(dashboard.frames(), 0);
    }

    // -------------------------------------------------------------------------
    // Sampling Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tick_feeds_filters() {
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&[Some(2000.0)], &[Some(88.0)]));
        let report = dashboard.tick();

        assert_eq!(report.rpm, Some(2000.0));
        assert_eq!(report.speed, Some(88.0));
        assert_eq!(report.link, LinkStatus::Live);
        assert_eq!(readout(&dashboard, 0), Some("2000"));
        assert_eq!(readout(&dashboard, 1), Some("88"));
    }

    #[test]
    fn test_missing_reading_is_skipped() {
        let mut dashboard = Dashboard::new(
            &config(),
            FakeVehicle::new(&[Some(1000.0), None, Some(3000.0)], &[]),
        );
        dashboard.tick();
        dashboard.tick();
        let report = dashboard.tick();

        // The gap is not averaged in as a zero
        assert_eq!(report.rpm, Some(2000.0), "Mean of 1000 and 3000 only");
        assert_eq!(dashboard.views[0].filter.len(), 2);
    }

    #[test]
    fn test_smoothing_window_applies() {
        let rpm: Vec<Option<f32>> = [1000.0, 1000.0, 1000.0, 1000.0, 5000.0].map(Some).to_vec();
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&rpm, &[]));
        let mut report = dashboard.tick();
        for _ in 1..rpm.len() {
            report = dashboard.tick();
        }
        assert_eq!(report.rpm, Some(2000.0), "Window of 4: 1000, 1000, 1000, 5000");
    }

    #[test]
    fn test_empty_filter_renders_at_zero() {
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&[], &[]));
        let report = dashboard.tick();

        assert_eq!(report.rpm, None);
        assert_eq!(readout(&dashboard, 0), Some(NO_READING));
        assert!(!dashboard.views[0].dynamic.is_empty(), "Gauge still draws its scale at 0");
    }

    // -------------------------------------------------------------------------
    // Scene Lifecycle Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_previous_dynamic_items_deleted() {
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&[Some(2000.0), Some(2600.0)], &[]));
        dashboard.tick();
        let first: Vec<ItemId> = dashboard.views[0].dynamic.clone();
        assert!(!first.is_empty());

        dashboard.tick();
        for id in &first {
            assert!(!dashboard.scene().contains(*id), "Item {id:?} from the previous frame survived");
        }
    }

    #[test]
    fn test_needle_and_readout_on_top() {
        // 6800 RPM is past redline: high zone boxes and danger bar are present
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&[Some(6800.0)], &[Some(150.0)]));
        dashboard.tick();

        for view in &dashboard.views {
            let scene = dashboard.scene();
            let needle = scene.position(view.needle).expect("needle exists");
            let readout = scene.position(view.readout).expect("readout exists");
            assert!(readout > needle, "Readout must sit above the needle");
            for id in &view.dynamic {
                let z = scene.position(*id).expect("dynamic item exists");
                assert!(needle > z, "Needle must sit above every tick and zone box");
            }
        }
        let top = dashboard.scene().ids().last();
        assert_eq!(top, Some(dashboard.views[1].readout), "Last readout is the topmost item");
    }

    #[test]
    fn test_scene_size_stable_across_frames() {
        let rpm = vec![Some(2000.0); 5];
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&rpm, &rpm));
        dashboard.tick();
        let size = dashboard.scene().len();
        for _ in 0..4 {
            dashboard.tick();
            assert_eq!(dashboard.scene().len(), size, "Same value must not grow the scene");
        }
    }

    // -------------------------------------------------------------------------
    // Link Status Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_link_disconnected() {
        let mut vehicle = FakeVehicle::new(&[Some(1000.0)], &[]);
        vehicle.connected = false;
        let mut dashboard = Dashboard::new(&config(), vehicle);
        let report = dashboard.tick();
        assert_eq!(report.link, LinkStatus::NoLink);
        assert!(!report.link_changed, "Started without a link");
    }

    #[test]
    fn test_link_goes_stale_and_recovers() {
        let mut rpm = vec![Some(1000.0)];
        rpm.extend(std::iter::repeat_n(None, STALE_READ_LIMIT as usize));
        rpm.push(Some(1200.0));
        let speed = vec![Some(50.0); rpm.len()];
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&rpm, &speed));

        let mut reports = Vec::new();
        for _ in 0..rpm.len() {
            reports.push(dashboard.tick());
        }

        let limit = STALE_READ_LIMIT as usize;
        assert_eq!(reports[limit - 1].link, LinkStatus::Live, "One miss short of the limit");
        assert_eq!(reports[limit].link, LinkStatus::NoData);
        assert!(reports[limit].link_changed);
        assert_eq!(reports[limit].rpm, Some(1000.0), "Stale gauge keeps its last mean");

        let last = reports.last().expect("reports present");
        assert_eq!(last.link, LinkStatus::Live, "A fresh reading clears the stale state");
        assert!(last.link_changed);
    }

    // -------------------------------------------------------------------------
    // Drawing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_draw_lights_gauges() {
        let mut dashboard = Dashboard::new(&config(), FakeVehicle::new(&[Some(3000.0)], &[Some(60.0)]));
        dashboard.tick();

        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
        dashboard.draw(&mut canvas);
        assert!(count_color(&canvas, HUD_GREEN) > 0, "Ticks and needles are drawn");
        assert!(count_color(&canvas, BLACK) > 0, "Background stays clear between gauges");
    }
}
