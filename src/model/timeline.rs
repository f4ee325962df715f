/// Pixel size of one day column and one slot row, as supplied by the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub day_width: f32,
    pub slot_height: f32,
}

impl Geometry {
    pub fn new(day_width: f32, slot_height: f32) -> Self {
        Self {
            day_width,
            slot_height,
        }
    }

    /// Whole-day offset for a horizontal pointer delta.
    ///
    /// Zero, negative or non-finite day widths yield no change instead of
    /// leaking NaN/infinity into task positions.
    pub fn day_delta(&self, dx: f32) -> i64 {
        pixels_to_units(dx, self.day_width)
    }

    /// Whole-slot offset for a vertical pointer delta. Same guards as [`Self::day_delta`].
    pub fn slot_delta(&self, dy: f32) -> i64 {
        pixels_to_units(dy, self.slot_height)
    }
}

fn pixels_to_units(delta: f32, unit: f32) -> i64 {
    if !unit.is_finite() || unit <= 0.0 || !delta.is_finite() {
        return 0;
    }
    (delta / unit).round() as i64
}

/// Manages the visible, day-indexed extent of the timeline.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    /// Number of day columns drawn.
    pub total_days: u32,
    /// Pixels per day (controls zoom level).
    pub pixels_per_day: f32,
    /// Height of one virtual-lane row.
    pub slot_height: f32,
}

impl TimelineViewport {
    pub const MIN_PIXELS_PER_DAY: f32 = 2.0;
    pub const MAX_PIXELS_PER_DAY: f32 = 80.0;

    pub fn new(total_days: u32, pixels_per_day: f32, slot_height: f32) -> Self {
        Self {
            total_days,
            pixels_per_day: pixels_per_day
                .clamp(Self::MIN_PIXELS_PER_DAY, Self::MAX_PIXELS_PER_DAY),
            slot_height,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.pixels_per_day, self.slot_height)
    }

    /// Convert a day index to an x-pixel offset from the timeline origin.
    pub fn day_to_x(&self, day: u32) -> f32 {
        day as f32 * self.pixels_per_day
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.day_to_x(self.total_days)
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.pixels_per_day = (self.pixels_per_day * 1.2).min(Self::MAX_PIXELS_PER_DAY);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.pixels_per_day = (self.pixels_per_day / 1.2).max(Self::MIN_PIXELS_PER_DAY);
    }

    /// Grow the day range so that `day` is visible with some trailing room.
    pub fn ensure_visible(&mut self, day: u32) {
        if day.saturating_add(7) > self.total_days {
            self.total_days = day.saturating_add(14);
        }
    }
}
