//! Client configuration.
//!
//! Every externally adjustable constant lives here: coordinate domain
//! bounds, canvas dimensions, the color palette, and all timer durations.

use std::time::Duration;

/// Default endpoint for the realtime tracking stream.
pub const DEFAULT_URL: &str = "wss://signals.delicode.com/websocket_realtime";

/// Configuration for a floorview client.
#[derive(Debug, Clone)]
pub struct VizConfig {
    /// WebSocket endpoint URL
    pub url: String,
    /// Authentication token sent with the register message
    pub token: String,
    /// Location ids to subscribe to
    pub locations: Vec<i64>,
    /// Minimum extent of the coordinate domain, in real-world units (cm)
    pub domain_min: f64,
    /// Maximum extent of the coordinate domain, in real-world units (cm)
    pub domain_max: f64,
    /// Draw-surface width in pixels
    pub canvas_width: f64,
    /// Draw-surface height in pixels
    pub canvas_height: f64,
    /// Marker fill colors, assigned cyclically by person id
    pub palette: Vec<String>,
    /// Marker radius in pixels
    pub marker_radius: f64,
    /// Grid line spacing in real-world units (cm)
    pub grid_spacing: f64,
    /// Lifetime of a position/demographic record without replacement
    pub record_ttl: Duration,
    /// Staleness at which a label's drawn handle is destroyed
    pub label_handle_ttl: Duration,
    /// Staleness at which a label leaves the retained set
    pub label_retain_ttl: Duration,
    /// Render tick period
    pub render_period: Duration,
    /// Label sweep period
    pub sweep_period: Duration,
    /// Heartbeat emission period
    pub heartbeat_period: Duration,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            token: String::new(),
            locations: Vec::new(),
            domain_min: -4500.0,
            domain_max: 4500.0,
            canvas_width: 500.0,
            canvas_height: 500.0,
            palette: default_palette(),
            marker_radius: 5.0,
            grid_spacing: 500.0,
            record_ttl: Duration::from_secs(10),
            label_handle_ttl: Duration::from_secs(10),
            label_retain_ttl: Duration::from_secs(5),
            render_period: Duration::from_millis(33),
            sweep_period: Duration::from_secs(5),
            heartbeat_period: Duration::from_secs(25),
        }
    }
}

fn default_palette() -> Vec<String> {
    ["red", "cyan", "orange", "purple", "green", "yellow"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl VizConfig {
    /// Create a new configuration builder.
    pub fn builder() -> VizConfigBuilder {
        VizConfigBuilder::default()
    }
}

/// Builder for [`VizConfig`].
#[derive(Debug, Default)]
pub struct VizConfigBuilder {
    config: VizConfig,
}

impl VizConfigBuilder {
    /// Set the stream endpoint URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the authentication token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Set the location ids to subscribe to.
    pub fn locations(mut self, locations: Vec<i64>) -> Self {
        self.config.locations = locations;
        self
    }

    /// Set the coordinate domain bounds. Inverted bounds are swapped.
    pub fn domain(mut self, min: f64, max: f64) -> Self {
        if min <= max {
            self.config.domain_min = min;
            self.config.domain_max = max;
        } else {
            self.config.domain_min = max;
            self.config.domain_max = min;
        }
        self
    }

    /// Set the draw-surface pixel dimensions.
    pub fn canvas(mut self, width: f64, height: f64) -> Self {
        self.config.canvas_width = width.max(1.0);
        self.config.canvas_height = height.max(1.0);
        self
    }

    /// Set the marker color palette. An empty palette keeps the default.
    pub fn palette(mut self, palette: Vec<String>) -> Self {
        if !palette.is_empty() {
            self.config.palette = palette;
        }
        self
    }

    /// Set the marker radius in pixels.
    pub fn marker_radius(mut self, radius: f64) -> Self {
        self.config.marker_radius = radius.max(0.0);
        self
    }

    /// Set the grid line spacing in real-world units.
    pub fn grid_spacing(mut self, spacing: f64) -> Self {
        self.config.grid_spacing = spacing.max(1.0);
        self
    }

    /// Set the record lifetime without replacement.
    pub fn record_ttl(mut self, ttl: Duration) -> Self {
        self.config.record_ttl = ttl;
        self
    }

    /// Set the label handle-destruction and set-retention staleness bounds.
    pub fn label_ttls(mut self, handle_ttl: Duration, retain_ttl: Duration) -> Self {
        self.config.label_handle_ttl = handle_ttl;
        self.config.label_retain_ttl = retain_ttl;
        self
    }

    /// Set the render tick period.
    pub fn render_period(mut self, period: Duration) -> Self {
        self.config.render_period = period;
        self
    }

    /// Set the label sweep period.
    pub fn sweep_period(mut self, period: Duration) -> Self {
        self.config.sweep_period = period;
        self
    }

    /// Set the heartbeat emission period.
    pub fn heartbeat_period(mut self, period: Duration) -> Self {
        self.config.heartbeat_period = period;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> VizConfig {
        self.config
    }
}
