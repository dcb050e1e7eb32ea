mod settings;

pub use settings::{
    ApiConfig, AuthConfig, DashboardConfig, LiveConfig, Settings, TelemetryConfig,
};
